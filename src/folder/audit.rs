//! The plain-text audit log written next to the renamed files.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{RenameError, Result};

const LINE: &str = "------------------------------------------------------------";

/// Counts and listings that open the audit log.
pub struct SummaryHeader<'a> {
    pub dry_run: bool,
    pub files_found: usize,
    pub unopenable: &'a [String],
    pub unparseable: &'a [String],
    pub senders: &'a [String],
    pub recipients: &'a [String],
}

/// Line-oriented writer for the audit log.
pub struct AuditLog<W: Write> {
    out: W,
    path: PathBuf,
}

impl AuditLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| RenameError::io(path, e))?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write> AuditLog<W> {
    /// Wrap any writer; `path` is only used in error messages.
    pub fn new(out: W, path: impl Into<PathBuf>) -> Self {
        Self {
            out,
            path: path.into(),
        }
    }

    fn write(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        self.out
            .write_fmt(args)
            .map_err(|e| RenameError::io(&self.path, e))
    }

    fn section(&mut self, title: &str, items: &[String]) -> Result<()> {
        self.write(format_args!("\n{title}\n{LINE}\n"))?;
        for item in items {
            self.write(format_args!("{item}\n"))?;
        }
        Ok(())
    }

    /// Write the run summary and the unopenable/sender/recipient listings.
    pub fn write_summary(&mut self, header: &SummaryHeader<'_>) -> Result<()> {
        let mode = if header.dry_run { "dry run" } else { "live" };
        self.write(format_args!("FILE RENAME SUMMARY ({mode})\n{LINE}\n"))?;
        self.write(format_args!(
            "# e-mail files found:  {}\n",
            header.files_found
        ))?;
        self.write(format_args!(
            "# unopenable files:    {}\n",
            header.unopenable.len()
        ))?;
        self.write(format_args!(
            "# unparseable files:   {}\n",
            header.unparseable.len()
        ))?;
        self.write(format_args!(
            "# unique senders:      {}\n",
            header.senders.len()
        ))?;
        self.write(format_args!(
            "# unique recipients:   {}\n",
            header.recipients.len()
        ))?;

        self.section("Unopenable Files", header.unopenable)?;
        self.section("Unparseable Files", header.unparseable)?;
        self.section("Unique Senders", header.senders)?;
        self.section("Unique Recipients", header.recipients)?;
        self.write(format_args!("\nINDIVIDUAL FILES RENAMED\n{LINE}\n"))
    }

    pub fn converting_from(&mut self, name: &str) -> Result<()> {
        self.write(format_args!("\nconverting from : {name}\n"))
    }

    pub fn no_date(&mut self) -> Result<()> {
        self.write(format_args!("* No Date Found *\n"))
    }

    pub fn no_conversion(&mut self) -> Result<()> {
        self.write(format_args!("** No Conversion Needed\n"))
    }

    pub fn converting_to(&mut self, name: &str) -> Result<()> {
        self.write(format_args!("converting to: {name}\n"))
    }

    pub fn conversion_fail(&mut self, reason: &str) -> Result<()> {
        self.write(format_args!(" Conversion Fail: {reason}\n"))
    }

    /// Write the failure count and list, then flush.
    pub fn finish(mut self, failures: &[String]) -> Result<W> {
        self.write(format_args!(
            "\n# failed to rename: {}\n\n{LINE}\n\n",
            failures.len()
        ))?;
        for failure in failures {
            self.write(format_args!("{failure}\n"))?;
        }
        self.out
            .flush()
            .map_err(|e| RenameError::io(&self.path, e))?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_layout() {
        let unopenable = vec!["broken.eml".to_string()];
        let senders = vec!["a@x.com".to_string(), "b@y.com".to_string()];
        let recipients = vec!["c@z.com".to_string()];

        let mut log = AuditLog::new(Vec::new(), "memory");
        log.write_summary(&SummaryHeader {
            dry_run: true,
            files_found: 3,
            unopenable: &unopenable,
            unparseable: &[],
            senders: &senders,
            recipients: &recipients,
        })
        .unwrap();
        log.converting_from("old.eml").unwrap();
        log.no_date().unwrap();
        log.converting_to("0000_00_00 [No_subj] fm a@x.com to c@z.com.eml")
            .unwrap();
        log.converting_from("same.eml").unwrap();
        log.no_conversion().unwrap();
        let out = log.finish(&["bad.eml".to_string()]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("FILE RENAME SUMMARY (dry run)\n"));
        assert!(text.contains("# e-mail files found:  3\n"));
        assert!(text.contains("# unopenable files:    1\n"));
        assert!(text.contains("# unique senders:      2\n"));
        assert!(text.contains("Unopenable Files\n"));
        assert!(text.contains("\nbroken.eml\n"));
        assert!(text.contains("Unique Senders\n"));
        assert!(text.contains("a@x.com\nb@y.com\n"));
        assert!(text.contains("converting from : old.eml\n* No Date Found *\nconverting to: "));
        assert!(text.contains("converting from : same.eml\n** No Conversion Needed\n"));
        assert!(text.contains("# failed to rename: 1\n"));
        assert!(text.trim_end().ends_with("bad.eml"));
    }
}
