//! Folder processing: list message files, rename them, and keep the audit log.

pub mod audit;
pub mod sanitize;
pub mod summary;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{RenameError, Result};
use crate::naming::{build_filename, resolve_collision};
use crate::normalize::{normalize_address, normalize_fields, Rules};
use crate::parser::date::canonical_timestamp;
use crate::parser::eml::parse_message;

use audit::{AuditLog, SummaryHeader};

pub use sanitize::{sanitize_filenames, SanitizePolicy};
pub use summary::FolderSummary;

/// Settings for one [`process_folder`] run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Compute and log everything, but leave the files untouched.
    pub dry_run: bool,
    /// Extension of the message files, including the dot.
    pub extension: String,
    /// Name of the audit log created in the folder.
    pub log_file: String,
    /// Abort before doing anything if more message files than this are found.
    pub max_files: usize,
    /// Maximum length of a new name, extension excluded.
    pub max_filename_len: usize,
    pub rules: Rules,
}

impl ProcessOptions {
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self {
            dry_run,
            extension: config.general.extension.clone(),
            log_file: config.general.log_file.clone(),
            max_files: config.general.max_files,
            max_filename_len: config.limits.max_filename_len,
            rules: Rules::from_config(config),
        }
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), true)
    }
}

/// Aggregate results of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub files_found: usize,
    /// Files that could not be read at all.
    pub unopenable: Vec<String>,
    /// Files that were read but held no message headers.
    pub unparseable: Vec<String>,
    /// Unique normalized senders, sorted.
    pub senders: Vec<String>,
    /// Unique normalized recipients, sorted.
    pub recipients: Vec<String>,
    /// Files renamed (or, in a dry run, that would have been).
    pub renamed: usize,
    /// Files that already carried their normalized name.
    pub unchanged: usize,
    /// Files without a usable `Date:` header.
    pub undated: usize,
    /// Files whose rename failed.
    pub failures: Vec<String>,
}

/// Everything learned from one pass over the message files.
#[derive(Debug, Default)]
struct Survey {
    unopenable: Vec<String>,
    unparseable: Vec<String>,
    senders: BTreeSet<String>,
    recipients: BTreeSet<String>,
}

/// List the message files in `dir`: non-hidden entries ending in `extension`, sorted by name.
pub fn list_messages(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(RenameError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| RenameError::io(dir, e))? {
        let entry = entry.map_err(|e| RenameError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with('.') && name.ends_with(extension) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Rename every message file in `dir` after its date, subject, sender and recipient.
///
/// Per-file problems are logged and skipped; the only hard stop is finding
/// more than `options.max_files` message files, which is reported before
/// the audit log is created or anything is renamed. `progress` receives
/// `(current, total)`.
pub fn process_folder(
    dir: &Path,
    options: &ProcessOptions,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Result<RunSummary> {
    let files = list_messages(dir, &options.extension)?;
    if files.len() > options.max_files {
        return Err(RenameError::TooManyFiles {
            found: files.len(),
            limit: options.max_files,
        });
    }

    let rules = &options.rules;
    let survey = survey_messages(&files, rules);
    let mut summary = RunSummary {
        dry_run: options.dry_run,
        files_found: files.len(),
        unopenable: survey.unopenable,
        unparseable: survey.unparseable,
        senders: survey.senders.into_iter().collect(),
        recipients: survey.recipients.into_iter().collect(),
        ..RunSummary::default()
    };

    let mut log = AuditLog::create(&dir.join(&options.log_file))?;
    log.write_summary(&SummaryHeader {
        dry_run: summary.dry_run,
        files_found: summary.files_found,
        unopenable: &summary.unopenable,
        unparseable: &summary.unparseable,
        senders: &summary.senders,
        recipients: &summary.recipients,
    })?;

    let total = files.len();
    for (i, path) in files.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i, total);
        }

        let record = match parse_message(path) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "Skipping file");
                continue;
            }
        };

        let current = display_name(path);
        log.converting_from(&current)?;

        let timestamp = canonical_timestamp(record.date.as_deref(), rules);
        if !timestamp.is_known() {
            log.no_date()?;
            summary.undated += 1;
        }

        let fields = normalize_fields(&record, &timestamp.text, rules);
        let candidate = build_filename(&fields, options.max_filename_len, &options.extension);
        if candidate == current {
            log.no_conversion()?;
            summary.unchanged += 1;
            continue;
        }

        let target = resolve_collision(dir, &candidate, &options.extension);
        log.converting_to(&target)?;
        if options.dry_run {
            summary.renamed += 1;
            continue;
        }

        match apply_rename(path, &dir.join(&target), timestamp.instant) {
            Ok(()) => {
                debug!(from = %current, to = %target, "Renamed");
                summary.renamed += 1;
            }
            Err(e) => {
                warn!(error = %e, "Rename failed");
                log.conversion_fail(&e.to_string())?;
                summary.failures.push(path.display().to_string());
            }
        }
    }
    if let Some(cb) = progress {
        cb(total, total);
    }

    log.finish(&summary.failures)?;
    info!(
        found = summary.files_found,
        renamed = summary.renamed,
        unchanged = summary.unchanged,
        failed = summary.failures.len(),
        dry_run = summary.dry_run,
        "Folder processed"
    );
    Ok(summary)
}

/// Read every file once, recording unreadable ones and collecting the
/// normalized senders and recipients of the rest.
fn survey_messages(files: &[PathBuf], rules: &Rules) -> Survey {
    let mut survey = Survey::default();
    for path in files {
        match parse_message(path) {
            Ok(record) => {
                survey
                    .senders
                    .insert(normalize_address(record.from.as_deref(), rules));
                survey
                    .recipients
                    .insert(normalize_address(record.to.as_deref(), rules));
            }
            Err(e) if e.is_unopenable() => {
                warn!(error = %e, "Unopenable file");
                survey.unopenable.push(display_name(path));
            }
            Err(e) => {
                warn!(error = %e, "Unparseable file");
                survey.unparseable.push(display_name(path));
            }
        }
    }
    survey
}

/// Set the file times to the message date (when known), then rename.
fn apply_rename(from: &Path, to: &Path, instant: Option<DateTime<Utc>>) -> Result<()> {
    if let Some(instant) = instant {
        set_file_times(from, instant.into()).map_err(|e| RenameError::io(from, e))?;
    }
    std::fs::rename(from, to).map_err(|e| RenameError::io(from, e))
}

/// Setting explicit times needs ownership of the file, not write access to it.
fn set_file_times(path: &Path, time: SystemTime) -> std::io::Result<()> {
    #[cfg(windows)]
    let file = {
        use std::os::windows::fs::OpenOptionsExt;
        // FILE_WRITE_ATTRIBUTES
        std::fs::File::options().access_mode(0x0100).open(path)?
    };
    #[cfg(not(windows))]
    let file = std::fs::File::open(path)?;

    file.set_times(
        std::fs::FileTimes::new()
            .set_accessed(time)
            .set_modified(time),
    )
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
