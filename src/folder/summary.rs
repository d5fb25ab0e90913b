//! A quick inventory of a folder before it is processed.

use std::fmt;
use std::path::{Path, PathBuf};

use humansize::{format_size, BINARY};
use serde::Serialize;

use crate::error::{RenameError, Result};

/// Counts of the entries found in a folder.
#[derive(Debug, Clone, Serialize)]
pub struct FolderSummary {
    pub path: PathBuf,
    pub items: usize,
    pub files: usize,
    /// Entries whose extension matches, compared case-insensitively.
    pub messages: usize,
    pub dirs: usize,
    /// Entries that are neither files nor directories (e.g. dangling links).
    pub bad_items: Vec<String>,
    /// Total size of the matching message files.
    pub message_bytes: u64,
}

impl FolderSummary {
    /// Scan `dir` (non-recursively).
    pub fn scan(dir: &Path, extension: &str) -> Result<Self> {
        if !dir.is_dir() {
            return Err(RenameError::DirectoryNotFound(dir.to_path_buf()));
        }

        let wanted = extension.to_lowercase();
        let mut summary = Self {
            path: dir.to_path_buf(),
            items: 0,
            files: 0,
            messages: 0,
            dirs: 0,
            bad_items: Vec::new(),
            message_bytes: 0,
        };

        for entry in std::fs::read_dir(dir).map_err(|e| RenameError::io(dir, e))? {
            let entry = entry.map_err(|e| RenameError::io(dir, e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            summary.items += 1;

            let is_message = name.to_lowercase().ends_with(&wanted);
            if path.is_file() {
                summary.files += 1;
                if is_message {
                    summary.message_bytes += path.metadata().map(|m| m.len()).unwrap_or(0);
                }
            } else if path.is_dir() {
                summary.dirs += 1;
            } else {
                summary.bad_items.push(name.clone());
            }
            if is_message {
                summary.messages += 1;
            }
        }

        summary.bad_items.sort();
        Ok(summary)
    }
}

impl fmt::Display for FolderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!("    {}", "-".repeat(11));
        writeln!(f, "Path -> \"{}\"", self.path.display())?;
        writeln!(f, "{:>8} items", self.items)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:>8} files", self.files)?;
        writeln!(
            f,
            "{:>8} emails ({})",
            self.messages,
            format_size(self.message_bytes, BINARY)
        )?;
        writeln!(f, "{:>8} dirs", self.dirs)?;
        writeln!(f, "{:>8} bad items", self.bad_items.len())?;
        writeln!(f, "{rule}")?;
        for item in &self.bad_items {
            writeln!(f, "    {item}")?;
        }
        Ok(())
    }
}
