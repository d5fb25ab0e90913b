//! Filename sanitizing pre-pass, applied to every entry of a folder.

use std::path::Path;

use tracing::{debug, warn};

use crate::config::SanitizeConfig;
use crate::error::{RenameError, Result};

/// Which characters are unsafe on the deployment filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Strip a single leading `.`.
    pub strip_leading_dot: bool,
    /// Keep only ASCII letters, digits, punctuation and whitespace, then right-trim.
    pub restrict_charset: bool,
}

impl From<&SanitizeConfig> for SanitizePolicy {
    fn from(config: &SanitizeConfig) -> Self {
        Self {
            strip_leading_dot: config.strip_leading_dot,
            restrict_charset: config.restrict_charset,
        }
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self::from(&SanitizeConfig::default())
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_ascii_punctuation()
        || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Apply `policy` to one filename.
pub fn sanitized_name(name: &str, policy: SanitizePolicy) -> String {
    let name = match name.strip_prefix('.') {
        Some(rest) if policy.strip_leading_dot => rest,
        _ => name,
    };

    if policy.restrict_charset {
        let kept: String = name.chars().filter(|&c| is_allowed(c)).collect();
        kept.trim_end().to_string()
    } else {
        name.to_string()
    }
}

/// Rename every entry of `dir` whose name changes under `policy`.
///
/// Entries whose new name would be empty or would replace an existing entry
/// are left alone. Returns the number of entries renamed.
pub fn sanitize_filenames(dir: &Path, policy: SanitizePolicy) -> Result<usize> {
    if !dir.is_dir() {
        return Err(RenameError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut renamed = 0;
    for entry in std::fs::read_dir(dir).map_err(|e| RenameError::io(dir, e))? {
        let entry = entry.map_err(|e| RenameError::io(dir, e))?;
        let os_name = entry.file_name();

        let current = match os_name.to_str() {
            Some(s) => s.to_string(),
            None if policy.restrict_charset => os_name.to_string_lossy().into_owned(),
            None => {
                debug!(name = ?os_name, "Skipping non UTF-8 name");
                continue;
            }
        };

        let sanitized = sanitized_name(&current, policy);
        if sanitized == current && os_name.to_str().is_some() {
            continue;
        }
        if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
            warn!(name = %current, "Sanitized name would be empty, skipping");
            continue;
        }

        let target = dir.join(&sanitized);
        if target.exists() {
            warn!(
                from = %current,
                to = %sanitized,
                "Sanitized name already taken, skipping"
            );
            continue;
        }

        match std::fs::rename(entry.path(), &target) {
            Ok(()) => {
                debug!(from = %current, to = %sanitized, "Sanitized");
                renamed += 1;
            }
            Err(e) => warn!(from = %current, error = %e, "Could not sanitize name"),
        }
    }

    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CHARSET: SanitizePolicy = SanitizePolicy {
        strip_leading_dot: true,
        restrict_charset: false,
    };

    #[test]
    fn test_strip_leading_dot_once() {
        assert_eq!(sanitized_name(".hidden.eml", NO_CHARSET), "hidden.eml");
        assert_eq!(sanitized_name("..twice.eml", NO_CHARSET), ".twice.eml");
        assert_eq!(sanitized_name("plain.eml", NO_CHARSET), "plain.eml");
    }

    #[test]
    fn test_restrict_charset() {
        let policy = SanitizePolicy::default();
        assert_eq!(sanitized_name("Café déjà vu.eml", policy), "Caf dj vu.eml");
        assert_eq!(sanitized_name("report 📎 ", policy), "report");
        assert_eq!(sanitized_name("ok_name (1).eml", policy), "ok_name (1).eml");
    }

    #[test]
    fn test_policy_disabled() {
        let policy = SanitizePolicy {
            strip_leading_dot: false,
            restrict_charset: false,
        };
        assert_eq!(sanitized_name(".Café", policy), ".Café");
    }

    #[test]
    fn test_sanitize_filenames_renames_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".a.eml"), "x").unwrap();
        std::fs::write(dir.path().join("b\u{e9}.eml"), "x").unwrap();
        std::fs::write(dir.path().join("c.eml"), "x").unwrap();

        let count = sanitize_filenames(dir.path(), SanitizePolicy::default()).unwrap();
        assert_eq!(count, 2);
        assert!(dir.path().join("a.eml").exists());
        assert!(dir.path().join("b.eml").exists());
        assert!(dir.path().join("c.eml").exists());
    }

    #[test]
    fn test_sanitize_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".a.eml"), "hidden").unwrap();
        std::fs::write(dir.path().join("a.eml"), "visible").unwrap();

        let count = sanitize_filenames(dir.path(), SanitizePolicy::default()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.eml")).unwrap(),
            "visible"
        );
    }

    #[test]
    fn test_sanitize_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = sanitize_filenames(&dir.path().join("missing"), SanitizePolicy::default());
        assert!(matches!(err, Err(RenameError::DirectoryNotFound(_))));
    }
}
