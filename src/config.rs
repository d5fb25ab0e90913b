//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. An explicit `--config` path
//! 2. `$EMLRENAME_CONFIG` (environment variable)
//! 3. `~/.config/emlrename/config.toml` (Linux/macOS)
//!    `%APPDATA%\emlrename\config.toml` (Windows)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Length limits for the generated names.
    pub limits: LimitsConfig,
    /// Pattern tables and sentinel tokens used by the normalizer.
    pub rules: RulesConfig,
    /// Filename sanitizing pre-pass.
    pub sanitize: SanitizeConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Extension of the message files to process, including the dot.
    pub extension: String,
    /// Name of the audit log written into the processed folder.
    pub log_file: String,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// `strftime` format used for the date part of new names (always UTC).
    pub date_format: String,
    /// Refuse to process folders holding more message files than this.
    pub max_files: usize,
    /// Override cache directory for the diagnostic log.
    pub cache_dir: Option<PathBuf>,
}

/// Length limits, counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum length of a new filename, extension excluded.
    pub max_filename_len: usize,
    /// Maximum length of the subject part.
    pub max_subject_len: usize,
    /// Maximum length of each address part.
    pub max_address_len: usize,
}

/// Literal patterns removed from header values, applied in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Reply, forward and notification stamps.
    pub stamps: Vec<String>,
    /// MIME encoded-word prefixes.
    pub encodings: Vec<String>,
    /// Punctuation markers.
    pub punctuation: Vec<String>,
    /// Quote characters and entities.
    pub quotes: Vec<String>,
    /// Characters that may not appear in a path component.
    pub illegal: Vec<String>,
    /// Token used when no usable address is found.
    pub no_addr: String,
    /// Token used when the subject is missing or too short.
    pub no_subj: String,
    /// Token used when the date is missing or unparseable.
    pub no_date: String,
}

/// Filename sanitizing pre-pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Strip a single leading `.` so hidden files become visible.
    pub strip_leading_dot: bool,
    /// Drop every character outside ASCII letters, digits, punctuation and whitespace.
    pub restrict_charset: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            extension: ".eml".to_string(),
            log_file: "convert_log.txt".to_string(),
            log_level: "warn".to_string(),
            date_format: "%Y_%m_%d_%H%M%S".to_string(),
            max_files: 10_000,
            cache_dir: None,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_filename_len: 190,
            max_subject_len: 30,
            max_address_len: 35,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            stamps: to_strings(&[
                "RE-",
                "Re-",
                "RE:",
                "Re:",
                "Re ",
                "FW:",
                "Fwd:",
                "FW_",
                "Automatic reply:",
                "Notification:",
                "DO NOT REPLY",
                "Emailing:",
                "Out of Office:",
                "REMINDER:",
                " Reminder:",
                "Accepted:",
                "Ad:",
            ]),
            encodings: to_strings(&["=?UTF-8?Q?", "=?UTF-8?q?", "=?iso-8859-1?Q?"]),
            punctuation: to_strings(&[
                "#", "!", "|", "/", "*", "...", "=", "+", "?", ";", " - ",
            ]),
            quotes: to_strings(&["'", "\"", "&quot"]),
            illegal: to_strings(&["<", ">", ":", "\"", "/", "\\", "|", "?", "*", "\n"]),
            no_addr: "No_Addr".to_string(),
            no_subj: "No_subj".to_string(),
            no_date: "0000_00_00".to_string(),
        }
    }
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            strip_leading_dot: true,
            restrict_charset: true,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from an explicit file.
///
/// Falls back to defaults (with a warning) if the file cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save configuration as pretty TOML, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("EMLRENAME_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("emlrename").join("config.toml"))
}

/// Return the cache directory for the diagnostic log.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("emlrename")
}

/// File name of the diagnostic log inside [`cache_dir`].
pub const LOG_FILE_NAME: &str = "emlrename.log";

/// Return the diagnostic log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.extension, ".eml");
        assert_eq!(cfg.general.max_files, 10_000);
        assert_eq!(cfg.limits.max_filename_len, 190);
        assert_eq!(cfg.limits.max_subject_len, 30);
        assert_eq!(cfg.limits.max_address_len, 35);
        assert_eq!(cfg.rules.no_addr, "No_Addr");
        assert_eq!(cfg.rules.stamps.first().map(String::as_str), Some("RE-"));
        assert!(cfg.sanitize.restrict_charset);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.date_format, cfg.general.date_format);
        assert_eq!(parsed.rules.punctuation, cfg.rules.punctuation);
        assert_eq!(parsed.rules.illegal, cfg.rules.illegal);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[general]
extension = ".msg"

[limits]
max_subject_len = 12

[rules]
stamps = ["AW:"]
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.general.extension, ".msg");
        assert_eq!(cfg.limits.max_subject_len, 12);
        assert_eq!(cfg.rules.stamps, vec!["AW:".to_string()]);
        // Other fields use defaults
        assert_eq!(cfg.general.log_file, "convert_log.txt");
        assert_eq!(cfg.limits.max_filename_len, 190);
        assert_eq!(cfg.rules.no_subj, "No_subj");
    }

    #[test]
    fn test_load_config_from_bad_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let cfg = load_config_from(&path);
        assert_eq!(cfg.general.max_files, 10_000);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sanitize]\nrestrict_charset = false\n").unwrap();
        let cfg = load_config_from(&path);
        assert!(!cfg.sanitize.restrict_charset);
        assert!(cfg.sanitize.strip_leading_dot);
    }

    #[test]
    fn test_save_config_to_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.general.extension = ".msg".to_string();
        cfg.rules.no_date = "undated".to_string();

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path);
        assert_eq!(loaded.general.extension, ".msg");
        assert_eq!(loaded.rules.no_date, "undated");
        assert_eq!(loaded.limits.max_filename_len, 190);
    }

    #[test]
    fn test_log_file_path_follows_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/emlrename-cache"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/emlrename-cache").join("emlrename.log")
        );
    }
}
