//! Text normalization: turn noisy header values into short, filesystem-safe tokens.
//!
//! All functions here are pure. The pattern tables live in [`Rules`] so that
//! tests and configuration can swap them out.

pub mod address;
pub mod subject;

pub use address::{is_valid_address, normalize_address};
pub use subject::normalize_subject;

use crate::config::Config;
use crate::model::message::{MessageRecord, NormalizedFields};

/// Ordered pattern tables, sentinel tokens and length limits used by the normalizer.
#[derive(Debug, Clone)]
pub struct Rules {
    pub stamps: Vec<String>,
    pub encodings: Vec<String>,
    pub punctuation: Vec<String>,
    pub quotes: Vec<String>,
    pub illegal: Vec<String>,
    pub no_addr: String,
    pub no_subj: String,
    pub no_date: String,
    pub date_format: String,
    pub max_subject_len: usize,
    pub max_address_len: usize,
}

impl Rules {
    /// Build the rule set from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let rules = &config.rules;
        Self {
            stamps: rules.stamps.clone(),
            encodings: rules.encodings.clone(),
            punctuation: rules.punctuation.clone(),
            quotes: rules.quotes.clone(),
            illegal: rules.illegal.clone(),
            no_addr: rules.no_addr.clone(),
            no_subj: rules.no_subj.clone(),
            no_date: rules.no_date.clone(),
            date_format: config.general.date_format.clone(),
            max_subject_len: config.limits.max_subject_len,
            max_address_len: config.limits.max_address_len,
        }
    }

    /// Every pattern stripped from a subject, in application order.
    fn subject_patterns(&self) -> impl Iterator<Item = &str> {
        self.stamps
            .iter()
            .chain(&self.encodings)
            .chain(&self.punctuation)
            .chain(&self.quotes)
            .chain(&self.illegal)
            .map(String::as_str)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Normalize every field of a parsed message.
///
/// `date` is the already formatted timestamp (or its sentinel).
pub fn normalize_fields(record: &MessageRecord, date: &str, rules: &Rules) -> NormalizedFields {
    NormalizedFields {
        date: date.to_string(),
        subject: normalize_subject(record.subject.as_deref(), rules),
        from: normalize_address(record.from.as_deref(), rules),
        to: normalize_address(record.to.as_deref(), rules),
    }
}

/// Remove the span between the last `left` and the first `right` that follows the split.
///
/// The string is split on `left` and the final segment kept; that segment is
/// split on `right` and its first part kept. Every occurrence of
/// `left + inner + right` is then removed. With several bracket pairs only
/// the last one goes: `"a (b) (c)"` becomes `"a (b) "`.
pub fn remove_bracketed(input: &str, left: char, right: char) -> String {
    let last = input.rsplit(left).next().unwrap_or(input);
    let inner = last.split(right).next().unwrap_or(last);
    let span = format!("{left}{inner}{right}");
    input.replace(&span, "")
}

/// Remove every occurrence of each pattern, in order.
pub(crate) fn strip_all<'a>(input: &str, patterns: impl IntoIterator<Item = &'a str>) -> String {
    let mut result = input.to_string();
    for pattern in patterns {
        if !pattern.is_empty() {
            result = result.replace(pattern, "");
        }
    }
    result
}

/// Keep at most `max` characters.
pub(crate) fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}
