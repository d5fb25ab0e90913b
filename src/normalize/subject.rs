//! Subject-line condensing.

use super::{remove_bracketed, strip_all, truncate_chars, Rules};

/// Condense a subject header into a short token without spaces.
///
/// Reply and forward stamps, encoded-word prefixes, punctuation, quotes and
/// illegal characters are stripped literally, then the last `(...)` and
/// `[...]` spans are cut out. Spaces become underscores.
pub fn normalize_subject(raw: Option<&str>, rules: &Rules) -> String {
    let subject = match raw {
        Some(s) if s.chars().count() >= 2 => s,
        _ => rules.no_subj.as_str(),
    };

    let subject = strip_all(subject, rules.subject_patterns());
    let subject = remove_bracketed(&subject, '(', ')');
    let subject = remove_bracketed(&subject, '[', ']');

    let subject = subject.replace(' ', "_").replace("__", "_");
    let subject = truncate_chars(subject.trim_matches('_'), rules.max_subject_len);

    if subject.is_empty() {
        rules.no_subj.clone()
    } else {
        subject
    }
}
