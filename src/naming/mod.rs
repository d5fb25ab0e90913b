//! Candidate filename construction and collision resolution.

use std::path::Path;

use crate::model::message::NormalizedFields;

/// Whitespace runs collapsed to a single space, in this order.
const DEAD_SPACE: [&str; 6] = ["\t", "\n", "\x0b", "\x0c", "\r", "  "];

/// Compose `"{date} [{subject}] fm {from} to {to}"`, tidy its whitespace,
/// truncate it to `max_len` characters and append `extension`.
pub fn build_filename(fields: &NormalizedFields, max_len: usize, extension: &str) -> String {
    let mut base = format!(
        "{} [{}] fm {} to {}",
        fields.date, fields.subject, fields.from, fields.to
    );

    for item in DEAD_SPACE {
        while base.contains(item) {
            base = base.replace(item, " ").trim().to_string();
        }
    }

    let mut name: String = base.chars().take(max_len).collect();
    name.push_str(extension);
    name
}

/// Return `candidate` if `dir` holds nothing by that name, otherwise the
/// first free `"<stem> (n)<extension>"` for n = 1, 2, …
pub fn resolve_collision(dir: &Path, candidate: &str, extension: &str) -> String {
    if !dir.join(candidate).exists() {
        return candidate.to_string();
    }

    let stem = candidate.strip_suffix(extension).unwrap_or(candidate);
    let mut counter: u64 = 1;
    loop {
        let name = format!("{stem} ({counter}){extension}");
        if !dir.join(&name).exists() {
            return name;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(date: &str, subject: &str, from: &str, to: &str) -> NormalizedFields {
        NormalizedFields {
            date: date.to_string(),
            subject: subject.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_build_filename_layout() {
        let f = fields("2017_08_15_143000", "Hello", "ann@example.com", "bob@example.com");
        assert_eq!(
            build_filename(&f, 190, ".eml"),
            "2017_08_15_143000 [Hello] fm ann@example.com to bob@example.com.eml"
        );
    }

    #[test]
    fn test_build_filename_collapses_whitespace() {
        let f = fields("0000_00_00", "A", "x  \t y@z.com", "q\r\n@w.org");
        assert_eq!(
            build_filename(&f, 190, ".eml"),
            "0000_00_00 [A] fm x y@z.com to q @w.org.eml"
        );
    }

    #[test]
    fn test_build_filename_truncates_before_extension() {
        let f = fields("2020_01_01_000000", &"s".repeat(30), &"f".repeat(35), &"t".repeat(35));
        let name = build_filename(&f, 40, ".eml");
        assert_eq!(name.chars().count(), 44);
        assert!(name.ends_with(".eml"));
        assert!(name.starts_with("2020_01_01_000000 [sss"));
    }

    #[test]
    fn test_resolve_collision_free_name() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_collision(dir.path(), "a.eml", ".eml"), "a.eml");
    }

    #[test]
    fn test_resolve_collision_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.eml"), "").unwrap();
        assert_eq!(resolve_collision(dir.path(), "a.eml", ".eml"), "a (1).eml");

        std::fs::write(dir.path().join("a (1).eml"), "").unwrap();
        assert_eq!(resolve_collision(dir.path(), "a.eml", ".eml"), "a (2).eml");
    }
}
