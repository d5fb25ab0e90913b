//! Per-file message records and their normalized form.

/// Raw header values read from one stored message.
///
/// Values are kept exactly as they appear after header unfolding; `None`
/// means the header was absent. A record lives only while its file is
/// being processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRecord {
    /// First `From:` header.
    pub from: Option<String>,
    /// First `To:` header.
    pub to: Option<String>,
    /// First `Subject:` header.
    pub subject: Option<String>,
    /// First `Date:` header, normally RFC 2822.
    pub date: Option<String>,
}

/// Filesystem-safe name parts derived from a [`MessageRecord`].
///
/// Every field is non-empty and bounded in length. Missing or invalid
/// values are replaced by the configured sentinel tokens.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NormalizedFields {
    /// Sortable UTC timestamp, e.g. `2017_08_15_143000`.
    pub date: String,
    /// Condensed subject with underscores instead of spaces.
    pub subject: String,
    /// Lower-cased sender address.
    pub from: String,
    /// Lower-cased recipient address.
    pub to: String,
}
