//! Address normalization for `From:` and `To:` header values.

use super::{remove_bracketed, strip_all, truncate_chars, Rules};

/// Whitespace characters that may not follow the `@` of a valid address.
const ADDRESS_WHITESPACE: [char; 6] = [' ', '\t', '\n', '\r', '\x0b', '\x0c'];

/// Check for a plausible e-mail address.
///
/// Requires exactly one `@`, a `.` somewhere after it and no whitespace in
/// the domain part.
pub fn is_valid_address(candidate: &str) -> bool {
    let mut parts = candidate.split('@');
    let (Some(_local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    domain.contains('.') && !domain.contains(ADDRESS_WHITESPACE)
}

/// Reduce an address header to one lower-cased, bounded address token.
///
/// The address inside the first `<...>` pair is preferred. When that is not
/// a valid address, the bracketed part is cut out and the remainder is tried
/// instead. Headers listing several bracketed addresses keep only the first.
pub fn normalize_address(raw: Option<&str>, rules: &Rules) -> String {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return rules.no_addr.clone(),
    };

    let mut name = raw.to_string();
    if name.matches('>').count() > 1 {
        let first = name.split('>').next().unwrap_or_default();
        name = format!("{first}> etc");
    }

    let inside = name
        .split('<')
        .nth(1)
        .and_then(|segment| segment.split('>').next())
        .unwrap_or_default();

    let addr = if is_valid_address(inside) {
        inside.to_string()
    } else {
        let remainder = remove_bracketed(&name, '<', '>');
        if is_valid_address(&remainder) {
            remainder
        } else {
            rules.no_addr.clone()
        }
    };

    let addr = strip_all(&addr, rules.illegal.iter().map(String::as_str));
    truncate_chars(&addr, rules.max_address_len).to_lowercase()
}
