//! RFC 5322 header block handling: byte decoding, unfolding and lookup.

use crate::model::message::MessageRecord;

/// Build a [`MessageRecord`] from the raw header block of a message.
///
/// Header values are returned as written (unfolded, trimmed), without
/// RFC 2047 decoding. Returns `None` if no header field was recognized.
pub fn parse_headers_to_record(raw_headers: &[u8]) -> Option<MessageRecord> {
    let text = decode_header_bytes(raw_headers);
    let headers = unfold_headers(&text);
    if headers.is_empty() {
        return None;
    }

    Some(MessageRecord {
        from: get_header(&headers, "from"),
        to: get_header(&headers, "to"),
        subject: get_header(&headers, "subject"),
        date: get_header(&headers, "date"),
    })
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
fn decode_header_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns a list of `(lowercase_name, raw_value)` pairs.
fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if is_field_name(name) {
                result.push((name.to_lowercase(), value.trim().to_string()));
            }
        }
    }

    result
}

/// RFC 5322 field names are printable ASCII without spaces or colons.
fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':')
}

/// Get the first value for a header name (case-insensitive).
fn get_header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// Find the byte offset where headers end (position of the first blank line).
pub(crate) fn find_header_end(data: &[u8]) -> Option<usize> {
    for i in 0..data.len().saturating_sub(1) {
        if data[i] == b'\n' && data[i + 1] == b'\n' {
            return Some(i);
        }
        if data[i..].starts_with(b"\r\n\r\n") {
            return Some(i);
        }
    }
    None
}
