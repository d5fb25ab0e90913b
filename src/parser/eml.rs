//! Reader for individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use crate::error::{RenameError, Result};
use crate::model::message::MessageRecord;
use crate::parser::header;

/// Read a single message file and extract its raw `From`/`To`/`Subject`/`Date` values.
///
/// Only the header block is examined. Fails with [`RenameError::Io`] if the
/// file cannot be read and with [`RenameError::Unparseable`] if it holds no
/// recognizable header field.
pub fn parse_message(path: impl AsRef<Path>) -> Result<MessageRecord> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| RenameError::io(path, e))?;

    let header_end = header::find_header_end(&data).unwrap_or(data.len());
    header::parse_headers_to_record(&data[..header_end])
        .ok_or_else(|| RenameError::Unparseable(path.to_path_buf()))
}
