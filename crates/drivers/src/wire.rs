//! Framing and decoding of the target's socket protocol.
//!
//! A request is the UTF-8 statement followed by one NUL byte. A response
//! is every byte read until a NUL shows up anywhere in the accumulated
//! buffer. Requests and responses strictly alternate on a connection, so
//! there is never more than one frame in flight.
//!
//! Decoding is behind [`ResponseDecoder`] so that the text format can be
//! swapped without touching the workload engine.

use std::io::{self, Read, Write};

use tpcc_core::{QueryResult, Row};

/// Frame terminator.
pub const TERMINATOR: u8 = 0;

const READ_CHUNK: usize = 8192;

/// Append the terminator to `sql`.
#[must_use]
pub fn encode_request(sql: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(sql.len() + 1);
    frame.extend_from_slice(sql.as_bytes());
    frame.push(TERMINATOR);
    frame
}

/// Write one request frame and flush it.
///
/// # Errors
///
/// Propagates socket write errors.
pub fn write_frame<W: Write>(writer: &mut W, sql: &str) -> io::Result<()> {
    writer.write_all(&encode_request(sql))?;
    writer.flush()
}

/// Read until a terminator byte has been received.
///
/// Returns the accumulated bytes up to and including the terminator, or
/// `None` when the peer closed the connection before sending anything.
///
/// # Errors
///
/// Propagates socket read errors and reports a connection closed in the
/// middle of a frame as [`io::ErrorKind::UnexpectedEof`].
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut frame = Vec::new();
    let mut chunk = [0_u8; READ_CHUNK];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if read == 0 {
            if frame.is_empty() {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed inside a response frame",
            ));
        }
        frame.extend_from_slice(&chunk[..read]);
        if let Some(end) = frame.iter().position(|&byte| byte == TERMINATOR) {
            frame.truncate(end + 1);
            return Ok(Some(frame));
        }
    }
}

/// Strip NUL bytes and decode the remainder as UTF-8, replacing invalid
/// sequences.
#[must_use]
pub fn frame_text(frame: &[u8]) -> String {
    let bytes: Vec<u8> = frame
        .iter()
        .copied()
        .filter(|&byte| byte != TERMINATOR)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Turns one response frame into a [`QueryResult`].
pub trait ResponseDecoder {
    fn decode(&self, frame: &[u8]) -> QueryResult;
}

/// The target's text protocol: prefix classification plus `|`-delimited
/// tables whose first row is the header.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextTableDecoder;

impl ResponseDecoder for TextTableDecoder {
    fn decode(&self, frame: &[u8]) -> QueryResult {
        decode_text(&frame_text(frame))
    }
}

fn has_prefix_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Classify and parse an already-decoded response payload.
#[must_use]
pub fn decode_text(text: &str) -> QueryResult {
    if has_prefix_ignore_case(text, "abort") {
        return QueryResult::abort(text);
    }
    if has_prefix_ignore_case(text, "error") {
        return QueryResult::error(text);
    }

    let mut table = parse_table(text).into_iter();
    let columns = table.next().unwrap_or_default();
    let rows: Vec<Row> = table.collect();
    if let Some(ragged) = rows.iter().find(|row| row.len() != columns.len()) {
        tracing::warn!(
            header = columns.len(),
            row = ragged.len(),
            "row width does not match header"
        );
        return QueryResult::error(text);
    }
    QueryResult::ok(columns, rows, text)
}

/// Parse every `|`-prefixed line into trimmed cells, dropping lines whose
/// cells are all empty.
#[must_use]
pub fn parse_table(text: &str) -> Vec<Row> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| line.starts_with('|'))
        .map(|line| {
            let inner = line.strip_prefix('|').unwrap_or(line);
            let inner = inner.strip_suffix('|').unwrap_or(inner);
            inner
                .split('|')
                .map(|cell| cell.trim().to_owned())
                .collect::<Row>()
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect()
}

/// Render a table the way the target does, for clients that produce rows
/// themselves.
#[must_use]
pub fn render_table(columns: &[String], rows: &[Row]) -> String {
    let mut text = String::new();
    if columns.is_empty() {
        return text;
    }
    for line in core::iter::once(columns).chain(rows.iter().map(Vec::as_slice)) {
        text.push('|');
        for cell in line {
            text.push(' ');
            text.push_str(cell);
            text.push_str(" |");
        }
        text.push('\n');
    }
    text
}
