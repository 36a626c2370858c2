// src/protocol/resp.rs
//
// Request/reply framing for the cache's serialization protocol. Only the
// shapes the cache probe needs are covered: request arrays of bulk strings,
// simple-string replies and single bulk-string replies.
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const CRLF: &[u8] = b"\r\n";

/// Largest bulk payload the decoder will buffer. Anything the server
/// declares above this is treated as a degraded reply.
pub const MAX_BULK_LEN: usize = 4 * 1024 * 1024;

/// Frame a command as an array of bulk strings:
/// `*<argc>\r\n$<len>\r\n<arg>\r\n...`
///
/// Lengths are byte lengths, so arguments may carry arbitrary bytes.
pub fn encode<A: AsRef<[u8]>>(args: &[A]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + args.iter().map(|a| a.as_ref().len() + 16).sum::<usize>());
    buf.push(b'*');
    buf.extend_from_slice(args.len().to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    for arg in args {
        buf.extend_from_slice(&encode_bulk(arg.as_ref()));
    }
    buf
}

/// Frame a single bulk string: `$<len>\r\n<payload>\r\n`.
pub fn encode_bulk(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 16);
    buf.push(b'$');
    buf.extend_from_slice(payload.len().to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(CRLF);
    buf
}

/// The null bulk reply, `$-1\r\n`.
pub fn encode_null() -> Vec<u8> {
    b"$-1\r\n".to_vec()
}

/// Split a reply line into `(ok, payload)`. `ok` is true iff the line is a
/// simple-string reply (leading `+`); the payload has the marker and line
/// terminator removed.
pub fn decode_simple(line: &str) -> (bool, &str) {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.strip_prefix('+') {
        Some(payload) => (true, payload),
        None => (false, line),
    }
}

/// Parse the declared length of a bulk reply header line.
/// Returns `None` for anything that is not a `$<int>` line.
pub fn bulk_length(length_line: &str) -> Option<i64> {
    length_line
        .trim_end_matches(['\r', '\n'])
        .strip_prefix('$')
        .and_then(|n| n.trim().parse().ok())
}

/// Decode a bulk reply whose header line has already been read.
///
/// A negative length (`$-1`), a non-bulk header or a length above
/// `MAX_BULK_LEN` yields `None` without touching `body`. Otherwise exactly
/// `len` payload bytes are read, followed by the trailing terminator line,
/// so the reader stays positioned at the next reply.
pub async fn decode_bulk<R>(length_line: &str, body: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let len = match bulk_length(length_line) {
        Some(len) if (0..=MAX_BULK_LEN as i64).contains(&len) => len as usize,
        _ => return Ok(None),
    };

    let mut payload = vec![0u8; len];
    body.read_exact(&mut payload).await?;

    let mut terminator = Vec::with_capacity(2);
    body.read_until(b'\n', &mut terminator).await?;

    Ok(Some(payload))
}
