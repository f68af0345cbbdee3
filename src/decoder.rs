//! Streaming article-body decoding
//!
//! Binary postings arrive as uuencoded or base64 text; plain postings are
//! just text. The encoding is sniffed on the first body line of a file and
//! decoded incrementally, line by line, as the caller pulls bytes. Decode
//! anomalies are strictly line-local: a corrupt line contributes nothing
//! and the stream continues.

use crate::client::NntpConnection;
use crate::error::{NntpfsError, Result};
use crate::index::{Fragment, NewsFile};
use crate::pool::ConnectionPool;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;
use tracing::{debug, trace};

/// Decoded bytes buffered ahead of the caller per fill
const READ_BUFFER_TARGET: usize = 16 * 1024;

/// Transfer encoding of an article body, sniffed from its first line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// First line not seen yet
    Sniffing,
    /// Classic uuencode: length byte plus 4-to-3 text groups
    Uuencode,
    /// MIME base64 body
    Base64,
    /// No recognized binary encoding; lines pass through verbatim
    PlainText,
}

/// Per-file decoder state machine
///
/// Fed one body line at a time; decoded bytes append to the caller's
/// buffer. One decoder spans all fragments of a file — the encoding is
/// sniffed once, on the very first line.
#[derive(Debug)]
pub struct BodyDecoder {
    state: TransferEncoding,
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyDecoder {
    /// Create a decoder in the sniffing state
    pub fn new() -> Self {
        Self {
            state: TransferEncoding::Sniffing,
        }
    }

    /// Current encoding state
    pub fn encoding(&self) -> TransferEncoding {
        self.state
    }

    /// Consume one body line, appending any decoded bytes to `out`
    pub fn push_line(&mut self, line: &str, out: &mut Vec<u8>) {
        match self.state {
            TransferEncoding::Sniffing => {
                if line.starts_with("begin ") {
                    self.state = TransferEncoding::Uuencode;
                    return;
                }
                if line.starts_with("Content-Transfer-Encoding: base64") {
                    self.state = TransferEncoding::Base64;
                    return;
                }
                if is_uu_data_line(line) {
                    // a headerless post that starts straight into uu data
                    self.state = TransferEncoding::Uuencode;
                    decode_uu_line(line, out);
                    return;
                }
                self.state = TransferEncoding::PlainText;
                out.extend_from_slice(line.as_bytes());
                out.push(b'\n');
            }
            TransferEncoding::Uuencode => decode_uu_line(line, out),
            TransferEncoding::Base64 => decode_base64_line(line, out),
            TransferEncoding::PlainText => {
                out.extend_from_slice(line.as_bytes());
                out.push(b'\n');
            }
        }
    }
}

/// A full-length uuencode data line: 61 chars, `M` length byte (45 bytes),
/// every character in the printable uu range
fn is_uu_data_line(line: &str) -> bool {
    line.len() == 61
        && line.starts_with('M')
        && line.bytes().all(|b| (32..=95).contains(&b))
}

/// Decode one uuencoded line
///
/// The leading character declares the decoded byte count; the rest decodes
/// in 4-to-3 groups. Output is truncated to the declared length so pad
/// characters never leak into the stream. `end` and zero-length lines
/// contribute nothing.
fn decode_uu_line(line: &str, out: &mut Vec<u8>) {
    if line.is_empty() || line == "end" || line.starts_with("begin ") {
        return;
    }

    let bytes = line.as_bytes();
    let declared = (bytes[0].wrapping_sub(32) & 0x3F) as usize;
    if declared == 0 {
        return;
    }

    let mut decoded = Vec::with_capacity(declared + 3);
    let mut i = 1;
    while i + 4 <= bytes.len() {
        let b0 = bytes[i].wrapping_sub(32) & 0x3F;
        let b1 = bytes[i + 1].wrapping_sub(32) & 0x3F;
        let b2 = bytes[i + 2].wrapping_sub(32) & 0x3F;
        let b3 = bytes[i + 3].wrapping_sub(32) & 0x3F;

        decoded.push((b0 << 2) | (b1 >> 4));
        decoded.push((b1 << 4) | (b2 >> 2));
        decoded.push((b2 << 6) | b3);

        i += 4;
    }

    decoded.truncate(declared);
    out.extend_from_slice(&decoded);
}

/// Decode one base64 line; undecodable lines (stray headers, blank
/// separators, corruption) are skipped rather than failing the stream
fn decode_base64_line(line: &str, out: &mut Vec<u8>) {
    if line.is_empty() {
        return;
    }
    match BASE64.decode(line) {
        Ok(bytes) => out.extend_from_slice(&bytes),
        Err(_) => trace!("Skipping undecodable base64 line"),
    }
}

/// Pull-based byte cursor over one reconstructed file
///
/// Owns a pooled connection for the duration of the read. Fragments are
/// fetched with BODY in strictly increasing part order; the caller sees one
/// continuous byte stream — fragment boundaries never surface, and end of
/// file is only reported once the fragment list is exhausted.
pub struct FileReader {
    conn: Option<NntpConnection>,
    pool: Arc<ConnectionPool>,
    fragments: Vec<Fragment>,
    next_fragment: usize,
    in_flight: bool,
    decoder: BodyDecoder,
    buffer: Vec<u8>,
    buffer_offset: usize,
    eof: bool,
}

impl FileReader {
    pub(crate) fn new(conn: NntpConnection, pool: Arc<ConnectionPool>, file: &NewsFile) -> Self {
        let mut fragments = file.fragments().to_vec();
        fragments.sort_by_key(|f| f.part_number);
        Self {
            conn: Some(conn),
            pool,
            fragments,
            next_fragment: 0,
            in_flight: false,
            decoder: BodyDecoder::new(),
            buffer: Vec::new(),
            buffer_offset: 0,
            eof: false,
        }
    }

    /// Read up to `buf.len()` bytes into `buf`
    ///
    /// Blocks until the buffer is full or the file is exhausted; returns
    /// the number of bytes written, with 0 meaning end of file.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        while copied < buf.len() {
            let pending = self.buffer.len() - self.buffer_offset;
            if pending > 0 {
                let n = pending.min(buf.len() - copied);
                buf[copied..copied + n]
                    .copy_from_slice(&self.buffer[self.buffer_offset..self.buffer_offset + n]);
                self.buffer_offset += n;
                copied += n;
                continue;
            }
            if self.eof {
                break;
            }
            self.fill_buffer().await?;
        }
        Ok(copied)
    }

    /// Refill the decoded-byte buffer from the wire
    ///
    /// Advances to the next fragment (in part order) whenever no article is
    /// in flight; a lone `.` terminator closes the current article and the
    /// next fill moves on. EOF is set only when the fragment list runs out.
    async fn fill_buffer(&mut self) -> Result<()> {
        self.buffer.clear();
        self.buffer_offset = 0;

        let Some(conn) = self.conn.as_mut() else {
            return Err(NntpfsError::ConnectionClosed);
        };

        while self.buffer.len() < READ_BUFFER_TARGET {
            if !self.in_flight {
                let Some(fragment) = self.fragments.get(self.next_fragment) else {
                    self.eof = true;
                    break;
                };
                debug!(
                    "Fetching part {} ({})",
                    fragment.part_number, fragment.message_id
                );
                conn.begin_body(&fragment.message_id).await?;
                self.in_flight = true;
            }

            match conn.next_body_line().await? {
                Some(line) => self.decoder.push_line(&line, &mut self.buffer),
                None => {
                    self.in_flight = false;
                    self.next_fragment += 1;
                }
            }
        }
        Ok(())
    }

    /// Finish reading and hand the connection back to the pool
    ///
    /// A reader abandoned mid-article cannot pool its connection — unread
    /// body lines would poison the next command — so it is dropped instead.
    pub fn close(mut self) {
        if let Some(mut conn) = self.conn.take() {
            if self.in_flight {
                conn.mark_broken();
            }
            self.pool.release(conn);
        }
    }
}
