//! Host Channel Server
//!
//! Reads one call per line and writes one reply per line, in arrival order.
//! Each call runs to completion before the next line is read.

use anyhow::{Context, Result};
use sms_bridge_protocol::{channel, MethodCallHandler};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Result of reading one line with a size bound
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Eof,
    Line,
    /// The line held this many bytes; only the first `max_line_bytes` were kept
    Oversized(usize),
}

/// Read up to and including the next `\n` into `line`
///
/// At most `max_line_bytes` bytes are kept. The remainder of a longer line is
/// consumed and discarded.
async fn read_line_bounded<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max_line_bytes: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut total = 0usize;

    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                break;
            }

            let (chunk, done) = match available.iter().position(|b| *b == b'\n') {
                Some(i) => (&available[..=i], true),
                None => (available, false),
            };

            let room = max_line_bytes.saturating_sub(line.len());
            line.extend_from_slice(&chunk[..chunk.len().min(room)]);
            (chunk.len(), done)
        };

        reader.consume(used);
        total += used;

        if done {
            break;
        }
    }

    Ok(match total {
        0 => LineRead::Eof,
        n if n > max_line_bytes => LineRead::Oversized(n),
        _ => LineRead::Line,
    })
}

/// Serve calls from `reader` until end of input
///
/// Returns the number of replies written.
pub async fn serve<H, R, W>(
    handler: &H,
    mut reader: R,
    mut writer: W,
    max_line_bytes: usize,
) -> Result<u64>
where
    H: MethodCallHandler,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut replies = 0u64;

    loop {
        line.clear();
        let read = read_line_bounded(&mut reader, &mut line, max_line_bytes)
            .await
            .context("Failed to read from host channel")?;

        let reply = match read {
            LineRead::Eof => {
                info!("Host channel closed after {} replies", replies);
                return Ok(replies);
            }
            LineRead::Line => channel::handle_line(handler, &line, max_line_bytes),
            LineRead::Oversized(len) => {
                warn!("Discarded {} byte line (limit {})", len, max_line_bytes);
                channel::oversized_line_reply(&line, len, max_line_bytes)
            }
        };

        let Some(reply) = reply else {
            continue;
        };

        let bytes = reply.to_bytes().context("Failed to encode reply")?;
        writer
            .write_all(&bytes)
            .await
            .context("Failed to write reply")?;
        writer.flush().await.context("Failed to flush reply")?;

        debug!("Replied to call {}", reply.id);
        replies += 1;
    }
}
