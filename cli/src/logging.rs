//! Logging initialization: logs go only to `LOG_FILE` (or are dropped), never to the console,
//! so stdout carries the tree or the NDJSON event stream only.

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const DEFAULT_FILTER: &str = "info,hyper_util=off,reqwest=warn";

/// - **RUST_LOG**: filter, e.g. `topicgraph=debug`. Default: `info`.
/// - **LOG_FILE**: append plain-text logs (ANSI stripped) to this path. Unset: logs are dropped.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    match std::env::var("LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let writer = std::sync::Mutex::new(StripAnsiWriter::new(file));
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(crate::log_format::TextWithSpanIds::new())
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).init();
            tracing::info!(path = %path, "topicgraph logging to file");
        }
        _ => {
            let sink_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(sink_layer).init();
        }
    }
    Ok(())
}

/// Drops CSI escape sequences (`ESC [ ... final`) so file logs stay plain text. Other
/// escapes pass through. A sequence may span several `write` calls.
struct StripAnsiWriter<W> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> StripAnsiWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(16),
        }
    }

    fn flush_pending(&mut self) -> std::io::Result<()> {
        self.inner.write_all(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

const ESC: u8 = 0x1b;
const MAX_SEQUENCE: usize = 64;

impl<W: Write> Write for StripAnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut rest = buf;
        while !rest.is_empty() {
            if self.pending.is_empty() {
                match rest.iter().position(|&b| b == ESC) {
                    Some(i) => {
                        self.inner.write_all(&rest[..i])?;
                        self.pending.push(ESC);
                        rest = &rest[i + 1..];
                    }
                    None => {
                        self.inner.write_all(rest)?;
                        break;
                    }
                }
                continue;
            }

            let b = rest[0];
            rest = &rest[1..];
            if self.pending.len() == 1 {
                self.pending.push(b);
                if b != b'[' {
                    self.flush_pending()?;
                }
            } else if (0x40..=0x7e).contains(&b) {
                self.pending.clear();
            } else if b.is_ascii_digit() || matches!(b, b';' | b'?' | b':') {
                self.pending.push(b);
                if self.pending.len() > MAX_SEQUENCE {
                    self.flush_pending()?;
                }
            } else {
                self.pending.push(b);
                self.flush_pending()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.flush_pending()?;
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(chunks: &[&[u8]]) -> String {
        let mut w = StripAnsiWriter::new(Vec::new());
        for c in chunks {
            w.write_all(c).unwrap();
        }
        w.flush().unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    #[test]
    fn removes_color_sequences() {
        assert_eq!(strip(&[b"\x1b[1;32mINFO\x1b[0m merged"]), "INFO merged");
    }

    #[test]
    fn sequence_split_across_writes() {
        assert_eq!(strip(&[b"a\x1b[3", b"1mb"]), "ab");
    }

    #[test]
    fn non_csi_escape_passes_through() {
        assert_eq!(strip(&[b"x\x1bMy"]), "x\x1bMy");
    }
}
