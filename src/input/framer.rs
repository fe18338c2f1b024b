//! Line framing for the serial byte stream
//!
//! [`LineFramer`] accumulates bytes until the buffered tail equals the
//! configured separator, so separators split across reads are handled the
//! same way as separators that arrive in one chunk. The remainder is never
//! capped: a device that never sends a separator keeps growing it.

use crate::input::separator::LineSeparator;

/// Splits a byte stream into lines
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    separator: LineSeparator,
    remainder: Vec<u8>,
}

impl LineFramer {
    pub fn new(separator: LineSeparator) -> Self {
        Self {
            separator,
            remainder: Vec::new(),
        }
    }

    /// Append `bytes`, calling `on_line` for every completed line
    ///
    /// Lines are passed without the separator. Returns the number of lines
    /// emitted.
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_line: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        let sep = self.separator.as_bytes();
        let mut lines = 0;

        for &b in bytes {
            self.remainder.push(b);
            if self.remainder.ends_with(sep) {
                let end = self.remainder.len() - sep.len();
                on_line(&self.remainder[..end]);
                self.remainder.clear();
                lines += 1;
            }
        }

        lines
    }

    /// Switch separators, re-scanning the pending remainder
    ///
    /// Boundaries that were invisible under the old separator are emitted
    /// immediately; only the final unterminated tail is kept.
    pub fn set_separator<F>(&mut self, separator: LineSeparator, mut on_line: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        self.separator = separator;
        let sep = self.separator.as_bytes();

        let mut from = 0;
        let mut lines = 0;
        while let Some(pos) = find(&self.remainder[from..], sep) {
            on_line(&self.remainder[from..from + pos]);
            from += pos + sep.len();
            lines += 1;
        }

        if from > 0 {
            self.remainder.drain(..from);
        }

        if lines > 0 {
            tracing::debug!(
                "Separator changed to {}, re-scan emitted {} line(s)",
                self.separator,
                lines
            );
        }
        lines
    }

    /// Drop any buffered partial line
    pub fn reset(&mut self) {
        self.remainder.clear();
    }

    pub fn separator(&self) -> &LineSeparator {
        &self.separator
    }

    /// Bytes received since the last line boundary
    pub fn remainder(&self) -> &[u8] {
        &self.remainder
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
