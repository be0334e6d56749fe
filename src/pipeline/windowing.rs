//! Cutting chunks into corpus lines.
//!
//! A chunk of length `L` yields `L / max` full windows and, when the remainder
//! is at least `min` long, one shorter final window.

use std::io::{self, Write};

/// Windows of `seq`: consecutive, non-overlapping, at most `max` long, with a
/// final remainder shorter than `min` dropped
pub fn windows(seq: &[u8], max: usize, min: usize) -> impl Iterator<Item = &[u8]> {
    seq.chunks(max.max(1)).filter(move |w| w.len() >= min)
}

/// Number of windows a chunk of `len` bases produces
#[must_use]
pub fn window_count(len: u64, max: u64, min: u64) -> u64 {
    let max = max.max(1);
    let full = len / max;
    if len % max >= min.max(1) {
        full + 1
    } else {
        full
    }
}

/// Output position of a [`Windower`], used to undo a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowMark {
    pub lines: u64,
    pub bytes: u64,
}

/// Streaming windower writing one window per line.
///
/// Holds at most one partial window, so memory is bounded by `max`.
#[derive(Debug)]
pub struct Windower {
    max: usize,
    min: usize,
    buf: Vec<u8>,
    lines: u64,
    bytes: u64,
}

impl Windower {
    #[must_use]
    pub fn new(max: usize, min: usize) -> Self {
        let max = max.max(1);
        Self {
            max,
            min: min.max(1),
            buf: Vec::with_capacity(max),
            lines: 0,
            bytes: 0,
        }
    }

    /// Lines written since construction
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Append bases to the current chunk, writing every window that fills up.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn push<W: Write + ?Sized>(&mut self, mut bases: &[u8], out: &mut W) -> io::Result<()> {
        while !bases.is_empty() {
            let take = (self.max - self.buf.len()).min(bases.len());
            self.buf.extend(bases[..take].iter().map(u8::to_ascii_uppercase));
            bases = &bases[take..];

            if self.buf.len() == self.max {
                self.emit(out)?;
            }
        }
        Ok(())
    }

    /// End the current chunk, writing its final window if long enough.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn finish_chunk<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.buf.len() >= self.min {
            self.emit(out)?;
        }
        self.buf.clear();
        Ok(())
    }

    /// Current output position
    #[must_use]
    pub fn mark(&self) -> WindowMark {
        WindowMark {
            lines: self.lines,
            bytes: self.bytes,
        }
    }

    /// Forget everything written after `mark`; the caller truncates the output
    pub fn rewind(&mut self, mark: WindowMark) {
        self.buf.clear();
        self.lines = mark.lines;
        self.bytes = mark.bytes;
    }

    fn emit<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.buf)?;
        out.write_all(b"\n")?;
        self.bytes += self.buf.len() as u64 + 1;
        self.buf.clear();
        self.lines += 1;
        Ok(())
    }
}
