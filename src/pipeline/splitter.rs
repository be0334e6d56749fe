//! Masked region splitting.
//!
//! A hard-masked genome replaces repeats with `N`. The splitter walks each
//! sequence once and reports every maximal run of non-`N` bases that is at
//! least `min_length` long, together with its 0-based start offset. Shorter runs
//! are dropped.
//!
//! In gap mode (`min_gap > 1`) only runs of at least `min_gap` mask symbols
//! break a chunk; shorter runs stay inside it. This is used to cut unmasked
//! sequences at assembly gaps.
//!
//! Memory use is bounded by `min_length` plus one read buffer, independent of
//! sequence length.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::parsing::fasta::{decode_error, FastaSource};
use crate::parsing::ParseError;
use crate::pipeline::PipelineError;
use crate::utils::output::{commit, temp_file_beside, write_atomically};

/// The hard-mask symbol
pub const MASK_SYMBOL: u8 = b'N';

/// Suffix of split-store files (`<genome>_sp.fa`)
pub const SPLIT_STORE_SUFFIX: &str = "_sp.fa";

/// Suffix appended to a store path for its parameter sidecar
pub const SPLIT_PARAMS_SUFFIX: &str = ".params";

#[inline]
#[must_use]
pub fn is_mask(base: u8) -> bool {
    base.to_ascii_uppercase() == MASK_SYMBOL
}

/// Receiver of chunks produced while streaming a sequence.
///
/// Calls always come as `begin_chunk`, any number of `extend_chunk`, `end_chunk`.
pub trait ChunkSink {
    fn begin_chunk(&mut self, contig: &str, offset: u64) -> io::Result<()>;

    fn extend_chunk(&mut self, bases: &[u8]) -> io::Result<()>;

    fn end_chunk(&mut self) -> io::Result<()>;

    /// A saturated sink accepts no more chunks; producers may stop reading
    fn is_saturated(&self) -> bool {
        false
    }
}

/// Totals reported after a split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    pub chunks: u64,
    pub bases: u64,
    /// Runs dropped for being shorter than `min_length`
    pub discarded: u64,
}

/// Single-pass run detector. Feed it one record at a time.
#[derive(Debug)]
pub struct MaskedRegionSplitter {
    min_length: usize,
    min_gap: usize,

    contig: String,
    /// Offset of the next byte in the current record
    offset: u64,
    in_run: bool,
    run_start: u64,
    /// Mask symbols seen since the last base of the current run
    pending_mask: usize,
    /// Whether `begin_chunk` was sent for the current run
    emitted: bool,
    /// Run bases not yet handed to the sink
    buf: Vec<u8>,

    stats: SplitStats,
}

impl MaskedRegionSplitter {
    /// Splitter for hard-masked input: every `N` ends a run
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self::with_gap(min_length, 1)
    }

    /// Splitter that only breaks at `min_gap` or more consecutive `N`s
    #[must_use]
    pub fn with_gap(min_length: usize, min_gap: usize) -> Self {
        Self {
            min_length: min_length.max(1),
            min_gap: min_gap.max(1),
            contig: String::new(),
            offset: 0,
            in_run: false,
            run_start: 0,
            pending_mask: 0,
            emitted: false,
            buf: Vec::with_capacity(min_length),
            stats: SplitStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> SplitStats {
        self.stats
    }

    /// Start a new record; offsets restart at 0
    pub fn start_record(&mut self, contig: &str) {
        self.contig.clear();
        self.contig.push_str(contig);
        self.offset = 0;
        self.in_run = false;
        self.pending_mask = 0;
        self.emitted = false;
        self.buf.clear();
    }

    /// Feed the next slice of the current record. Whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Propagates errors from the sink.
    pub fn feed<S: ChunkSink + ?Sized>(&mut self, block: &[u8], sink: &mut S) -> io::Result<()> {
        for &byte in block {
            if byte.is_ascii_whitespace() {
                continue;
            }

            if is_mask(byte) {
                if self.in_run {
                    self.pending_mask += 1;
                    if self.pending_mask >= self.min_gap {
                        self.end_run(sink)?;
                    }
                }
            } else {
                if !self.in_run {
                    self.in_run = true;
                    self.run_start = self.offset;
                    self.emitted = false;
                    self.buf.clear();
                } else if self.pending_mask > 0 {
                    let gap = self.pending_mask;
                    self.pending_mask = 0;
                    self.buf.extend(std::iter::repeat(MASK_SYMBOL).take(gap));
                    if self.emitted {
                        self.stats.bases += gap as u64;
                    }
                }
                self.buf.push(byte.to_ascii_uppercase());
                if self.emitted {
                    self.stats.bases += 1;
                } else if self.buf.len() >= self.min_length {
                    sink.begin_chunk(&self.contig, self.run_start)?;
                    self.emitted = true;
                    self.stats.chunks += 1;
                    self.stats.bases += self.buf.len() as u64;
                }
            }

            self.offset += 1;
        }

        if self.emitted && !self.buf.is_empty() {
            sink.extend_chunk(&self.buf)?;
            self.buf.clear();
        }

        Ok(())
    }

    /// Close the current record, flushing any open run.
    ///
    /// # Errors
    ///
    /// Propagates errors from the sink.
    pub fn finish_record<S: ChunkSink + ?Sized>(&mut self, sink: &mut S) -> io::Result<()> {
        if self.in_run {
            self.end_run(sink)?;
        }
        Ok(())
    }

    fn end_run<S: ChunkSink + ?Sized>(&mut self, sink: &mut S) -> io::Result<()> {
        if self.emitted {
            if !self.buf.is_empty() {
                sink.extend_chunk(&self.buf)?;
            }
            sink.end_chunk()?;
        } else {
            self.stats.discarded += 1;
        }
        self.in_run = false;
        self.emitted = false;
        self.pending_mask = 0;
        self.buf.clear();
        Ok(())
    }
}

/// Stream every record of `source` through `splitter` into `sink`.
///
/// Stops early once the sink is saturated.
///
/// # Errors
///
/// Returns `ParseError::StreamDecode` for read failures and `ParseError::Io`
/// for sink failures.
pub fn split_source<S: ChunkSink + ?Sized>(
    source: &mut FastaSource,
    splitter: &mut MaskedRegionSplitter,
    sink: &mut S,
) -> Result<SplitStats, ParseError> {
    while let Some(mut record) = source.next_record()? {
        if sink.is_saturated() {
            break;
        }

        splitter.start_record(&record.name);
        let path = record.path();
        let body = record.body();

        loop {
            let block = body.fill_buf().map_err(|e| decode_error(path, e))?;
            if block.is_empty() {
                break;
            }
            let n = block.len();
            splitter.feed(block, sink)?;
            body.consume(n);

            if sink.is_saturated() {
                break;
            }
        }

        splitter.finish_record(sink)?;
    }

    Ok(splitter.stats())
}

/// Path of a genome's split-store file
#[must_use]
pub fn split_store_path(split_dir: &Path, genome: &str) -> PathBuf {
    split_dir.join(format!("{genome}{SPLIT_STORE_SUFFIX}"))
}

/// Sidecar recording the thresholds a split-store file was built with
#[must_use]
pub fn split_params_path(store: &Path) -> PathBuf {
    let mut name = store.as_os_str().to_os_string();
    name.push(SPLIT_PARAMS_SUFFIX);
    PathBuf::from(name)
}

fn split_params(min_length: usize) -> String {
    format!("min_length\t{min_length}\n")
}

/// A store file is reusable only if its sidecar matches the current thresholds
fn is_reusable(store: &Path, min_length: usize) -> bool {
    store.is_file()
        && std::fs::read_to_string(split_params_path(store))
            .is_ok_and(|params| params == split_params(min_length))
}

/// Writes chunks as FASTA records named `<contig>:<offset>`, one sequence line each
pub struct SplitStoreWriter<W: Write> {
    out: W,
}

impl<W: Write> SplitStoreWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChunkSink for SplitStoreWriter<W> {
    fn begin_chunk(&mut self, contig: &str, offset: u64) -> io::Result<()> {
        writeln!(self.out, ">{contig}:{offset}")
    }

    fn extend_chunk(&mut self, bases: &[u8]) -> io::Result<()> {
        self.out.write_all(bases)
    }

    fn end_chunk(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }
}

/// Outcome of [`split_genome_to_store`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    Written { path: PathBuf, stats: SplitStats },
    Cached { path: PathBuf },
}

/// Split a hard-masked FASTA into the split store.
///
/// An existing store file built with the same `min_length` is kept as is
/// unless `force` is set. New files are written atomically.
///
/// # Errors
///
/// Returns a `PipelineError` if the input cannot be read or the store written.
pub fn split_genome_to_store(
    genome: &str,
    masked: &Path,
    split_dir: &Path,
    min_length: usize,
    force: bool,
) -> Result<SplitOutcome, PipelineError> {
    let path = split_store_path(split_dir, genome);
    let params_path = split_params_path(&path);

    if !force && is_reusable(&path, min_length) {
        debug!(genome, path = %path.display(), "reusing split store");
        return Ok(SplitOutcome::Cached { path });
    }

    // Invalidate first so an interrupted rewrite is never taken for a cache hit
    match std::fs::remove_file(&params_path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let temp = temp_file_beside(&path)?;
    let stats = {
        let file: &File = temp.as_file();
        let mut writer = SplitStoreWriter::new(BufWriter::new(file));
        let mut source = FastaSource::open(masked)?;
        let mut splitter = MaskedRegionSplitter::new(min_length);
        let stats = split_source(&mut source, &mut splitter, &mut writer)?;
        writer.into_inner().flush()?;
        stats
    };
    commit(temp, &path)?;
    write_atomically::<io::Error, _>(&params_path, |w| {
        w.write_all(split_params(min_length).as_bytes())
    })?;

    info!(
        genome,
        chunks = stats.chunks,
        bases = stats.bases,
        discarded = stats.discarded,
        "split hard-masked genome"
    );

    Ok(SplitOutcome::Written { path, stats })
}
