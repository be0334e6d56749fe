//! Per-genome corpus assembly and the ordered merge.
//!
//! Each genome writes its lines to its own file: the masked stream (read back
//! from the split store) first, then the unmasked stream. A chunk whose length
//! would overflow its stream's budget is rolled back from the file and ends the
//! stream. Budgets are charged with the bases actually written, so chunks
//! shorter than `min_length` and dropped window remainders cost nothing. The
//! finished files are concatenated in registry order.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::config::PipelineConfig;
use crate::parsing::fasta::{decode_error, FastaSource};
use crate::parsing::ParseError;
use crate::pipeline::selection::{BudgetTracker, ByteBudget, SelectionPlan};
use crate::pipeline::splitter::{split_source, ChunkSink, MaskedRegionSplitter};
use crate::pipeline::windowing::{WindowMark, Windower};
use crate::pipeline::PipelineError;
use crate::utils::output::{commit, temp_file_beside};

/// Sequence files feeding one genome's corpus lines
#[derive(Debug, Clone)]
pub struct GenomeCorpusInputs {
    /// Split-store file, present when the masked stream is selected
    pub split_store: Option<PathBuf>,
    pub unmasked: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenomeCorpusStats {
    pub lines: u64,
    pub masked_bases: u64,
    pub unmasked_bases: u64,
}

/// Chunk sink writing windows to a genome's corpus file under a budget
pub struct GenomeCorpusWriter {
    out: BufWriter<File>,
    windower: Windower,
    tracker: BudgetTracker,
    chunk_start: WindowMark,
    chunk_len: u64,
    in_chunk: bool,
}

impl GenomeCorpusWriter {
    #[must_use]
    pub fn new(out: File, max_seq_length: usize, min_length: usize) -> Self {
        Self {
            out: BufWriter::new(out),
            windower: Windower::new(max_seq_length, min_length),
            tracker: BudgetTracker::new(ByteBudget::Unlimited),
            chunk_start: WindowMark::default(),
            chunk_len: 0,
            in_chunk: false,
        }
    }

    /// Begin a new stream with its own budget
    pub fn start_stream(&mut self, budget: ByteBudget) {
        self.tracker = BudgetTracker::new(budget);
        self.in_chunk = false;
    }

    /// Bases written by the current stream
    #[must_use]
    pub fn stream_bases(&self) -> u64 {
        self.tracker.used()
    }

    /// Flush and return the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the flush fails.
    pub fn finish(mut self) -> io::Result<u64> {
        self.out.flush()?;
        Ok(self.windower.lines())
    }

    fn roll_back(&mut self) -> io::Result<()> {
        let mark = self.chunk_start;
        self.out.flush()?;
        let file = self.out.get_mut();
        file.set_len(mark.bytes)?;
        file.seek(SeekFrom::Start(mark.bytes))?;
        self.windower.rewind(mark);
        Ok(())
    }
}

impl ChunkSink for GenomeCorpusWriter {
    fn begin_chunk(&mut self, _contig: &str, _offset: u64) -> io::Result<()> {
        self.in_chunk = !self.tracker.is_exhausted();
        self.chunk_start = self.windower.mark();
        self.chunk_len = 0;
        Ok(())
    }

    fn extend_chunk(&mut self, bases: &[u8]) -> io::Result<()> {
        if !self.in_chunk {
            return Ok(());
        }

        let len = self.chunk_len + bases.len() as u64;
        if !self.tracker.would_fit(len) {
            self.roll_back()?;
            self.tracker.exhaust();
            self.in_chunk = false;
            return Ok(());
        }

        self.chunk_len = len;
        self.windower.push(bases, &mut self.out)
    }

    fn end_chunk(&mut self) -> io::Result<()> {
        if !self.in_chunk {
            return Ok(());
        }
        self.in_chunk = false;
        self.windower.finish_chunk(&mut self.out)?;

        // Each line is its bases plus a newline
        let end = self.windower.mark();
        let written = (end.bytes - self.chunk_start.bytes) - (end.lines - self.chunk_start.lines);
        self.tracker.admit(written);
        Ok(())
    }

    fn is_saturated(&self) -> bool {
        self.tracker.is_exhausted()
    }
}

/// Send every record of `source` to `sink` as one chunk, unchanged.
///
/// # Errors
///
/// Returns `ParseError::StreamDecode` for read failures and `ParseError::Io`
/// for sink failures.
pub fn stream_records<S: ChunkSink + ?Sized>(
    source: &mut FastaSource,
    sink: &mut S,
) -> Result<(), ParseError> {
    while let Some(mut record) = source.next_record()? {
        if sink.is_saturated() {
            break;
        }

        sink.begin_chunk(&record.name, 0)?;
        let path = record.path();
        let body = record.body();

        loop {
            let block = body.fill_buf().map_err(|e| decode_error(path, e))?;
            if block.is_empty() {
                break;
            }
            let n = block.len();
            for piece in block.split(u8::is_ascii_whitespace) {
                if !piece.is_empty() {
                    sink.extend_chunk(piece)?;
                }
            }
            body.consume(n);

            if sink.is_saturated() {
                break;
            }
        }

        sink.end_chunk()?;
    }

    Ok(())
}

/// Write one genome's corpus lines to `out` according to `plan`.
///
/// # Errors
///
/// Returns a `PipelineError` if an input cannot be read or the output written.
pub fn assemble_genome(
    genome: &str,
    plan: &SelectionPlan,
    inputs: &GenomeCorpusInputs,
    config: &PipelineConfig,
    out: File,
) -> Result<GenomeCorpusStats, PipelineError> {
    let mut writer = GenomeCorpusWriter::new(out, config.max_seq_length, config.min_length);
    let mut stats = GenomeCorpusStats::default();

    if let (Some(budget), Some(store)) = (plan.masked, inputs.split_store.as_deref()) {
        writer.start_stream(budget);
        let mut source = FastaSource::open(store)?;
        stream_records(&mut source, &mut writer)?;
        stats.masked_bases = writer.stream_bases();
    }

    writer.start_stream(plan.unmasked);
    let mut source = FastaSource::open(&inputs.unmasked)?;
    match config.unmasked_gap_length {
        Some(gap) => {
            let mut splitter = MaskedRegionSplitter::with_gap(config.min_length, gap);
            split_source(&mut source, &mut splitter, &mut writer)?;
        }
        None => stream_records(&mut source, &mut writer)?,
    }
    stats.unmasked_bases = writer.stream_bases();

    stats.lines = writer.finish()?;

    debug!(
        genome,
        lines = stats.lines,
        masked_bases = stats.masked_bases,
        unmasked_bases = stats.unmasked_bases,
        mixed = plan.is_mixed(),
        "assembled genome corpus"
    );

    Ok(stats)
}

/// Concatenate per-genome files into `corpus`, replacing it atomically.
///
/// # Errors
///
/// Returns an I/O error if a part cannot be read or the corpus written.
pub fn merge_parts(parts: &[PathBuf], corpus: &Path) -> io::Result<()> {
    let temp = temp_file_beside(corpus)?;
    {
        let file: &File = temp.as_file();
        let mut writer = BufWriter::new(file);
        for part in parts {
            io::copy(&mut File::open(part)?, &mut writer)?;
        }
        writer.flush()?;
    }
    commit(temp, corpus)
}
