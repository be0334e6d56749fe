//! Genome size collection.

use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::core::genome::{GenomeEntry, ResolvedGenomeFiles};
use crate::core::size::{GenomeSizeRecord, SequenceStats};
use crate::parsing::fasta::{decode_error, FastaSource};
use crate::parsing::ParseError;
use crate::pipeline::splitter::is_mask;

/// Stream a FASTA file once and count its records, bases and mask symbols.
///
/// # Errors
///
/// Returns `ParseError::StreamDecode` if the file cannot be read or decoded.
pub fn collect_file_stats(path: &Path) -> Result<SequenceStats, ParseError> {
    let mut stats = SequenceStats::default();
    let mut source = FastaSource::open(path)?;

    while let Some(mut record) = source.next_record()? {
        let path = record.path();
        let body = record.body();
        let mut len = 0u64;
        let mut masked = 0u64;

        loop {
            let block = body.fill_buf().map_err(|e| decode_error(path, e))?;
            if block.is_empty() {
                break;
            }
            for &byte in block {
                if byte.is_ascii_whitespace() {
                    continue;
                }
                len += 1;
                if is_mask(byte) {
                    masked += 1;
                }
            }
            let n = block.len();
            body.consume(n);
        }

        stats.add_record(len, masked);
    }

    stats.file_bytes = std::fs::metadata(path)
        .map_err(|e| decode_error(path, e))?
        .len();

    Ok(stats)
}

/// Size record for one genome from its resolved files
///
/// # Errors
///
/// Returns `ParseError::StreamDecode` if either file cannot be read.
pub fn collect_genome_size(
    entry: &GenomeEntry,
    files: &ResolvedGenomeFiles,
) -> Result<GenomeSizeRecord, ParseError> {
    let unmasked = collect_file_stats(&files.unmasked)?;
    let masked = files
        .masked
        .as_deref()
        .map(collect_file_stats)
        .transpose()?;

    debug!(
        genome = %entry.name,
        num_seqs = unmasked.num_seqs,
        unmasked_bases = unmasked.base_count,
        masked_bases = masked.as_ref().map(SequenceStats::unmasked_bases),
        "collected genome size"
    );

    Ok(GenomeSizeRecord::from_stats(
        entry.name.clone(),
        entry.kind,
        &unmasked,
        masked.as_ref(),
    ))
}
