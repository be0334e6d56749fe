use serde::Serialize;

use crate::core::types::GenomeKind;

/// Counts gathered while streaming one FASTA file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceStats {
    pub num_seqs: u64,

    /// All sequence symbols, mask symbols included
    pub base_count: u64,

    /// Mask symbols (`N`/`n`)
    pub mask_count: u64,

    pub min_len: u64,
    pub max_len: u64,

    /// Size of the file on disk (compressed size for gzip input)
    pub file_bytes: u64,
}

impl SequenceStats {
    /// Fold one finished record of `len` bases into the totals
    pub fn add_record(&mut self, len: u64, masked: u64) {
        if self.num_seqs == 0 {
            self.min_len = len;
            self.max_len = len;
        } else {
            self.min_len = self.min_len.min(len);
            self.max_len = self.max_len.max(len);
        }
        self.num_seqs += 1;
        self.base_count += len;
        self.mask_count += masked;
    }

    /// Bases that are not the mask symbol
    #[must_use]
    pub fn unmasked_bases(&self) -> u64 {
        self.base_count - self.mask_count
    }

    /// Mean record length, rounded to the nearest integer
    #[must_use]
    pub fn avg_len(&self) -> u64 {
        if self.num_seqs == 0 {
            0
        } else {
            (self.base_count + self.num_seqs / 2) / self.num_seqs
        }
    }
}

/// Per-genome row of the size report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomeSizeRecord {
    pub name: String,
    pub kind: GenomeKind,

    /// Records in the unmasked FASTA
    pub num_seqs: u64,

    /// All bases of the unmasked FASTA
    pub unmasked_base_count: u64,

    /// Non-mask bases of the hard-masked FASTA, i.e. what splitting can yield
    pub masked_base_count: Option<u64>,

    pub min_len: u64,
    pub avg_len: u64,
    pub max_len: u64,

    pub unmasked_file_bytes: u64,
    pub masked_file_bytes: Option<u64>,
}

impl GenomeSizeRecord {
    /// Build a record from the statistics of the genome's files
    #[must_use]
    pub fn from_stats(
        name: impl Into<String>,
        kind: GenomeKind,
        unmasked: &SequenceStats,
        masked: Option<&SequenceStats>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            num_seqs: unmasked.num_seqs,
            unmasked_base_count: unmasked.base_count,
            masked_base_count: masked.map(SequenceStats::unmasked_bases),
            min_len: unmasked.min_len,
            avg_len: unmasked.avg_len(),
            max_len: unmasked.max_len,
            unmasked_file_bytes: unmasked.file_bytes,
            masked_file_bytes: masked.map(|m| m.file_bytes),
        }
    }

    /// Combined size shown in the size report, one byte per base
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.unmasked_base_count + self.masked_base_count.unwrap_or(0)
    }
}
