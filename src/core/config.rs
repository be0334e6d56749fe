use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::FailurePolicy;

pub const DEFAULT_MAX_SEQ_LENGTH: usize = 4000;
pub const DEFAULT_MIN_LENGTH: usize = 100;
pub const DEFAULT_GENOME_SPLIT_SIZE_MB: u64 = 500;

/// Genome sizes are given in decimal megabytes of sequence
pub const BYTES_PER_MB: u64 = 1_000_000;

/// File and directory names used inside an output directory
pub const SIZE_REPORT_FILE: &str = "genome_sizes.txt";
pub const SPLIT_STORE_DIR: &str = "hardmask_split";
pub const CORPUS_FILE: &str = "genome_corpus.txt";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_length must be at least 1")]
    ZeroMinLength,

    #[error("max_seq_length ({max}) must be >= min_length ({min})")]
    MaxBelowMin { max: usize, min: usize },

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("unmasked gap length must be at least 1")]
    ZeroGapLength,
}

/// Tunables shared by every pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Longest corpus line
    pub max_seq_length: usize,

    /// Shortest chunk kept by the splitter and shortest corpus line
    pub min_length: usize,

    /// Genomes at or above this many bytes are mixed from masked and unmasked
    pub genome_split_size: u64,

    /// Per-stream byte budget in the mixed branch; half of `genome_split_size` if unset
    pub mixing_budget: Option<u64>,

    /// Worker threads for per-genome processing
    pub threads: usize,

    pub failure_policy: FailurePolicy,

    /// Split unmasked sequences at runs of at least this many `N`s
    pub unmasked_gap_length: Option<usize>,

    /// Rebuild split-store files even if they already exist
    pub force: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_seq_length: DEFAULT_MAX_SEQ_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
            genome_split_size: DEFAULT_GENOME_SPLIT_SIZE_MB * BYTES_PER_MB,
            mixing_budget: None,
            threads: 1,
            failure_policy: FailurePolicy::default(),
            unmasked_gap_length: None,
            force: false,
        }
    }
}

impl PipelineConfig {
    /// Check the numeric settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_length == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        if self.max_seq_length < self.min_length {
            return Err(ConfigError::MaxBelowMin {
                max: self.max_seq_length,
                min: self.min_length,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.unmasked_gap_length == Some(0) {
            return Err(ConfigError::ZeroGapLength);
        }
        Ok(())
    }

    /// Byte budget applied to each stream of a mixed genome
    #[must_use]
    pub fn effective_mixing_budget(&self) -> u64 {
        self.mixing_budget.unwrap_or(self.genome_split_size / 2)
    }
}

/// Inputs and outputs of the genome preparation stage
#[derive(Debug, Clone)]
pub struct GenomeStagePaths {
    pub registry: PathBuf,
    pub masked_dir: PathBuf,
    pub unmasked_dir: PathBuf,
    pub size_report: PathBuf,
    pub split_dir: PathBuf,
}

impl GenomeStagePaths {
    /// Standard layout: size report and split store inside `output_dir`
    pub fn in_output_dir(
        registry: impl Into<PathBuf>,
        masked_dir: impl Into<PathBuf>,
        unmasked_dir: impl Into<PathBuf>,
        output_dir: &Path,
    ) -> Self {
        Self {
            registry: registry.into(),
            masked_dir: masked_dir.into(),
            unmasked_dir: unmasked_dir.into(),
            size_report: output_dir.join(SIZE_REPORT_FILE),
            split_dir: output_dir.join(SPLIT_STORE_DIR),
        }
    }
}

/// Inputs and output of the corpus assembly stage
#[derive(Debug, Clone)]
pub struct CorpusStagePaths {
    pub registry: PathBuf,
    pub unmasked_dir: PathBuf,
    pub size_report: PathBuf,
    pub split_dir: PathBuf,
    pub corpus: PathBuf,
}

impl CorpusStagePaths {
    /// Corpus stage reading what the genome stage wrote
    #[must_use]
    pub fn after(genome: &GenomeStagePaths, corpus: impl Into<PathBuf>) -> Self {
        Self {
            registry: genome.registry.clone(),
            unmasked_dir: genome.unmasked_dir.clone(),
            size_report: genome.size_report.clone(),
            split_dir: genome.split_dir.clone(),
            corpus: corpus.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_seq_length, 4000);
        assert_eq!(config.min_length, 100);
        assert_eq!(config.genome_split_size, 500_000_000);
        assert_eq!(config.effective_mixing_budget(), 250_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_mixing_budget() {
        let config = PipelineConfig {
            genome_split_size: 1,
            mixing_budget: Some(42),
            ..PipelineConfig::default()
        };
        assert_eq!(config.effective_mixing_budget(), 42);
    }

    #[test]
    fn test_validate_rejects_inconsistent_lengths() {
        let config = PipelineConfig {
            max_seq_length: 50,
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MaxBelowMin { max: 50, min: 100 })
        );

        let config = PipelineConfig {
            min_length: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinLength));

        let config = PipelineConfig {
            threads: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroThreads));
    }

    #[test]
    fn test_stage_paths_layout() {
        let genome = GenomeStagePaths::in_output_dir("g.tsv", "masked", "unmasked", Path::new("out"));
        assert_eq!(genome.size_report, Path::new("out").join("genome_sizes.txt"));
        assert_eq!(genome.split_dir, Path::new("out").join("hardmask_split"));

        let corpus = CorpusStagePaths::after(&genome, "out/corpus.txt");
        assert_eq!(corpus.split_dir, genome.split_dir);
        assert_eq!(corpus.corpus, PathBuf::from("out/corpus.txt"));
    }
}
