//! # dna-corpus
//!
//! Prepare a text corpus for DNA tokenizer training from genome FASTA files.
//!
//! Each genome in a registry comes as an unmasked FASTA and, optionally, a
//! hard-masked FASTA where repeats are replaced by `N`. The pipeline:
//!
//! - **Measures** every genome and writes a size report
//! - **Splits** hard-masked genomes into their unmasked regions (the split store)
//! - **Selects** which sequence each genome contributes, mixing masked and
//!   unmasked sequence under a budget for large genomes
//! - **Windows** the selected sequence into uppercase lines of bounded length
//!
//! Files are streamed, never loaded whole, and every output is written in
//! registry order so runs are reproducible.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dna_corpus::core::config::{CorpusStagePaths, GenomeStagePaths, PipelineConfig};
//! use dna_corpus::pipeline::stages::{prepare_corpus, prepare_genomes};
//!
//! let genome = GenomeStagePaths::in_output_dir(
//!     "genomes.tsv",
//!     "hardmasked",
//!     "unmasked",
//!     Path::new("out"),
//! );
//! let corpus = CorpusStagePaths::after(&genome, "out/genome_corpus.txt");
//! let config = PipelineConfig { threads: 8, ..PipelineConfig::default() };
//!
//! prepare_genomes(&genome, &config).unwrap();
//! let summary = prepare_corpus(&corpus, &config).unwrap();
//! println!("{} lines", summary.corpus_lines.unwrap_or(0));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Genome entries, size records and pipeline configuration
//! - [`parsing`]: FASTA reading, the registry and the size report
//! - [`pipeline`]: Splitting, selection, windowing and the stage entry points
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::config::PipelineConfig;
pub use crate::core::genome::GenomeEntry;
pub use crate::core::size::GenomeSizeRecord;
pub use crate::core::types::*;
pub use pipeline::{PipelineError, RunSummary};
