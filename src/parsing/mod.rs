//! Readers and writers for the pipeline's file formats.
//!
//! - **FASTA** ([`fasta`]): streaming genome reader, plain or gzip
//! - **Genome registry** ([`registry`]): TSV listing genomes and their kind
//! - **Size report** ([`size_report`]): TSV of per-genome sizes written by the
//!   genome stage and read back by the corpus stage
//!
//! ## Registry columns
//!
//! | Column | Description | Required |
//! |--------|-------------|----------|
//! | `genome_name` | File stem, lower-cased on load | Yes |
//! | `genome_type` | `both` or `unmasked` | Yes |

use std::path::PathBuf;
use thiserror::Error;

pub mod fasta;
pub mod registry;
pub mod size_report;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid genome registry: {0}")]
    Registry(String),

    #[error("Invalid size report: {0}")]
    SizeReport(String),

    #[error("Failed to read sequence from {}: {source}", path.display())]
    StreamDecode {
        path: PathBuf,
        source: std::io::Error,
    },
}
