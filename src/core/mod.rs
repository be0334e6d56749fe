//! Core data types for corpus preparation.
//!
//! - [`GenomeEntry`](genome::GenomeEntry): a registry row (name + kind)
//! - [`ResolvedGenomeFiles`](genome::ResolvedGenomeFiles): where a genome's FASTA files live
//! - [`GenomeSizeRecord`](size::GenomeSizeRecord): one row of the size report
//! - [`PipelineConfig`](config::PipelineConfig): tunables threaded through every stage
//! - [`GenomeKind`](types::GenomeKind), [`ChunkSource`](types::ChunkSource),
//!   [`FailurePolicy`](types::FailurePolicy): small enums shared across modules
//!
//! ## File naming
//!
//! A genome named `human` resolves to the first existing file among:
//!
//! | Priority | File |
//! |----------|------|
//! | 1 | `human.fa` |
//! | 2 | `human.fasta` |
//! | 3 | `human.fa.gz` |
//! | 4 | `human.fasta.gz` |

pub mod config;
pub mod genome;
pub mod size;
pub mod types;
