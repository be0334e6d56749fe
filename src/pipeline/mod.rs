//! The genome-to-corpus pipeline.
//!
//! Two stages share a registry:
//!
//! 1. [`stages::prepare_genomes`] measures every genome, writes the size report
//!    and splits hard-masked genomes into the split store.
//! 2. [`stages::prepare_corpus`] applies the mixing policy to each genome and
//!    writes the corpus, one window per line, in registry order.

pub mod assembler;
pub mod runner;
pub mod selection;
pub mod sizes;
pub mod splitter;
pub mod stages;
pub mod windowing;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::genome::ResolutionError;
use crate::parsing::ParseError;
pub use runner::SkippedGenome;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    FileResolution(#[from] ResolutionError),

    #[error("Genome '{0}' is not in the size report")]
    MissingSizeRecord(String),

    #[error("Split store file {} is missing; run prepare-genome first", .0.display())]
    MissingSplitStore(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("genome '{genome}': {source}")]
    Genome {
        genome: String,
        source: Box<PipelineError>,
    },
}

/// What a stage did, for display and `--format json`
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub completed: Vec<String>,
    pub skipped: Vec<SkippedGenome>,

    /// Lines written to the corpus (corpus stage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_lines: Option<u64>,

    /// Files the stage wrote
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Fold a later stage's summary into this one
    pub fn merge(&mut self, later: RunSummary) {
        self.completed = later.completed;
        for skipped in later.skipped {
            if !self.skipped.iter().any(|s| s.name == skipped.name) {
                self.skipped.push(skipped);
            }
        }
        self.corpus_lines = later.corpus_lines.or(self.corpus_lines);
        self.outputs.extend(later.outputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_merge() {
        let mut first = RunSummary {
            completed: vec!["human".to_string()],
            skipped: vec![SkippedGenome {
                name: "mouse".to_string(),
                reason: "missing".to_string(),
            }],
            corpus_lines: None,
            outputs: vec![PathBuf::from("genome_sizes.txt")],
        };
        let second = RunSummary {
            completed: vec!["human".to_string()],
            skipped: vec![SkippedGenome {
                name: "mouse".to_string(),
                reason: "not in the size report".to_string(),
            }],
            corpus_lines: Some(6),
            outputs: vec![PathBuf::from("genome_corpus.txt")],
        };

        first.merge(second);
        assert_eq!(first.skipped.len(), 1);
        assert_eq!(first.skipped[0].reason, "missing");
        assert_eq!(first.corpus_lines, Some(6));
        assert_eq!(first.outputs.len(), 2);
        assert!(!first.is_complete());
    }

    #[test]
    fn test_summary_json() {
        let summary = RunSummary {
            completed: vec!["yeast".to_string()],
            ..RunSummary::default()
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"completed":["yeast"],"skipped":[],"outputs":[]}"#);
    }
}
