//! Bounded worker pool over registry entries.
//!
//! Genomes are processed on a dedicated rayon pool. Results come back in
//! registry order whatever order the workers finish in.

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::core::genome::GenomeEntry;
use crate::core::types::FailurePolicy;
use crate::pipeline::PipelineError;

/// A genome left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedGenome {
    pub name: String,
    pub reason: String,
}

/// Per-genome results of one pool run
#[derive(Debug)]
pub struct GenomeOutcomes<T> {
    /// Registry index, entry name and result of every genome that succeeded
    pub completed: Vec<(usize, String, T)>,
    pub skipped: Vec<SkippedGenome>,
}

/// Run `work` for every entry on a pool of `threads` workers.
///
/// With `FailurePolicy::FailFast` the first error aborts the run. With
/// `FailurePolicy::Skip` failing genomes are logged and reported as skipped.
///
/// # Errors
///
/// Returns `PipelineError::ThreadPool` if the pool cannot be built, or the
/// failing genome's error under `FailFast`.
pub fn run_genomes<T, F>(
    entries: &[GenomeEntry],
    threads: usize,
    policy: FailurePolicy,
    work: F,
) -> Result<GenomeOutcomes<T>, PipelineError>
where
    T: Send,
    F: Fn(usize, &GenomeEntry) -> Result<T, PipelineError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    let run_one = |(index, entry): (usize, &GenomeEntry)| {
        work(index, entry).map_err(|e| PipelineError::Genome {
            genome: entry.name.clone(),
            source: Box::new(e),
        })
    };

    let mut outcomes = GenomeOutcomes {
        completed: Vec::with_capacity(entries.len()),
        skipped: Vec::new(),
    };

    match policy {
        FailurePolicy::FailFast => {
            let results: Vec<T> = pool.install(|| {
                entries
                    .par_iter()
                    .enumerate()
                    .map(run_one)
                    .collect::<Result<Vec<_>, _>>()
            })?;
            for ((index, entry), result) in entries.iter().enumerate().zip(results) {
                outcomes.completed.push((index, entry.name.clone(), result));
            }
        }
        FailurePolicy::Skip => {
            let results: Vec<Result<T, PipelineError>> =
                pool.install(|| entries.par_iter().enumerate().map(run_one).collect());
            for ((index, entry), result) in entries.iter().enumerate().zip(results) {
                match result {
                    Ok(value) => outcomes.completed.push((index, entry.name.clone(), value)),
                    Err(e) => {
                        warn!(genome = %entry.name, "skipping genome: {e}");
                        outcomes.skipped.push(SkippedGenome {
                            name: entry.name.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::genome::ResolutionError;
    use crate::core::types::{ChunkSource, GenomeKind};
    use std::path::PathBuf;

    fn entries(names: &[&str]) -> Vec<GenomeEntry> {
        names
            .iter()
            .map(|n| GenomeEntry::new(n, GenomeKind::UnmaskedOnly))
            .collect()
    }

    fn fail_on_b(_: usize, entry: &GenomeEntry) -> Result<String, PipelineError> {
        if entry.name == "b" {
            Err(ResolutionError {
                genome: entry.name.clone(),
                stream: ChunkSource::Unmasked,
                dir: PathBuf::from("genomes"),
            }
            .into())
        } else {
            Ok(entry.name.to_uppercase())
        }
    }

    #[test]
    fn test_results_in_registry_order() {
        let list = entries(&["e", "d", "c", "b", "a", "f", "g", "h"]);
        let outcomes = run_genomes(&list, 4, FailurePolicy::FailFast, |i, e| {
            std::thread::sleep(std::time::Duration::from_millis(((8 - i) * 3) as u64));
            Ok(format!("{i}:{}", e.name))
        })
        .unwrap();

        let values: Vec<String> = outcomes.completed.into_iter().map(|(_, _, v)| v).collect();
        assert_eq!(values, vec!["0:e", "1:d", "2:c", "3:b", "4:a", "5:f", "6:g", "7:h"]);
    }

    #[test]
    fn test_fail_fast_returns_genome_error() {
        let list = entries(&["a", "b", "c"]);
        let err = run_genomes(&list, 2, FailurePolicy::FailFast, fail_on_b).unwrap_err();
        assert!(matches!(err, PipelineError::Genome { ref genome, .. } if genome == "b"));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_skip_collects_failures() {
        let list = entries(&["a", "b", "c"]);
        let outcomes = run_genomes(&list, 2, FailurePolicy::Skip, fail_on_b).unwrap();

        let done: Vec<(usize, String)> = outcomes
            .completed
            .iter()
            .map(|(i, n, _)| (*i, n.clone()))
            .collect();
        assert_eq!(done, vec![(0, "a".to_string()), (2, "c".to_string())]);
        assert_eq!(outcomes.skipped.len(), 1);
        assert_eq!(outcomes.skipped[0].name, "b");
        assert!(outcomes.skipped[0].reason.contains("no unmasked FASTA"));
    }
}
