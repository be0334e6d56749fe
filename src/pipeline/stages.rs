//! Stage entry points called by the CLI.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::{CorpusStagePaths, GenomeStagePaths, PipelineConfig};
use crate::core::genome::{resolve_genome_file, GenomeEntry, ResolutionError, ResolvedGenomeFiles};
use crate::core::size::GenomeSizeRecord;
use crate::core::types::{ChunkSource, GenomeKind};
use crate::parsing::registry::parse_registry_file;
use crate::parsing::size_report::{parse_size_report_file, write_size_report};
use crate::pipeline::assembler::{assemble_genome, merge_parts, GenomeCorpusInputs};
use crate::pipeline::runner::run_genomes;
use crate::pipeline::selection::select;
use crate::pipeline::sizes::collect_genome_size;
use crate::pipeline::splitter::{split_genome_to_store, split_store_path};
use crate::pipeline::{PipelineError, RunSummary};
use crate::utils::output::parent_dir;

/// Measure every genome, write the size report and fill the split store.
///
/// # Errors
///
/// Returns a `PipelineError` for an invalid configuration or registry, a
/// failing genome under `FailFast`, or a report that cannot be written.
pub fn prepare_genomes(
    paths: &GenomeStagePaths,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let entries = parse_registry_file(&paths.registry)?;
    info!(
        genomes = entries.len(),
        threads = config.threads,
        "preparing genomes"
    );

    let outcomes = run_genomes(
        &entries,
        config.threads,
        config.failure_policy,
        |_, entry| {
            let files = ResolvedGenomeFiles::resolve(entry, &paths.masked_dir, &paths.unmasked_dir)?;
            let size = collect_genome_size(entry, &files)?;
            if let Some(masked) = &files.masked {
                split_genome_to_store(
                    &entry.name,
                    masked,
                    &paths.split_dir,
                    config.min_length,
                    config.force,
                )?;
            }
            Ok(size)
        },
    )?;

    let records: Vec<GenomeSizeRecord> = outcomes
        .completed
        .iter()
        .map(|(_, _, record)| record.clone())
        .collect();
    write_size_report(&paths.size_report, &records)?;
    info!(
        path = %paths.size_report.display(),
        genomes = records.len(),
        "wrote size report"
    );

    Ok(RunSummary {
        completed: records.into_iter().map(|r| r.name).collect(),
        skipped: outcomes.skipped,
        corpus_lines: None,
        outputs: vec![paths.size_report.clone(), paths.split_dir.clone()],
    })
}

/// Apply the mixing policy to every genome and write the corpus.
///
/// # Errors
///
/// Returns a `PipelineError` for an invalid configuration, registry or size
/// report, a failing genome under `FailFast`, or a corpus that cannot be
/// written.
pub fn prepare_corpus(
    paths: &CorpusStagePaths,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let entries = parse_registry_file(&paths.registry)?;
    let sizes: HashMap<String, GenomeSizeRecord> = parse_size_report_file(&paths.size_report)?
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect();
    info!(
        genomes = entries.len(),
        threads = config.threads,
        "assembling corpus"
    );

    let scratch = tempfile::Builder::new()
        .prefix(".dna-corpus-parts-")
        .tempdir_in(ensure_parent(&paths.corpus)?)?;

    let outcomes = run_genomes(
        &entries,
        config.threads,
        config.failure_policy,
        |index, entry| {
            let record = sizes
                .get(&entry.name)
                .ok_or_else(|| PipelineError::MissingSizeRecord(entry.name.clone()))?;
            let plan = select(record, config);

            let unmasked = resolve_genome_file(&paths.unmasked_dir, &entry.name).ok_or_else(|| {
                ResolutionError {
                    genome: entry.name.clone(),
                    stream: ChunkSource::Unmasked,
                    dir: paths.unmasked_dir.clone(),
                }
            })?;
            let split_store = match plan.masked {
                Some(_) => {
                    let store = split_store_path(&paths.split_dir, &entry.name);
                    if !store.is_file() {
                        return Err(PipelineError::MissingSplitStore(store));
                    }
                    Some(store)
                }
                None => None,
            };

            let part = scratch.path().join(format!("{index:06}.txt"));
            let inputs = GenomeCorpusInputs {
                split_store,
                unmasked,
            };
            assemble_genome(&entry.name, &plan, &inputs, config, File::create(&part)?)?;
            Ok(part)
        },
    )?;

    let parts: Vec<PathBuf> = outcomes
        .completed
        .iter()
        .map(|(_, _, part)| part.clone())
        .collect();
    merge_parts(&parts, &paths.corpus)?;

    let lines = count_lines(&paths.corpus)?;
    if lines == 0 {
        warn!(path = %paths.corpus.display(), "corpus is empty");
    } else {
        info!(path = %paths.corpus.display(), lines, "wrote corpus");
    }

    Ok(RunSummary {
        completed: outcomes.completed.into_iter().map(|(_, name, _)| name).collect(),
        skipped: outcomes.skipped,
        corpus_lines: Some(lines),
        outputs: vec![paths.corpus.clone()],
    })
}

/// Files found (or not) for one registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomeFileCheck {
    pub name: String,
    pub kind: GenomeKind,
    pub masked: Option<PathBuf>,
    pub unmasked: Option<PathBuf>,
    pub missing: Vec<ChunkSource>,
}

impl GenomeFileCheck {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Look up every registry entry's files without reading them.
///
/// # Errors
///
/// Returns a `PipelineError` if the registry cannot be parsed.
pub fn check_genome_files(
    registry: &Path,
    masked_dir: &Path,
    unmasked_dir: &Path,
) -> Result<Vec<GenomeFileCheck>, PipelineError> {
    let entries = parse_registry_file(registry)?;
    Ok(entries
        .iter()
        .map(|entry| check_entry(entry, masked_dir, unmasked_dir))
        .collect())
}

fn check_entry(entry: &GenomeEntry, masked_dir: &Path, unmasked_dir: &Path) -> GenomeFileCheck {
    let mut missing = Vec::new();

    let masked = if entry.kind.has_masked() {
        let found = resolve_genome_file(masked_dir, &entry.name);
        if found.is_none() {
            missing.push(ChunkSource::Masked);
        }
        found
    } else {
        None
    };

    let unmasked = resolve_genome_file(unmasked_dir, &entry.name);
    if unmasked.is_none() {
        missing.push(ChunkSource::Unmasked);
    }

    GenomeFileCheck {
        name: entry.name.clone(),
        kind: entry.kind,
        masked,
        unmasked,
        missing,
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<&Path> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir)?;
    Ok(dir)
}

fn count_lines(path: &Path) -> std::io::Result<u64> {
    use std::io::BufRead;

    let mut reader = std::io::BufReader::new(File::open(path)?);
    let mut lines = 0u64;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        lines += buf.iter().filter(|&&b| b == b'\n').count() as u64;
        let n = buf.len();
        reader.consume(n);
    }
    Ok(lines)
}
