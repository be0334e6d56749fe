use std::path::PathBuf;

use clap::Args;

use crate::cli::{report_summary, InputArgs, OutputFormat, PipelineArgs};
use crate::core::config::{CorpusStagePaths, CORPUS_FILE, SIZE_REPORT_FILE, SPLIT_STORE_DIR};
use crate::pipeline::stages::prepare_corpus;

#[derive(Args)]
pub struct PrepareCorpusArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory holding the size report and split store from prepare-genome
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Corpus file to write (default: <output-dir>/genome_corpus.txt)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl PrepareCorpusArgs {
    #[must_use]
    pub fn stage_paths(&self) -> CorpusStagePaths {
        CorpusStagePaths {
            registry: self.input.registry.clone(),
            unmasked_dir: self.input.unmasked_dir.clone(),
            size_report: self.output_dir.join(SIZE_REPORT_FILE),
            split_dir: self.output_dir.join(SPLIT_STORE_DIR),
            corpus: self
                .corpus
                .clone()
                .unwrap_or_else(|| self.output_dir.join(CORPUS_FILE)),
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn run(args: PrepareCorpusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let paths = args.stage_paths();
    if verbose {
        eprintln!("Size report: {}", paths.size_report.display());
        eprintln!("Corpus: {}", paths.corpus.display());
    }

    let summary = prepare_corpus(&paths, &args.pipeline.to_config())?;
    report_summary(&summary, format)
}
