use std::path::PathBuf;

use clap::Args;

use crate::cli::{report_summary, InputArgs, OutputFormat, PipelineArgs};
use crate::core::config::GenomeStagePaths;
use crate::pipeline::stages::prepare_genomes;

#[derive(Args)]
pub struct PrepareGenomeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory of hard-masked FASTA files
    #[arg(long)]
    pub masked_dir: PathBuf,

    /// Directory for the size report and split store
    #[arg(short, long)]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl PrepareGenomeArgs {
    #[must_use]
    pub fn stage_paths(&self) -> GenomeStagePaths {
        GenomeStagePaths::in_output_dir(
            &self.input.registry,
            &self.masked_dir,
            &self.input.unmasked_dir,
            &self.output_dir,
        )
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn run(args: PrepareGenomeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let paths = args.stage_paths();
    if verbose {
        eprintln!("Size report: {}", paths.size_report.display());
        eprintln!("Split store: {}", paths.split_dir.display());
    }

    let summary = prepare_genomes(&paths, &args.pipeline.to_config())?;
    report_summary(&summary, format)
}
