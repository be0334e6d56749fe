use std::path::PathBuf;

use clap::Args;

use crate::cli::{report_summary, InputArgs, OutputFormat, PipelineArgs};
use crate::core::config::{CorpusStagePaths, GenomeStagePaths, CORPUS_FILE};
use crate::pipeline::stages::{prepare_corpus, prepare_genomes};

#[derive(Args)]
pub struct AllArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory of hard-masked FASTA files
    #[arg(long)]
    pub masked_dir: PathBuf,

    /// Directory for the size report, split store and corpus
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Corpus file to write (default: <output-dir>/genome_corpus.txt)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[allow(clippy::needless_pass_by_value)]
pub fn run(args: AllArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.pipeline.to_config();
    let genome_paths = GenomeStagePaths::in_output_dir(
        &args.input.registry,
        &args.masked_dir,
        &args.input.unmasked_dir,
        &args.output_dir,
    );
    let corpus = args
        .corpus
        .clone()
        .unwrap_or_else(|| args.output_dir.join(CORPUS_FILE));
    let corpus_paths = CorpusStagePaths::after(&genome_paths, corpus);

    if verbose {
        eprintln!("Output directory: {}", args.output_dir.display());
    }

    let mut summary = prepare_genomes(&genome_paths, &config)?;
    summary.merge(prepare_corpus(&corpus_paths, &config)?);
    report_summary(&summary, format)
}
