//! Command-line interface for dna-corpus.
//!
//! Available commands:
//!
//! - **check**: Verify that every registry genome has its FASTA files
//! - **prepare-genome**: Write the size report and split hard-masked genomes
//! - **prepare-corpus**: Assemble the corpus from prepared genomes
//! - **all**: Run both preparation stages
//!
//! ## Usage
//!
//! ```text
//! # Check that all inputs exist
//! dna-corpus check --registry genomes.tsv --masked-dir hardmasked --unmasked-dir unmasked
//!
//! # Full run on 16 workers
//! dna-corpus all --registry genomes.tsv --masked-dir hardmasked \
//!     --unmasked-dir unmasked --output-dir out --threads 16
//!
//! # JSON summary for scripting
//! dna-corpus --format json prepare-corpus --registry genomes.tsv \
//!     --unmasked-dir unmasked --output-dir out
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::{
    PipelineConfig, BYTES_PER_MB, DEFAULT_GENOME_SPLIT_SIZE_MB, DEFAULT_MAX_SEQ_LENGTH,
    DEFAULT_MIN_LENGTH,
};
use crate::core::types::FailurePolicy;
use crate::pipeline::RunSummary;

pub mod all;
pub mod check;
pub mod prepare_corpus;
pub mod prepare_genome;

#[derive(Parser)]
#[command(name = "dna-corpus")]
#[command(version)]
#[command(about = "Prepare a DNA text corpus from genome FASTA files")]
#[command(
    long_about = "dna-corpus turns hard-masked and unmasked genome FASTA files into a line-oriented corpus for tokenizer training.\n\nHard-masked genomes are split around their N regions; every sequence is cut into windows of bounded length, uppercased and written one per line in registry order. Large genomes mix masked and unmasked sequence under a per-stream budget."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that every registry genome has its FASTA files
    Check(check::CheckArgs),

    /// Write the size report and the split store
    PrepareGenome(prepare_genome::PrepareGenomeArgs),

    /// Assemble the corpus from prepared genomes
    PrepareCorpus(prepare_corpus::PrepareCorpusArgs),

    /// Run prepare-genome then prepare-corpus
    All(all::AllArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Settings shared by the pipeline commands
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Maximum corpus line length
    #[arg(long, default_value_t = DEFAULT_MAX_SEQ_LENGTH)]
    pub max_seq_length: usize,

    /// Minimum chunk and line length; shorter sequence is dropped
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
    pub min_length: usize,

    /// Genomes at least this large (MB of bases) mix masked and unmasked sequence
    #[arg(long, default_value_t = DEFAULT_GENOME_SPLIT_SIZE_MB)]
    pub genome_split_size: u64,

    /// Per-stream budget for mixed genomes in MB (default: half the split size)
    #[arg(long)]
    pub mixing_budget_mb: Option<u64>,

    /// Also split unmasked sequences at runs of at least this many N
    #[arg(long)]
    pub unmasked_gap_length: Option<usize>,

    /// Number of worker threads
    #[arg(short = 't', long, default_value = "1")]
    pub threads: usize,

    /// What to do when a genome fails
    #[arg(long, value_enum, default_value_t = FailurePolicy::FailFast)]
    pub failure_policy: FailurePolicy,

    /// Rebuild split-store files that already exist
    #[arg(long)]
    pub force: bool,
}

impl PipelineArgs {
    #[must_use]
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_seq_length: self.max_seq_length,
            min_length: self.min_length,
            genome_split_size: self.genome_split_size.saturating_mul(BYTES_PER_MB),
            mixing_budget: self.mixing_budget_mb.map(|mb| mb.saturating_mul(BYTES_PER_MB)),
            threads: self.threads,
            failure_policy: self.failure_policy,
            unmasked_gap_length: self.unmasked_gap_length,
            force: self.force,
        }
    }
}

/// Input locations shared by the pipeline commands
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Genome registry (TSV with genome_name and genome_type columns)
    #[arg(long)]
    pub registry: PathBuf,

    /// Directory of unmasked FASTA files
    #[arg(long)]
    pub unmasked_dir: PathBuf,
}

/// Print a stage summary and fail if any genome was skipped
pub fn report_summary(summary: &RunSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text_summary(summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
    }

    if !summary.is_complete() {
        anyhow::bail!(
            "{} genome(s) skipped: {}",
            summary.skipped.len(),
            summary
                .skipped
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

fn print_text_summary(summary: &RunSummary) {
    println!("Genomes processed: {}", summary.completed.len());
    if let Some(lines) = summary.corpus_lines {
        println!("Corpus lines: {lines}");
    }
    for output in &summary.outputs {
        println!("Wrote: {}", output.display());
    }
    if !summary.skipped.is_empty() {
        println!("\nSkipped:");
        for skipped in &summary.skipped {
            println!("  {}: {}", skipped.name, skipped.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_all() {
        let cli = Cli::try_parse_from([
            "dna-corpus",
            "all",
            "--registry",
            "genomes.tsv",
            "--masked-dir",
            "hm",
            "--unmasked-dir",
            "um",
            "--output-dir",
            "out",
            "--genome-split-size",
            "2",
            "--failure-policy",
            "skip",
        ])
        .unwrap();

        let Commands::All(args) = cli.command else {
            panic!("expected the all command");
        };
        let config = args.pipeline.to_config();
        assert_eq!(config.genome_split_size, 2_000_000);
        assert_eq!(config.effective_mixing_budget(), 1_000_000);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.max_seq_length, 4000);
    }

    #[test]
    fn test_cli_mixing_budget() {
        let cli = Cli::try_parse_from([
            "dna-corpus",
            "--format",
            "json",
            "prepare-corpus",
            "--registry",
            "genomes.tsv",
            "--unmasked-dir",
            "um",
            "--output-dir",
            "out",
            "--mixing-budget-mb",
            "250",
        ])
        .unwrap();

        let Commands::PrepareCorpus(args) = cli.command else {
            panic!("expected the prepare-corpus command");
        };
        assert_eq!(args.pipeline.to_config().mixing_budget, Some(250_000_000));
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
