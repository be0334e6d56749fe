use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod parsing;
mod pipeline;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("dna_corpus=debug,info")
    } else {
        EnvFilter::new("dna_corpus=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Check(args) => {
            cli::check::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::PrepareGenome(args) => {
            cli::prepare_genome::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::PrepareCorpus(args) => {
            cli::prepare_corpus::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::All(args) => {
            cli::all::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
