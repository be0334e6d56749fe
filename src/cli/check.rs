use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::genome::RECOGNIZED_EXTENSIONS;
use crate::pipeline::stages::{check_genome_files, GenomeFileCheck};

#[derive(Args)]
pub struct CheckArgs {
    /// Genome registry (TSV with genome_name and genome_type columns)
    #[arg(long)]
    pub registry: PathBuf,

    /// Directory of hard-masked FASTA files
    #[arg(long)]
    pub masked_dir: PathBuf,

    /// Directory of unmasked FASTA files
    #[arg(long)]
    pub unmasked_dir: PathBuf,
}

#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CheckArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let checks = check_genome_files(&args.registry, &args.masked_dir, &args.unmasked_dir)?;
    let missing = checks.iter().filter(|c| !c.is_ok()).count();

    match format {
        OutputFormat::Text => print_text_checks(&checks, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&checks)?),
    }

    if missing > 0 {
        anyhow::bail!(
            "{missing} of {} genome(s) are missing files (looked for .{})",
            checks.len(),
            RECOGNIZED_EXTENSIONS.join(", .")
        );
    }
    Ok(())
}

fn print_text_checks(checks: &[GenomeFileCheck], verbose: bool) {
    for check in checks {
        if check.is_ok() {
            if verbose {
                let masked = check
                    .masked
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |p| p.display().to_string());
                let unmasked = check
                    .unmasked
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |p| p.display().to_string());
                println!("ok       {}\t{masked}\t{unmasked}", check.name);
            }
        } else {
            let missing: Vec<String> = check.missing.iter().map(ToString::to_string).collect();
            println!("MISSING  {}\t{}", check.name, missing.join(", "));
        }
    }

    let ok = checks.iter().filter(|c| c.is_ok()).count();
    println!("{ok}/{} genomes have all required files", checks.len());
}
