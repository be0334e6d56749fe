use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::{ChunkSource, GenomeKind};

/// Recognized FASTA extensions, in lookup priority order
pub const RECOGNIZED_EXTENSIONS: [&str; 4] = ["fa", "fasta", "fa.gz", "fasta.gz"];

#[derive(Error, Debug)]
#[error("no {stream} FASTA found for genome '{genome}' in {}", dir.display())]
pub struct ResolutionError {
    pub genome: String,
    pub stream: ChunkSource,
    pub dir: PathBuf,
}

/// A genome listed in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomeEntry {
    /// Lower-cased genome name, also the file stem
    pub name: String,
    pub kind: GenomeKind,
}

impl GenomeEntry {
    pub fn new(name: impl AsRef<str>, kind: GenomeKind) -> Self {
        Self {
            name: name.as_ref().trim().to_lowercase(),
            kind,
        }
    }
}

/// On-disk locations of a genome's sequence files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGenomeFiles {
    pub masked: Option<PathBuf>,
    pub unmasked: PathBuf,
}

impl ResolvedGenomeFiles {
    /// Resolve every file the genome's kind requires.
    ///
    /// # Errors
    ///
    /// Returns a `ResolutionError` naming the first missing source.
    pub fn resolve(
        entry: &GenomeEntry,
        masked_dir: &Path,
        unmasked_dir: &Path,
    ) -> Result<Self, ResolutionError> {
        let masked = if entry.kind.has_masked() {
            let path = resolve_genome_file(masked_dir, &entry.name).ok_or_else(|| {
                ResolutionError {
                    genome: entry.name.clone(),
                    stream: ChunkSource::Masked,
                    dir: masked_dir.to_path_buf(),
                }
            })?;
            Some(path)
        } else {
            None
        };

        let unmasked =
            resolve_genome_file(unmasked_dir, &entry.name).ok_or_else(|| ResolutionError {
                genome: entry.name.clone(),
                stream: ChunkSource::Unmasked,
                dir: unmasked_dir.to_path_buf(),
            })?;

        Ok(Self { masked, unmasked })
    }
}

/// Find the FASTA file for `name` in `dir`.
///
/// Extensions are tried in [`RECOGNIZED_EXTENSIONS`] order. For each extension
/// the lower-case name is tried first, then its Title-case and UPPER-case forms.
#[must_use]
pub fn resolve_genome_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let variants = name_variants(name);

    RECOGNIZED_EXTENSIONS.iter().find_map(|ext| {
        variants
            .iter()
            .map(|stem| dir.join(format!("{stem}.{ext}")))
            .find(|candidate| candidate.is_file())
    })
}

fn name_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];
    for variant in [title_case(name), name.to_uppercase()] {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

/// Upper-case the first letter of every alphabetic run ("homo_sapiens" -> "Homo_Sapiens")
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
