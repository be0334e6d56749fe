use serde::Serialize;

/// Which sequence files a genome provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenomeKind {
    /// Both a hard-masked and an unmasked FASTA
    Both,
    /// Only an unmasked FASTA
    UnmaskedOnly,
}

impl GenomeKind {
    /// Parse the `genome_type` column of the registry
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "both" => Some(Self::Both),
            "unmasked" => Some(Self::UnmaskedOnly),
            _ => None,
        }
    }

    /// Whether a hard-masked file is required for this genome
    #[must_use]
    pub fn has_masked(self) -> bool {
        matches!(self, Self::Both)
    }
}

impl std::fmt::Display for GenomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Both => write!(f, "both"),
            Self::UnmaskedOnly => write!(f, "unmasked"),
        }
    }
}

/// Origin of a sequence chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSource {
    Masked,
    Unmasked,
}

impl std::fmt::Display for ChunkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Masked => write!(f, "masked"),
            Self::Unmasked => write!(f, "unmasked"),
        }
    }
}

/// What to do when a single genome cannot be processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing genome
    #[default]
    FailFast,
    /// Log a warning, leave the genome out, and keep going
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_kind_parse() {
        assert_eq!(GenomeKind::parse("both"), Some(GenomeKind::Both));
        assert_eq!(GenomeKind::parse(" Unmasked "), Some(GenomeKind::UnmaskedOnly));
        assert_eq!(GenomeKind::parse("soft"), None);
    }

    #[test]
    fn test_genome_kind_display_round_trips() {
        for kind in [GenomeKind::Both, GenomeKind::UnmaskedOnly] {
            assert_eq!(GenomeKind::parse(&kind.to_string()), Some(kind));
        }
    }
}
