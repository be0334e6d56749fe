//! Size-dependent mixing policy.
//!
//! Genomes whose unmasked sequence is smaller than `genome_split_size`
//! contribute all of it. Larger genomes contribute masked chunks and unmasked
//! chunks, each stream capped independently at the mixing budget.

use crate::core::config::PipelineConfig;
use crate::core::size::GenomeSizeRecord;

/// Cap on the bases a stream may contribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteBudget {
    Unlimited,
    Limit(u64),
}

/// Which streams feed the corpus for one genome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPlan {
    /// `None` when the masked stream is not used
    pub masked: Option<ByteBudget>,
    pub unmasked: ByteBudget,
}

impl SelectionPlan {
    #[must_use]
    pub fn is_mixed(&self) -> bool {
        matches!(self.unmasked, ByteBudget::Limit(_))
    }
}

/// Decide the plan for a genome from its size record
#[must_use]
pub fn select(record: &GenomeSizeRecord, config: &PipelineConfig) -> SelectionPlan {
    if record.unmasked_base_count < config.genome_split_size {
        return SelectionPlan {
            masked: None,
            unmasked: ByteBudget::Unlimited,
        };
    }

    let budget = ByteBudget::Limit(config.effective_mixing_budget());
    SelectionPlan {
        masked: record.kind.has_masked().then_some(budget),
        unmasked: budget,
    }
}

/// Running total for one stream.
///
/// Admission is a hard cutoff: once a chunk does not fit, the stream is
/// exhausted and later chunks are refused even if they would fit.
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    budget: ByteBudget,
    used: u64,
    exhausted: bool,
}

impl BudgetTracker {
    #[must_use]
    pub fn new(budget: ByteBudget) -> Self {
        Self {
            budget,
            used: 0,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Whether `len` more bases stay within the budget
    #[must_use]
    pub fn would_fit(&self, len: u64) -> bool {
        if self.exhausted {
            return false;
        }
        match self.budget {
            ByteBudget::Unlimited => true,
            ByteBudget::Limit(limit) => self.used + len <= limit,
        }
    }

    /// Count a chunk of `len` bases against the budget
    pub fn admit(&mut self, len: u64) {
        self.used += len;
    }

    /// Stop the stream
    pub fn exhaust(&mut self) {
        self.exhausted = true;
    }
}

/// Indices of the chunks admitted from `lengths` under `budget`
#[must_use]
pub fn select_chunks(lengths: &[u64], budget: ByteBudget) -> Vec<usize> {
    let mut tracker = BudgetTracker::new(budget);
    let mut admitted = Vec::new();
    for (i, &len) in lengths.iter().enumerate() {
        if !tracker.would_fit(len) {
            tracker.exhaust();
            break;
        }
        tracker.admit(len);
        admitted.push(i);
    }
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GenomeKind;

    fn record(kind: GenomeKind, unmasked: u64, masked: Option<u64>) -> GenomeSizeRecord {
        GenomeSizeRecord {
            name: "g".to_string(),
            kind,
            num_seqs: 1,
            unmasked_base_count: unmasked,
            masked_base_count: masked,
            min_len: unmasked,
            avg_len: unmasked,
            max_len: unmasked,
            unmasked_file_bytes: unmasked,
            masked_file_bytes: masked,
        }
    }

    fn config(split: u64) -> PipelineConfig {
        PipelineConfig {
            genome_split_size: split,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_small_genome_is_unmasked_only() {
        let plan = select(&record(GenomeKind::Both, 400, Some(300)), &config(1000));
        assert_eq!(plan.masked, None);
        assert_eq!(plan.unmasked, ByteBudget::Unlimited);
        assert!(!plan.is_mixed());
    }

    #[test]
    fn test_boundary_is_mixed() {
        let plan = select(&record(GenomeKind::Both, 1000, Some(400)), &config(1000));
        assert_eq!(plan.masked, Some(ByteBudget::Limit(500)));
        assert_eq!(plan.unmasked, ByteBudget::Limit(500));

        let plan = select(&record(GenomeKind::Both, 999, Some(10)), &config(1000));
        assert_eq!(plan.masked, None);
    }

    #[test]
    fn test_masked_size_does_not_count_toward_threshold() {
        // Unmasked plus masked is well past the threshold, the unmasked size alone is not
        let plan = select(&record(GenomeKind::Both, 600, Some(590)), &config(1000));
        assert_eq!(plan.masked, None);
        assert_eq!(plan.unmasked, ByteBudget::Unlimited);
    }

    #[test]
    fn test_large_unmasked_only_genome_is_capped() {
        let plan = select(&record(GenomeKind::UnmaskedOnly, 5000, None), &config(1000));
        assert_eq!(plan.masked, None);
        assert_eq!(plan.unmasked, ByteBudget::Limit(500));
    }

    #[test]
    fn test_mixing_budget_override() {
        let cfg = PipelineConfig {
            mixing_budget: Some(250_000_000),
            ..config(1)
        };
        let plan = select(&record(GenomeKind::Both, 9000, Some(8000)), &cfg);
        assert_eq!(plan.masked, Some(ByteBudget::Limit(250_000_000)));
    }

    #[test]
    fn test_select_chunks_hard_cutoff() {
        // The third chunk would overflow; the fourth would fit but the stream has stopped
        let admitted = select_chunks(&[40, 40, 30, 5], ByteBudget::Limit(100));
        assert_eq!(admitted, vec![0, 1]);
    }

    #[test]
    fn test_select_chunks_exact_fit() {
        assert_eq!(select_chunks(&[50, 50], ByteBudget::Limit(100)), vec![0, 1]);
        assert!(select_chunks(&[101], ByteBudget::Limit(100)).is_empty());
        assert_eq!(select_chunks(&[7, 9, 1000], ByteBudget::Unlimited), vec![0, 1, 2]);
    }
}
