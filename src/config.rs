//! Explicit engine configuration (spec.md §9: "global state… becomes
//! explicit configuration passed to the engine constructor").
use serde::{Deserialize, Serialize};

/// Bitflag-like variant switches controlling node-case classification
/// (spec.md §4.5). The default matches the spec's stated default
/// model: `VARIANT_INHERITANCE_NEGATIVES | VARIANT_RESPECT_FREQUENCIES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceVariant {
    /// `VARIANT_INHERITANCE_POSITIVES`: a node with an observed child
    /// inherits `INHERIT_TRUE`/`FAULT` instead of its own case.
    pub propagate_false_positives: bool,
    /// `VARIANT_INHERITANCE_NEGATIVES`: a node with an unobserved
    /// parent inherits `INHERIT_FALSE`/`FAULT` instead of its own case.
    pub propagate_false_negatives: bool,
}

impl Default for InheritanceVariant {
    fn default() -> Self {
        Self {
            propagate_false_positives: false,
            propagate_false_negatives: true,
        }
    }
}

/// Engine-wide configuration, fixed for the lifetime of the engine
/// (spec.md §1 Non-goals: "no learning of α or β from data").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqaConfig {
    /// False-positive rate grid.
    pub alpha_grid: Vec<f64>,
    /// False-negative rate grid.
    pub beta_grid: Vec<f64>,
    /// `VARIANT_RESPECT_FREQUENCIES`: marginalise over frequency-weighted
    /// hidden configurations rather than scoring the fully-induced set.
    pub use_frequencies: bool,
    /// `kᵢ` cap: at most this many of an item's lowest-frequency direct
    /// terms participate in the frequency-configuration enumeration.
    pub max_frequency_terms: usize,
    pub inheritance: InheritanceVariant,
    /// Drop items with no explicitly-frequency-annotated (`< 1.0`) term.
    pub consider_frequencies_only: bool,
    /// Reject queries whose terms are pairwise ancestor/descendant for
    /// random-query sampling in the auxiliary similarity paths (spec.md
    /// §4.7); does not affect `score()` itself.
    pub forbid_illegal_queries: bool,
    /// Configured worker pool size cap; `0` means uncapped (the pool
    /// is sized to `cpu_count`). See [`BoqaConfig::resolved_thread_count`].
    pub num_threads: usize,
}

impl Default for BoqaConfig {
    fn default() -> Self {
        Self {
            alpha_grid: vec![0.0, 0.01, 0.05, 0.1, 0.2],
            beta_grid: vec![0.0, 0.01, 0.05, 0.1, 0.2],
            use_frequencies: true,
            max_frequency_terms: 8,
            inheritance: InheritanceVariant::default(),
            consider_frequencies_only: false,
            forbid_illegal_queries: false,
            num_threads: 0,
        }
    }
}

impl BoqaConfig {
    /// Worker pool size, `min(cpu_count, configured_max)` (spec.md §5
    /// "Scheduling model"). `num_threads == 0` means "configured_max is
    /// unbounded", so the pool is sized to `cpu_count` alone.
    pub fn resolved_thread_count(&self) -> usize {
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if self.num_threads > 0 {
            self.num_threads.min(cpu_count)
        } else {
            cpu_count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_thread_count_never_exceeds_cpu_count() {
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let mut config = BoqaConfig::default();
        config.num_threads = cpu_count + 64;
        assert_eq!(config.resolved_thread_count(), cpu_count);
    }

    #[test]
    fn resolved_thread_count_respects_a_cap_below_cpu_count() {
        let mut config = BoqaConfig::default();
        config.num_threads = 1;
        assert_eq!(config.resolved_thread_count(), 1);
    }

    #[test]
    fn zero_num_threads_means_cpu_count() {
        let config = BoqaConfig::default();
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(config.resolved_thread_count(), cpu_count);
    }
}
