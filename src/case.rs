//! Per-node Bayesian case classification and log-likelihood
//! accounting (spec.md C5).
use crate::bitset::BitSet;
use crate::config::InheritanceVariant;
use crate::hierarchy::SlimOntology;
use crate::term::Term;

/// Classification of a single term under a hidden/observed pair
/// (spec.md §4.5). `Fault` marks an impossible combination under the
/// active inheritance variant; it is tallied but contributes `0` to
/// the log-likelihood, same as the `Inherit*` cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum NodeCase {
    Fault = 0,
    TruePositive = 1,
    FalsePositive = 2,
    TrueNegative = 3,
    FalseNegative = 4,
    InheritTrue = 5,
    InheritFalse = 6,
}

pub const NODE_CASE_COUNT: usize = 7;

/// The 7-slot tally of spec.md §3 "Configuration counts". Invariant:
/// `sum() == T` for any H/O pair consistent with the ontology size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseCounts([u32; NODE_CASE_COUNT]);

impl CaseCounts {
    pub fn get(&self, case: NodeCase) -> u32 {
        self.0[case as usize]
    }

    pub fn increment(&mut self, case: NodeCase) {
        self.0[case as usize] += 1;
    }

    pub fn decrement(&mut self, case: NodeCase) {
        self.0[case as usize] -= 1;
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Log-likelihood of this count vector under `(alpha, beta)`
    /// (spec.md §4.5). `Inherit*` and `Fault` contribute `0`.
    pub fn log_likelihood(&self, alpha: f64, beta: f64) -> f64 {
        self.get(NodeCase::FalseNegative) as f64 * beta.ln()
            + self.get(NodeCase::FalsePositive) as f64 * alpha.ln()
            + self.get(NodeCase::TruePositive) as f64 * (1.0 - beta).ln()
            + self.get(NodeCase::TrueNegative) as f64 * (1.0 - alpha).ln()
    }
}

/// Classifies term `t` given hidden state `hidden` and observed state
/// `observed` (spec.md §4.5 `getNodeCase`).
pub fn get_node_case<T: Term>(
    ontology: &SlimOntology<T>,
    inheritance: &InheritanceVariant,
    hidden: &BitSet,
    observed: &BitSet,
    t: u32,
) -> NodeCase {
    if inheritance.propagate_false_positives
        && ontology
            .children_of(t)
            .iter()
            .any(|&c| observed.get(c as usize))
    {
        return if observed.get(t as usize) {
            NodeCase::InheritTrue
        } else {
            log::warn!("node {t}: FALSE_POSITIVE propagation found an observed child but {t} itself is unobserved — impossible configuration, skipping");
            NodeCase::Fault
        };
    }

    if inheritance.propagate_false_negatives
        && ontology
            .parents_of(t)
            .iter()
            .any(|&p| !observed.get(p as usize))
    {
        return if !observed.get(t as usize) {
            NodeCase::InheritFalse
        } else {
            log::warn!("node {t}: FALSE_NEGATIVE propagation found an unobserved parent but {t} itself is observed — impossible configuration, skipping");
            NodeCase::Fault
        };
    }

    match (hidden.get(t as usize), observed.get(t as usize)) {
        (true, true) => NodeCase::TruePositive,
        (true, false) => NodeCase::FalseNegative,
        (false, false) => NodeCase::TrueNegative,
        (false, true) => NodeCase::FalsePositive,
    }
}

/// Full, non-incremental case count over every term in the ontology
/// (spec.md §4.6 step 1, and the "incremental equals batch" property
/// of §8).
pub fn count_all<T: Term>(
    ontology: &SlimOntology<T>,
    inheritance: &InheritanceVariant,
    hidden: &BitSet,
    observed: &BitSet,
) -> CaseCounts {
    let mut counts = CaseCounts::default();
    for t in 0..ontology.number_of_vertices() as u32 {
        counts.increment(get_node_case(ontology, inheritance, hidden, observed, t));
    }
    counts
}

/// Applies `diff_on ∪ diff_off` to `hidden`, maintaining `counts`
/// incrementally (spec.md §4.5 "incremental update invariant").
///
/// When only one inheritance direction is active, toggling `H[t]`
/// provably affects only `t`'s own case (neighbouring cases depend on
/// `O`, which never changes during item scoring). When both
/// directions are active the spec mandates the conservative behaviour
/// of also recomputing `t`'s children (false-positive propagation)
/// and parents (false-negative propagation) on every flip.
pub fn apply_diff<T: Term>(
    ontology: &SlimOntology<T>,
    inheritance: &InheritanceVariant,
    hidden: &mut BitSet,
    observed: &BitSet,
    counts: &mut CaseCounts,
    diff_on: &[u32],
    diff_off: &[u32],
) {
    for &t in diff_on.iter().chain(diff_off.iter()) {
        toggle_node(ontology, inheritance, hidden, observed, counts, t);
    }
}

fn toggle_node<T: Term>(
    ontology: &SlimOntology<T>,
    inheritance: &InheritanceVariant,
    hidden: &mut BitSet,
    observed: &BitSet,
    counts: &mut CaseCounts,
    t: u32,
) {
    let mut affected = vec![t];
    if inheritance.propagate_false_positives && inheritance.propagate_false_negatives {
        affected.extend_from_slice(ontology.children_of(t));
        affected.extend_from_slice(ontology.parents_of(t));
        affected.sort_unstable();
        affected.dedup();
    }

    for &n in &affected {
        counts.decrement(get_node_case(ontology, inheritance, hidden, observed, n));
    }
    hidden.toggle(t as usize);
    for &n in &affected {
        counts.increment(get_node_case(ontology, inheritance, hidden, observed, n));
    }
}
