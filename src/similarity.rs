//! Classical semantic-similarity measures over term information
//! content (spec.md §9: "a small tagged variant `{Resnik, Lin, JC}`
//! with a single `termSim(t1, t2)` capability and, per variant, a
//! per-item max-cache"). Peripheral to the core inference design;
//! reuses `SlimOntology`'s IC values.
use std::collections::HashMap;
use std::sync::RwLock;

use crate::hierarchy::SlimOntology;
use crate::term::Term;

/// The three classical measures named in spec.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimilarityMeasure {
    Resnik,
    Lin,
    JiangConrath,
}

/// Information content of the most informative common ancestor of
/// `t1` and `t2`.
fn most_informative_common_ancestor<T: Term>(
    ontology: &SlimOntology<T>,
    t1: u32,
    t2: u32,
) -> f64 {
    if t1 == t2 {
        return ontology.information_content(t1);
    }
    let closure_a = ontology.ancestor_closure([t1]);
    let closure_b: std::collections::HashSet<u32> =
        ontology.ancestor_closure([t2]).into_iter().collect();
    closure_a
        .into_iter()
        .filter(|t| closure_b.contains(t))
        .map(|t| ontology.information_content(t))
        .fold(0.0, f64::max)
}

/// `termSim(t1, t2)` under `measure` (spec.md §9).
pub fn term_sim<T: Term>(
    ontology: &SlimOntology<T>,
    measure: SimilarityMeasure,
    t1: u32,
    t2: u32,
) -> f64 {
    let mica = most_informative_common_ancestor(ontology, t1, t2);
    match measure {
        SimilarityMeasure::Resnik => mica,
        SimilarityMeasure::Lin => {
            let denom = ontology.information_content(t1) + ontology.information_content(t2);
            if denom == 0.0 {
                0.0
            } else {
                2.0 * mica / denom
            }
        }
        SimilarityMeasure::JiangConrath => {
            let distance = ontology.information_content(t1) + ontology.information_content(t2)
                - 2.0 * mica;
            1.0 / (1.0 + distance)
        }
    }
}

/// Per-item maximum similarity against a query's term set, one cache
/// per [`SimilarityMeasure`]. Multiple concurrent readers, a single
/// writer that never holds the lock while computing the value
/// (spec.md §5 "Caches").
#[derive(Default)]
pub struct MaxSimilarityCache {
    entries: RwLock<HashMap<(SimilarityMeasure, u32, Box<[u32]>), f64>>,
}

impl MaxSimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum `termSim(item_term, q)` over `query` for a given item term.
    pub fn max_similarity<T: Term>(
        &self,
        ontology: &SlimOntology<T>,
        measure: SimilarityMeasure,
        item_term: u32,
        query: &[u32],
    ) -> f64 {
        let key = (measure, item_term, query.to_vec().into_boxed_slice());
        if let Some(&v) = self.entries.read().expect("cache lock poisoned").get(&key) {
            return v;
        }
        let computed = query
            .iter()
            .map(|&q| term_sim(ontology, measure, item_term, q))
            .fold(f64::NEG_INFINITY, f64::max);
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key, computed);
        computed
    }
}
