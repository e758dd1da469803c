//! Builds the observed state vector from a sparse query and ranks the
//! catalogue against it (spec.md C7).
use crate::annotation::AnnotationTable;
use crate::bitset::BitSet;
use crate::config::BoqaConfig;
use crate::diff::DiffVectors;
use crate::error::BoqaError;
use crate::hierarchy::SlimOntology;
use crate::inference::{self, CancellationToken, ScoreOutcome};
use crate::item_index::ItemIndex;
use crate::term::Term;

/// One ranked item: external (sorted-space) item slot and its marginal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedItem {
    pub item_id: usize,
    pub score: f64,
    pub marginal: f64,
}

/// Runs a query end to end: validates the term list, builds the
/// ancestor-closed observed vector, invokes [`inference::run`], and
/// returns items sorted descending by marginal (ties broken by
/// smaller item index, spec.md §4.6 "Ordering guarantee").
///
/// `query_terms` are internal dense term indices; converting from
/// sorted-space IDs is the caller's responsibility (the engine
/// boundary, spec.md §4.2).
pub fn run_query<T>(
    ontology: &SlimOntology<T>,
    annotations: &AnnotationTable,
    _items: &ItemIndex,
    diffs: &DiffVectors,
    config: &BoqaConfig,
    query_terms: &[u32],
    cancel: Option<&CancellationToken>,
) -> Result<(Vec<RankedItem>, ScoreOutcome), BoqaError>
where
    T: Term + Sync,
{
    if query_terms.is_empty() {
        return Err(BoqaError::EmptyQuery);
    }
    let t = ontology.number_of_vertices();
    for &term in query_terms {
        if term as usize >= t {
            return Err(BoqaError::UnknownTerm(term.to_string()));
        }
    }

    let mut observed = BitSet::new(t);
    observed.set_all(&ontology.ancestor_closure(query_terms.iter().copied()));

    let outcome = inference::run(ontology, annotations, diffs, &observed, config, cancel)?;

    let mut ranked: Vec<RankedItem> = outcome
        .marginals
        .iter()
        .zip(outcome.scores.iter())
        .enumerate()
        .map(|(item_id, (&marginal, &score))| RankedItem {
            item_id,
            score,
            marginal,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.marginal
            .partial_cmp(&a.marginal)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    Ok((ranked, outcome))
}

/// Rejects queries whose terms are pairwise ancestor/descendant of one
/// another, per `FORBID_ILLEGAL_QUERIES` (spec.md §4.7). Only used by
/// the auxiliary similarity paths' random-query sampling, never by
/// `score()` itself.
pub fn is_illegal_query<T: Term>(ontology: &SlimOntology<T>, query_terms: &[u32]) -> bool {
    for (i, &a) in query_terms.iter().enumerate() {
        for &b in &query_terms[i + 1..] {
            if ontology.is_descendant(a, b) || ontology.is_descendant(b, a) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::RawAnnotation;
    use crate::hierarchy::{GraphEdge, Relationship};
    use crate::term::SimpleTerm;
    use crate::term_id::TermId;
    use std::str::FromStr;

    fn ontology() -> SlimOntology<SimpleTerm> {
        let terms = vec![
            SimpleTerm::new(TermId::from_str("HP:0").unwrap(), "t0", vec![], false),
            SimpleTerm::new(TermId::from_str("HP:1").unwrap(), "t1", vec![], false),
            SimpleTerm::new(TermId::from_str("HP:2").unwrap(), "t2", vec![], false),
        ];
        let edges = vec![
            GraphEdge::from((1, Relationship::Child, 0)),
            GraphEdge::from((2, Relationship::Child, 1)),
        ];
        SlimOntology::build(terms, edges).unwrap()
    }

    fn fixture() -> (SlimOntology<SimpleTerm>, AnnotationTable, ItemIndex, DiffVectors, BoqaConfig) {
        let ontology = ontology();
        let rows = vec![
            RawAnnotation {
                item_name: "I0".into(),
                term_id: TermId::from_str("HP:2").unwrap(),
                frequency: None,
            },
            RawAnnotation {
                item_name: "I1".into(),
                term_id: TermId::from_str("HP:1").unwrap(),
                frequency: None,
            },
        ];
        let mut config = BoqaConfig::default();
        config.use_frequencies = false;
        config.alpha_grid = vec![0.0];
        config.beta_grid = vec![0.0];
        let (annotations, names) = AnnotationTable::build(&ontology, rows, &config).unwrap();
        let items = ItemIndex::build(&ontology, names);
        let diffs = DiffVectors::build(&ontology, &annotations, &config);
        (ontology, annotations, items, diffs, config)
    }

    #[test]
    fn empty_query_is_rejected() {
        let (ontology, annotations, items, diffs, config) = fixture();
        let result = run_query(&ontology, &annotations, &items, &diffs, &config, &[], None);
        assert!(matches!(result, Err(BoqaError::EmptyQuery)));
    }

    #[test]
    fn unknown_term_is_rejected() {
        let (ontology, annotations, items, diffs, config) = fixture();
        let result = run_query(&ontology, &annotations, &items, &diffs, &config, &[99], None);
        assert!(matches!(result, Err(BoqaError::UnknownTerm(_))));
    }

    #[test]
    fn ranking_breaks_ties_on_item_index() {
        let (ontology, annotations, items, diffs, mut config) = fixture();
        config.alpha_grid = vec![0.5];
        config.beta_grid = vec![0.5];
        let (ranked, _) = run_query(&ontology, &annotations, &items, &diffs, &config, &[2], None).unwrap();
        assert_eq!(ranked[0].item_id, 0);
        assert_eq!(ranked[1].item_id, 1);
    }

    #[test]
    fn trivial_chain_ranks_i0_first() {
        let (ontology, annotations, items, diffs, config) = fixture();
        let (ranked, _) = run_query(&ontology, &annotations, &items, &diffs, &config, &[2], None).unwrap();
        assert_eq!(ranked[0].item_id, 0);
        assert!((ranked[0].marginal - 1.0).abs() < 1e-9);
    }

    #[test]
    fn illegal_query_detects_ancestor_relation() {
        let ontology = ontology();
        assert!(is_illegal_query(&ontology, &[0, 2]));
        assert!(!is_illegal_query(&ontology, &[0]));
    }
}
