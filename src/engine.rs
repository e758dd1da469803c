//! Top-level engine tying the components together (spec.md §6 "Public
//! operations of the engine").
use crate::annotation::AnnotationTable;
use crate::config::BoqaConfig;
use crate::diff::DiffVectors;
use crate::error::BoqaError;
use crate::hierarchy::SlimOntology;
use crate::inference::CancellationToken;
use crate::io::{AnnotationSource, OntologySource};
use crate::item_index::ItemIndex;
use crate::query::{self, RankedItem};
use crate::term::Term;
use crate::term_id::{Identified, TermId};

/// The assembled engine: immutable after [`Boqa::setup`], shared
/// read-only across scoring workers (spec.md §5 "Sharing discipline").
pub struct Boqa<T: Term> {
    ontology: SlimOntology<T>,
    items: ItemIndex,
    annotations: AnnotationTable,
    diffs: DiffVectors,
    config: BoqaConfig,
}

impl<T: Term + Sync> Boqa<T> {
    /// Assembles the engine from an ontology source and an annotation
    /// source (spec.md §6 `setup`). Validates the ontology, builds the
    /// induced term sets, precomputes diff vectors, then populates
    /// information content now that annotation counts are known.
    pub fn setup<O, A>(ontology: &O, annotations: &A, config: BoqaConfig) -> Result<Self, BoqaError>
    where
        O: OntologySource<Term = T>,
        A: AnnotationSource,
    {
        let mut ontology = SlimOntology::build(ontology.terms(), ontology.edges())?;
        let (annotation_table, item_names) =
            AnnotationTable::build(&ontology, Rows(annotations), &config)?;

        let item_counts = annotation_table.term_item_counts(ontology.number_of_vertices());
        ontology.set_information_content(&item_counts, annotation_table.item_count());

        let items = ItemIndex::build(&ontology, item_names);
        let diffs = DiffVectors::build(&ontology, &annotation_table, &config);

        Ok(Self {
            ontology,
            items,
            annotations: annotation_table,
            diffs,
            config,
        })
    }

    /// `score(sortedTermIds) -> [(itemId, score)]`, descending by
    /// marginal (spec.md §6). `sorted_term_ids` are in the UI-facing
    /// sorted space; the result's `item_id`s are internal item indices,
    /// resolvable via [`Boqa::item_name`].
    pub fn score(&self, sorted_term_ids: &[u32]) -> Result<Vec<RankedItem>, BoqaError> {
        self.score_cancellable(sorted_term_ids, None)
    }

    pub fn score_cancellable(
        &self,
        sorted_term_ids: &[u32],
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<RankedItem>, BoqaError> {
        let mut internal_terms = Vec::with_capacity(sorted_term_ids.len());
        for &sorted in sorted_term_ids {
            let internal = self
                .items
                .sorted_to_internal(sorted)
                .ok_or_else(|| BoqaError::UnknownTerm(sorted.to_string()))?;
            internal_terms.push(internal);
        }

        let (ranked, _) = query::run_query(
            &self.ontology,
            &self.annotations,
            &self.items,
            &self.diffs,
            &self.config,
            &internal_terms,
            cancel,
        )?;
        Ok(ranked)
    }

    pub fn term_at(&self, sorted_idx: u32) -> Option<&T> {
        let internal = self.items.sorted_to_internal(sorted_idx)?;
        self.ontology.term_at(internal)
    }

    pub fn number_of_terms(&self, pattern: Option<&str>) -> usize {
        self.items.iter_matching(&self.ontology, pattern).count()
    }

    pub fn id_of_term<Q: Identified>(&self, term: &Q) -> Option<u32> {
        let internal = self.ontology.index_of_term(term)?;
        self.items.internal_to_sorted(internal)
    }

    pub fn item_name(&self, item_id: usize) -> Option<&str> {
        self.items.item_name(item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.item_count()
    }

    pub fn terms_directly_annotated_to(&self, item_id: usize) -> Vec<u32> {
        self.annotations
            .direct_terms(item_id)
            .iter()
            .filter_map(|&internal| self.items.internal_to_sorted(internal))
            .collect()
    }

    pub fn frequencies_directly_annotated_to(&self, item_id: usize) -> &[f64] {
        self.annotations.frequencies(item_id)
    }

    pub fn parents_of(&self, sorted_idx: u32) -> Vec<u32> {
        let Some(internal) = self.items.sorted_to_internal(sorted_idx) else {
            return Vec::new();
        };
        self.ontology
            .parents_of(internal)
            .iter()
            .filter_map(|&p| self.items.internal_to_sorted(p))
            .collect()
    }

    pub fn ontology(&self) -> &SlimOntology<T> {
        &self.ontology
    }

    pub fn config(&self) -> &BoqaConfig {
        &self.config
    }
}

/// Adapts an [`AnnotationSource`] to the `IntoIterator<Item =
/// RawAnnotation>` that [`AnnotationTable::build`] expects.
struct Rows<'a, A: AnnotationSource>(&'a A);

impl<'a, A: AnnotationSource> IntoIterator for Rows<'a, A> {
    type Item = crate::annotation::RawAnnotation;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.rows().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{GraphEdge, Relationship};
    use crate::io::{InMemoryAnnotations, InMemoryOntology};
    use crate::term::SimpleTerm;
    use std::str::FromStr;

    fn fixture() -> Boqa<SimpleTerm> {
        let terms = vec![
            SimpleTerm::new(TermId::from_str("HP:0").unwrap(), "root", vec![], false),
            SimpleTerm::new(TermId::from_str("HP:1").unwrap(), "mid", vec![], false),
            SimpleTerm::new(TermId::from_str("HP:2").unwrap(), "leaf", vec![], false),
        ];
        let edges = vec![
            GraphEdge::from((1, Relationship::Child, 0)),
            GraphEdge::from((2, Relationship::Child, 1)),
        ];
        let ontology_source = InMemoryOntology::new(terms, edges);

        let annotations = InMemoryAnnotations::new(vec![
            crate::annotation::RawAnnotation {
                item_name: "disease-a".into(),
                term_id: TermId::from_str("HP:2").unwrap(),
                frequency: None,
            },
            crate::annotation::RawAnnotation {
                item_name: "disease-b".into(),
                term_id: TermId::from_str("HP:1").unwrap(),
                frequency: None,
            },
        ]);

        let mut config = BoqaConfig::default();
        config.use_frequencies = false;
        config.alpha_grid = vec![0.0];
        config.beta_grid = vec![0.0];

        Boqa::setup(&ontology_source, &annotations, config).unwrap()
    }

    #[test]
    fn setup_and_score_round_trip() {
        let engine = fixture();
        let leaf_sorted = engine.id_of_term(&TermId::from_str("HP:2").unwrap()).unwrap();
        let ranked = engine.score(&[leaf_sorted]).unwrap();
        assert_eq!(engine.item_name(ranked[0].item_id), Some("disease-a"));
    }

    #[test]
    fn sort_round_trip_holds_for_every_term() {
        let engine = fixture();
        for sorted_idx in 0..engine.number_of_terms(None) as u32 {
            let term = engine.term_at(sorted_idx).unwrap();
            assert_eq!(engine.id_of_term(term), Some(sorted_idx));
        }
    }

    #[test]
    fn empty_query_is_propagated() {
        let engine = fixture();
        assert!(matches!(engine.score(&[]), Err(BoqaError::EmptyQuery)));
    }
}
