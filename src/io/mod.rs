//! External interfaces (spec.md §6): trait boundaries for ontology and
//! annotation sources. OBO/annotation-file parsing is out of scope
//! (spec.md §1); only the interface to the core is specified here,
//! plus a minimal in-memory adaptor for tests and the CLI demo.
use anyhow::{Context, Result};

use crate::annotation::RawAnnotation;
use crate::hierarchy::GraphEdge;
use crate::term::Term;
use crate::term_id::TermId;

/// Read-only supplier of `(termId, name, parents[])` for every term,
/// plus a topological order (spec.md §6 "Ontology source"). An
/// implementation must reject cycles before the core ever sees the
/// data; `SlimOntology::build` re-validates regardless.
pub trait OntologySource {
    type Term: Term;

    fn terms(&self) -> Vec<Self::Term>;

    /// Edges in the source's own representation; converted to
    /// [`GraphEdge`]s by the caller using `terms()`'s index order.
    fn edges(&self) -> Vec<GraphEdge>;
}

/// Iterable of `(itemName, termID, frequencyString?)` rows (spec.md §6
/// "Annotation source").
pub trait AnnotationSource {
    fn rows(&self) -> Vec<RawAnnotation>;
}

/// A plain in-memory [`OntologySource`] built from explicit term and
/// edge lists; sufficient for tests and the CLI demo fixture (real OBO
/// parsing is an external collaborator per spec.md §1).
pub struct InMemoryOntology<T> {
    terms: Vec<T>,
    edges: Vec<GraphEdge>,
}

impl<T: Term> InMemoryOntology<T> {
    pub fn new(terms: Vec<T>, edges: Vec<GraphEdge>) -> Self {
        Self { terms, edges }
    }
}

impl InMemoryOntology<crate::term::SimpleTerm> {
    /// Parses a minimal line-oriented fixture format, one term per
    /// line: `id\tname\tparent_id,parent_id,...`. Not an OBO parser —
    /// a deliberately small format for local fixtures and the CLI demo.
    pub fn from_tsv(text: &str) -> Result<Self> {
        use crate::term::SimpleTerm;
        use std::collections::HashMap;
        use std::str::FromStr;

        let mut terms = Vec::new();
        let mut index_of: HashMap<TermId, u32> = HashMap::new();
        let mut pending_parents: Vec<Vec<TermId>> = Vec::new();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(3, '\t');
            let id = fields
                .next()
                .with_context(|| format!("line {}: missing id column", lineno + 1))?;
            let name = fields.next().unwrap_or(id);
            let parents_field = fields.next().unwrap_or("");

            let term_id = TermId::from_str(id)
                .with_context(|| format!("line {}: invalid term id '{id}'", lineno + 1))?;
            let parents: Vec<TermId> = parents_field
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(TermId::from_str)
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("line {}: invalid parent id", lineno + 1))?;

            index_of.insert(term_id.clone(), terms.len() as u32);
            terms.push(SimpleTerm::new(term_id, name, vec![], false));
            pending_parents.push(parents);
        }

        let mut edges = Vec::new();
        for (child_idx, parents) in pending_parents.into_iter().enumerate() {
            for parent_id in parents {
                let parent_idx = *index_of
                    .get(&parent_id)
                    .with_context(|| format!("unknown parent id '{parent_id}'"))?;
                edges.push(GraphEdge::from((
                    child_idx,
                    crate::hierarchy::Relationship::Child,
                    parent_idx as usize,
                )));
            }
        }

        Ok(InMemoryOntology { terms, edges })
    }
}

impl<T: Term + Clone> OntologySource for InMemoryOntology<T> {
    type Term = T;

    fn terms(&self) -> Vec<T> {
        self.terms.clone()
    }

    fn edges(&self) -> Vec<GraphEdge> {
        self.edges.clone()
    }
}

/// A plain in-memory [`AnnotationSource`].
pub struct InMemoryAnnotations {
    rows: Vec<RawAnnotation>,
}

impl InMemoryAnnotations {
    pub fn new(rows: Vec<RawAnnotation>) -> Self {
        Self { rows }
    }

    /// Parses `itemName\ttermId\tfrequency?` rows, one per line.
    pub fn from_tsv(text: &str) -> Result<Self> {
        use std::str::FromStr;

        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(3, '\t');
            let item_name = fields
                .next()
                .with_context(|| format!("line {}: missing item name", lineno + 1))?
                .to_string();
            let term_id_raw = fields
                .next()
                .with_context(|| format!("line {}: missing term id", lineno + 1))?;
            let term_id = TermId::from_str(term_id_raw)
                .with_context(|| format!("line {}: invalid term id", lineno + 1))?;
            let frequency = fields.next().filter(|s| !s.is_empty()).map(str::to_string);
            rows.push(RawAnnotation {
                item_name,
                term_id,
                frequency,
            });
        }
        Ok(Self { rows })
    }
}

impl AnnotationSource for InMemoryAnnotations {
    fn rows(&self) -> Vec<RawAnnotation> {
        self.rows.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ontology_tsv_round_trip() {
        let text = "HP:0\troot\t\nHP:1\tchild\tHP:0\n";
        let source = InMemoryOntology::<crate::term::SimpleTerm>::from_tsv(text).unwrap();
        assert_eq!(source.terms.len(), 2);
        assert_eq!(source.edges.len(), 1);
    }

    #[test]
    fn ontology_tsv_rejects_unknown_parent() {
        let text = "HP:0\troot\tHP:999\n";
        assert!(InMemoryOntology::<crate::term::SimpleTerm>::from_tsv(text).is_err());
    }

    #[test]
    fn annotation_tsv_parses_optional_frequency() {
        let text = "disease-a\tHP:0\t50%\ndisease-b\tHP:1\n";
        let source = InMemoryAnnotations::from_tsv(text).unwrap();
        let rows = source.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].frequency.as_deref(), Some("50%"));
        assert_eq!(rows[1].frequency, None);
    }
}
