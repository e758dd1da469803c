//! Deterministic mappings between external identifiers, item names,
//! and dense internal indices (spec.md C2).
use crate::hierarchy::SlimOntology;
use crate::term::Term;
use crate::term_id::Identified;

/// Two stable orderings layered over a [`SlimOntology`] and the
/// annotation source's item list:
///
/// * the *internal* item order, fixed at setup to the iteration order
///   of the annotation source;
/// * the *sorted* term order exposed to callers, terms ordered
///   case-insensitively by name (ties broken by identifier), with a
///   `sorted → internal` and `internal → sorted` permutation.
///
/// All public-facing APIs speak sorted-space term indices; conversion
/// to the dense internal index used by the rest of the engine happens
/// only at this boundary.
pub struct ItemIndex {
    item_names: Box<[String]>,
    sorted_to_internal: Box<[u32]>,
    internal_to_sorted: Box<[u32]>,
}

impl ItemIndex {
    /// Builds the index: item order is taken verbatim from
    /// `item_names` (the annotation source's iteration order); term
    /// order is derived by sorting `ontology`'s terms by name.
    pub fn build<T: Term>(ontology: &SlimOntology<T>, item_names: Vec<String>) -> Self {
        let t = ontology.number_of_vertices();
        let mut sorted_to_internal: Vec<u32> = (0..t as u32).collect();
        sorted_to_internal.sort_by(|&a, &b| {
            let ta = ontology.term_at(a).expect("index in range");
            let tb = ontology.term_at(b).expect("index in range");
            ta.name()
                .to_lowercase()
                .cmp(&tb.name().to_lowercase())
                .then_with(|| ta.identifier().to_string().cmp(&tb.identifier().to_string()))
        });

        let mut internal_to_sorted = vec![0u32; t];
        for (sorted_idx, &internal_idx) in sorted_to_internal.iter().enumerate() {
            internal_to_sorted[internal_idx as usize] = sorted_idx as u32;
        }

        Self {
            item_names: item_names.into_boxed_slice(),
            sorted_to_internal: sorted_to_internal.into_boxed_slice(),
            internal_to_sorted: internal_to_sorted.into_boxed_slice(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_names.len()
    }

    pub fn term_count(&self) -> usize {
        self.sorted_to_internal.len()
    }

    pub fn item_name(&self, item_idx: usize) -> Option<&str> {
        self.item_names.get(item_idx).map(String::as_str)
    }

    /// Converts a sorted-space (UI-facing) term index to the internal
    /// dense index used by the rest of the engine.
    pub fn sorted_to_internal(&self, sorted_idx: u32) -> Option<u32> {
        self.sorted_to_internal.get(sorted_idx as usize).copied()
    }

    /// Converts an internal dense term index to its sorted-space index.
    pub fn internal_to_sorted(&self, internal_idx: u32) -> Option<u32> {
        self.internal_to_sorted.get(internal_idx as usize).copied()
    }

    /// Iterates sorted-space indices of terms whose name or identifier
    /// contains `pattern`, case-insensitively. `pattern = None` yields
    /// every term in sorted order.
    pub fn iter_matching<'a, T: Term>(
        &'a self,
        ontology: &'a SlimOntology<T>,
        pattern: Option<&'a str>,
    ) -> impl Iterator<Item = u32> + 'a {
        let needle = pattern.map(str::to_lowercase);
        (0..self.term_count() as u32).filter(move |&sorted_idx| match &needle {
            None => true,
            Some(needle) => {
                let internal = self.sorted_to_internal[sorted_idx as usize];
                let term = ontology.term_at(internal).expect("index in range");
                term.name().to_lowercase().contains(needle.as_str())
                    || term.identifier().to_string().to_lowercase().contains(needle.as_str())
            }
        })
    }
}
