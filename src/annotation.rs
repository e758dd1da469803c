//! Per-item annotation data: direct/induced term sets, frequencies,
//! and frequency-ascending order (spec.md C3).
use crate::config::BoqaConfig;
use crate::error::BoqaError;
use crate::freq::parse_frequency;
use crate::hierarchy::SlimOntology;
use crate::term::Term;
use crate::term_id::TermId;

/// One row supplied by an [`crate::io::AnnotationSource`]: an item
/// name, the directly-annotated term, and an optional raw frequency
/// string (spec.md §6).
#[derive(Debug, Clone)]
pub struct RawAnnotation {
    pub item_name: String,
    pub term_id: TermId,
    pub frequency: Option<String>,
}

/// Per-item annotation data (spec.md C3 / §3 "Item").
pub struct AnnotationTable {
    direct_terms: Box<[Box<[u32]>]>,
    induced_terms: Box<[Box<[u32]>]>,
    frequencies: Box<[Box<[f64]>]>,
    frequency_order: Box<[Box<[u32]>]>,
    has_explicit_frequency: Box<[bool]>,
}

impl AnnotationTable {
    /// Builds the table from raw rows, in iteration order. Returns the
    /// table together with the item names in internal (fixed) order.
    ///
    /// Fails with [`BoqaError::InvalidAnnotations`] when an annotation
    /// refers to a term absent from `ontology`, or when no items
    /// remain after `config.consider_frequencies_only` filtering.
    pub fn build<T, I>(
        ontology: &SlimOntology<T>,
        rows: I,
        config: &BoqaConfig,
    ) -> Result<(Self, Vec<String>), BoqaError>
    where
        T: Term,
        I: IntoIterator<Item = RawAnnotation>,
    {
        let mut item_names: Vec<String> = Vec::new();
        let mut item_lookup: std::collections::HashMap<String, usize> = Default::default();
        // (term_idx, frequency_string) per item, in first-seen order.
        let mut per_item: Vec<Vec<(u32, Option<String>)>> = Vec::new();

        for row in rows {
            let term_idx = ontology.index_of_term(&TermIdQuery(&row.term_id)).ok_or_else(|| {
                BoqaError::InvalidAnnotations(format!(
                    "annotation references unknown term '{}'",
                    row.term_id
                ))
            })?;

            let item_idx = *item_lookup.entry(row.item_name.clone()).or_insert_with(|| {
                item_names.push(row.item_name.clone());
                per_item.push(Vec::new());
                item_names.len() - 1
            });

            if !per_item[item_idx].iter().any(|(t, _)| *t == term_idx) {
                per_item[item_idx].push((term_idx, row.frequency.clone()));
            }
        }

        let mut direct_terms = Vec::with_capacity(per_item.len());
        let mut induced_terms = Vec::with_capacity(per_item.len());
        let mut frequencies = Vec::with_capacity(per_item.len());
        let mut frequency_order = Vec::with_capacity(per_item.len());
        let mut has_explicit_frequency = Vec::with_capacity(per_item.len());
        let mut kept_names = Vec::with_capacity(per_item.len());

        for (idx, mut terms) in per_item.into_iter().enumerate() {
            terms.sort_by_key(|(t, _)| *t);

            let explicit_any = terms.iter().any(|(_, f)| f.is_some());
            let freqs: Vec<f64> = terms
                .iter()
                .map(|(_, f)| f.as_deref().map(parse_frequency).unwrap_or(1.0))
                .collect();

            // spec.md §4.3 step 1: drop items with no term having an
            // explicit frequency *below* 1.0 — a term explicitly
            // annotated as "100%"/"obligate" does not count.
            let has_weighted_term = terms
                .iter()
                .zip(freqs.iter())
                .any(|((_, f), &parsed)| f.is_some() && parsed < 1.0);
            if config.consider_frequencies_only && !has_weighted_term {
                continue;
            }

            let direct: Vec<u32> = terms.iter().map(|(t, _)| *t).collect();

            let mut order: Vec<u32> = (0..direct.len() as u32).collect();
            order.sort_by(|&a, &b| {
                freqs[a as usize]
                    .partial_cmp(&freqs[b as usize])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let induced = ontology.ancestor_closure(direct.iter().copied());

            direct_terms.push(direct.into_boxed_slice());
            induced_terms.push(induced.into_boxed_slice());
            frequencies.push(freqs.into_boxed_slice());
            frequency_order.push(order.into_boxed_slice());
            has_explicit_frequency.push(explicit_any);
            kept_names.push(item_names[idx].clone());
        }

        if kept_names.is_empty() {
            return Err(BoqaError::InvalidAnnotations(
                "no items remained after frequency filtering".to_string(),
            ));
        }

        Ok((
            Self {
                direct_terms: direct_terms.into_boxed_slice(),
                induced_terms: induced_terms.into_boxed_slice(),
                frequencies: frequencies.into_boxed_slice(),
                frequency_order: frequency_order.into_boxed_slice(),
                has_explicit_frequency: has_explicit_frequency.into_boxed_slice(),
            },
            kept_names,
        ))
    }

    pub fn item_count(&self) -> usize {
        self.direct_terms.len()
    }

    pub fn direct_terms(&self, item: usize) -> &[u32] {
        &self.direct_terms[item]
    }

    pub fn induced_terms(&self, item: usize) -> &[u32] {
        &self.induced_terms[item]
    }

    pub fn frequencies(&self, item: usize) -> &[f64] {
        &self.frequencies[item]
    }

    /// Indices into `direct_terms(item)`, ascending by frequency.
    pub fn frequency_order(&self, item: usize) -> &[u32] {
        &self.frequency_order[item]
    }

    pub fn has_explicit_frequency(&self, item: usize) -> bool {
        self.has_explicit_frequency[item]
    }

    /// Number of directly-annotated terms with frequency `< 1.0`,
    /// capped at `max_frequency_terms` — this is `kᵢ` in spec.md §3.
    pub fn frequency_weighted_count(&self, item: usize, max_frequency_terms: usize) -> usize {
        let below_one = self.frequencies[item].iter().filter(|&&f| f < 1.0).count();
        below_one.min(max_frequency_terms)
    }

    /// Per-term count of items whose induced set includes the term —
    /// the numerator of information content (spec.md §3 `ic[t]`).
    pub fn term_item_counts(&self, num_terms: usize) -> Vec<u32> {
        let mut counts = vec![0u32; num_terms];
        for induced in self.induced_terms.iter() {
            for &t in induced.iter() {
                counts[t as usize] += 1;
            }
        }
        counts
    }
}

/// Adapts a borrowed [`TermId`] to [`crate::term_id::Identified`] for
/// the lookup in [`SlimOntology::index_of_term`].
struct TermIdQuery<'a>(&'a TermId);

impl crate::term_id::Identified for TermIdQuery<'_> {
    fn identifier(&self) -> &TermId {
        self.0
    }
}
