//! Persisted score-distribution cache, gzip-compressed and keyed by a
//! fingerprint of the setup data (spec.md §6 "Persisted artefacts").
use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationTable;
use crate::hierarchy::SlimOntology;
use crate::item_index::ItemIndex;
use crate::term::Term;

/// Integer hash identifying a compatible precomputed artefact (spec.md
/// GLOSSARY "Fingerprint"): a hash combining all item names, all term
/// identifiers, all term names, the score-distribution size, and the
/// max cached query size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn compute<T: Term>(
        ontology: &SlimOntology<T>,
        items: &ItemIndex,
        annotations: &AnnotationTable,
        distribution_size: usize,
        max_cached_query_size: usize,
    ) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        for i in 0..items.item_count() {
            items.item_name(i).hash(&mut hasher);
        }
        for term in ontology.iter_terms() {
            term.identifier().to_string().hash(&mut hasher);
            term.name().hash(&mut hasher);
        }
        annotations.item_count().hash(&mut hasher);
        distribution_size.hash(&mut hasher);
        max_cached_query_size.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

/// A score-distribution cache entry: the fingerprint it was computed
/// under, plus per-item sampled score distributions (flattened, one
/// `Vec<f64>` per item) used by the similarity paths' p-value
/// machinery. On a fingerprint mismatch the caller recomputes silently
/// (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDistributionCache {
    fingerprint: Fingerprint,
    distributions: Vec<Vec<f64>>,
}

impl ScoreDistributionCache {
    pub fn new(fingerprint: Fingerprint, distributions: Vec<Vec<f64>>) -> Self {
        Self {
            fingerprint,
            distributions,
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn distribution(&self, item: usize) -> Option<&[f64]> {
        self.distributions.get(item).map(Vec::as_slice)
    }

    /// Serialises and gzip-compresses the cache to `writer`.
    pub fn save<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        let bytes = serde_json::to_vec(self)?;
        encoder.write_all(&bytes)?;
        encoder.finish()?;
        Ok(())
    }

    /// Loads a cache from `reader`, returning `Ok(None)` if the
    /// decompressed fingerprint does not match `expected` — the
    /// caller recomputes silently rather than treating this as an error.
    pub fn load<R: Read>(reader: R, expected: Fingerprint) -> anyhow::Result<Option<Self>> {
        let mut decoder = GzDecoder::new(reader);
        let mut bytes = Vec::new();
        decoder.read_to_end(&mut bytes)?;
        let cache: Self = serde_json::from_slice(&bytes)?;
        if cache.fingerprint == expected {
            Ok(Some(cache))
        } else {
            Ok(None)
        }
    }
}
