//! Incremental diff-vector machinery that makes whole-catalogue
//! scoring tractable (spec.md C4): both the plain item-to-item deltas
//! and the frequency-configuration deltas used when `use_frequencies`
//! is enabled.
use crate::annotation::AnnotationTable;
use crate::config::BoqaConfig;
use crate::hierarchy::SlimOntology;
use crate::term::Term;

/// Elements present in `a` but not in `b`. Both inputs must be sorted;
/// the result is sorted. Linear merge over the two sequences
/// (spec.md §8 helper property `setDiff`).
pub fn set_diff(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() {
        match b.get(j) {
            Some(&bv) if bv < a[i] => j += 1,
            Some(&bv) if bv == a[i] => {
                i += 1;
                j += 1;
            }
            _ => {
                out.push(a[i]);
                i += 1;
            }
        }
    }
    out
}

/// Count of indices present in exactly one of `a`, `b` (both sorted).
/// spec.md §8 helper property `hammingDistanceSparse`.
pub fn hamming_distance_sparse(a: &[u32], b: &[u32]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0usize);
    while i < a.len() || j < b.len() {
        match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) if x == y => {
                i += 1;
                j += 1;
            }
            (Some(&x), Some(&y)) if x < y => {
                count += 1;
                i += 1;
            }
            (Some(_), Some(_)) => {
                count += 1;
                j += 1;
            }
            (Some(_), None) => {
                count += 1;
                i += 1;
            }
            (None, Some(_)) => {
                count += 1;
                j += 1;
            }
            (None, None) => unreachable!(),
        }
    }
    count
}

/// Enumerates the empty subset, then every non-empty subset of
/// `[0, n)` with cardinality `<= m`, in the canonical order of
/// spec.md §4.4's state machine. With `n == m` this is the full
/// powerset (`2^n` subsets), which is how frequency configurations
/// are generated.
pub struct SubsetGenerator {
    n: usize,
    m: usize,
    j: Vec<usize>,
    r: usize,
    started: bool,
    finished: bool,
}

impl SubsetGenerator {
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            n,
            m,
            j: Vec::new(),
            r: 0,
            started: false,
            finished: false,
        }
    }
}

impl Iterator for SubsetGenerator {
    type Item = Box<[usize]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.j[..self.r].to_vec().into_boxed_slice());
        }

        let next_val = if self.r == 0 { 0 } else { self.j[self.r - 1] + 1 };
        let can_extend = self.r < self.m && next_val < self.n;

        if can_extend {
            if self.j.len() == self.r {
                self.j.push(next_val);
            } else {
                self.j[self.r] = next_val;
            }
            self.r += 1;
        } else {
            while self.r > 0 && self.j[self.r - 1] == self.n - 1 {
                self.r -= 1;
            }
            if self.r == 0 {
                self.finished = true;
                return None;
            }
            self.j[self.r - 1] += 1;
        }

        Some(self.j[..self.r].to_vec().into_boxed_slice())
    }
}

/// One frequency-weighted hidden configuration of an item (spec.md
/// §3 "DiffVectors… frequency mode").
#[derive(Debug, Clone)]
pub struct FrequencyConfig {
    pub diff_on: Box<[u32]>,
    pub diff_off: Box<[u32]>,
    pub factor: f64,
}

/// Precomputed deltas between consecutive items and, when frequencies
/// are in play, between adjacent frequency configurations of the same
/// item (spec.md C4).
pub struct DiffVectors {
    diff_on: Box<[Box<[u32]>]>,
    diff_off: Box<[Box<[u32]>]>,
    freq_configs: Box<[Box<[FrequencyConfig]>]>,
}

impl DiffVectors {
    pub fn build<T: Term>(
        ontology: &SlimOntology<T>,
        annotations: &AnnotationTable,
        config: &BoqaConfig,
    ) -> Self {
        let n = annotations.item_count();

        let mut diff_on = Vec::with_capacity(n);
        let mut diff_off = Vec::with_capacity(n);
        let mut previous_induced: &[u32] = &[];
        for i in 0..n {
            let induced = annotations.induced_terms(i);
            diff_on.push(set_diff(induced, previous_induced).into_boxed_slice());
            diff_off.push(set_diff(previous_induced, induced).into_boxed_slice());
            previous_induced = induced;
        }

        let freq_configs: Vec<Box<[FrequencyConfig]>> = (0..n)
            .map(|i| build_frequency_configs(ontology, annotations, i, config.max_frequency_terms))
            .collect();

        Self {
            diff_on: diff_on.into_boxed_slice(),
            diff_off: diff_off.into_boxed_slice(),
            freq_configs: freq_configs.into_boxed_slice(),
        }
    }

    pub fn diff_on(&self, item: usize) -> &[u32] {
        &self.diff_on[item]
    }

    pub fn diff_off(&self, item: usize) -> &[u32] {
        &self.diff_off[item]
    }

    pub fn frequency_configs(&self, item: usize) -> &[FrequencyConfig] {
        &self.freq_configs[item]
    }
}

fn build_frequency_configs<T: Term>(
    ontology: &SlimOntology<T>,
    annotations: &AnnotationTable,
    item: usize,
    max_frequency_terms: usize,
) -> Box<[FrequencyConfig]> {
    let direct = annotations.direct_terms(item);
    let freqs = annotations.frequencies(item);
    let order = annotations.frequency_order(item);

    let k = annotations.frequency_weighted_count(item, max_frequency_terms);
    // `order` is ascending by frequency; the first `k` entries are the
    // weighted slots, everything else is mandatory (frequency 1.0, or
    // beyond the cap and thus always taken).
    let weighted: Vec<u32> = order[..k].to_vec();
    let mandatory: Vec<u32> = {
        let mut m: Vec<u32> = order[k..].iter().map(|&idx| direct[idx as usize]).collect();
        m.sort_unstable();
        m
    };

    let mut configs = Vec::with_capacity(1usize << k);
    let mut previous_hidden: Vec<u32> = Vec::new();

    for subset in SubsetGenerator::new(k, k) {
        let mut taken_terms: Vec<u32> = subset
            .iter()
            .map(|&local| direct[weighted[local] as usize])
            .collect();
        taken_terms.extend_from_slice(&mandatory);
        taken_terms.sort_unstable();
        taken_terms.dedup();

        let hidden = ontology.ancestor_closure(taken_terms.into_iter());

        let diff_on = set_diff(&hidden, &previous_hidden).into_boxed_slice();
        let diff_off = set_diff(&previous_hidden, &hidden).into_boxed_slice();

        let mut factor = 0.0;
        for local in 0..k {
            let direct_idx = weighted[local] as usize;
            let f = freqs[direct_idx];
            factor += if subset.contains(&local) {
                f.ln()
            } else {
                (1.0 - f).ln()
            };
        }

        configs.push(FrequencyConfig {
            diff_on,
            diff_off,
            factor,
        });
        previous_hidden = hidden;
    }

    configs.into_boxed_slice()
}
