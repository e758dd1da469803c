//! Marginal-probability computation over the whole catalogue: sums
//! over the (α, β) grid and, when enabled, over frequency-weighted
//! hidden configurations; dispatched across a worker pool (spec.md C6).
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::annotation::AnnotationTable;
use crate::bitset::BitSet;
use crate::case::{apply_diff, count_all, CaseCounts};
use crate::config::BoqaConfig;
use crate::diff::DiffVectors;
use crate::error::BoqaError;
use crate::hierarchy::SlimOntology;
use crate::term::Term;

/// A cooperative cancellation flag, polled at the top of each per-item
/// task and before each inner configuration-loop iteration (spec.md
/// §5 "Cancellation/timeouts"). Not part of the core contract — an
/// optional layer a caller may wire into a long query.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parallel arrays of length N: the log-score and normalised marginal
/// for every item, plus a snapshot of the case counts at the
/// highest-likelihood configuration (spec.md §3 "Result").
pub struct ScoreOutcome {
    pub scores: Box<[f64]>,
    pub marginals: Box<[f64]>,
    pub counts: Box<[CaseCounts]>,
}

/// `logAdd(a, b) = max + log(1 + exp(-|a - b|))`, with `logAdd(-∞, x) = x`
/// (spec.md §4.6, stable log-sum-exp).
pub fn log_add(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let m = a.max(b);
    m + (1.0 + (-(a - b).abs()).exp()).ln()
}

pub fn log_sum_exp<I: IntoIterator<Item = f64>>(xs: I) -> f64 {
    xs.into_iter().fold(f64::NEG_INFINITY, log_add)
}

/// Runs inference for every item against the observed vector `observed`.
///
/// `observed` must already be ancestor-closed (spec.md C7's
/// responsibility, not C6's). Returns [`BoqaError::Cancelled`] if
/// `cancel` fires mid-run; no partial result is returned.
pub fn run<T>(
    ontology: &SlimOntology<T>,
    annotations: &AnnotationTable,
    diffs: &DiffVectors,
    observed: &BitSet,
    config: &BoqaConfig,
    cancel: Option<&CancellationToken>,
) -> Result<ScoreOutcome, BoqaError>
where
    T: Term + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.resolved_thread_count())
        .build()
        .map_err(|e| BoqaError::InvalidOntology(format!("failed to build worker pool: {e}")))?;

    let n = annotations.item_count();
    let per_item: Vec<(f64, CaseCounts)> = pool.install(|| {
        (0..n)
            .into_par_iter()
            .map(|i| {
                if let Some(cancel) = cancel {
                    if cancel.is_cancelled() {
                        return Err(BoqaError::Cancelled);
                    }
                }
                score_item(ontology, annotations, diffs, observed, config, i, cancel)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let scores: Box<[f64]> = per_item.iter().map(|(s, _)| *s).collect();
    let counts: Box<[CaseCounts]> = per_item.iter().map(|(_, c)| *c).collect();

    let z = log_sum_exp(scores.iter().copied());
    let marginals: Box<[f64]> = scores
        .iter()
        .map(|&s| (s - z).exp().min(1.0))
        .collect();

    Ok(ScoreOutcome {
        scores,
        marginals,
        counts,
    })
}

/// Scores a single item. Returns [`BoqaError::Cancelled`] if `cancel`
/// fires mid-way through the frequency-configuration loop — a
/// cancelled item must never contribute a truncated log-sum-exp to the
/// final [`ScoreOutcome`] (spec.md §5: "No partial result is returned").
fn score_item<T: Term>(
    ontology: &SlimOntology<T>,
    annotations: &AnnotationTable,
    diffs: &DiffVectors,
    observed: &BitSet,
    config: &BoqaConfig,
    item: usize,
    cancel: Option<&CancellationToken>,
) -> Result<(f64, CaseCounts), BoqaError> {
    let t_count = ontology.number_of_vertices();

    if config.use_frequencies {
        let mut hidden = BitSet::new(t_count);
        let mut counts = count_all(ontology, &config.inheritance, &hidden, observed);

        let mut weighted = Vec::with_capacity(diffs.frequency_configs(item).len());
        let mut best = (f64::NEG_INFINITY, counts);
        for freq_cfg in diffs.frequency_configs(item) {
            if let Some(cancel) = cancel {
                if cancel.is_cancelled() {
                    return Err(BoqaError::Cancelled);
                }
            }
            apply_diff(
                ontology,
                &config.inheritance,
                &mut hidden,
                observed,
                &mut counts,
                &freq_cfg.diff_on,
                &freq_cfg.diff_off,
            );
            for &alpha in &config.alpha_grid {
                for &beta in &config.beta_grid {
                    let ll = counts.log_likelihood(alpha, beta) + freq_cfg.factor;
                    weighted.push(ll);
                    if ll > best.0 {
                        best = (ll, counts);
                    }
                }
            }
        }
        Ok((log_sum_exp(weighted), best.1))
    } else {
        let mut hidden = BitSet::new(t_count);
        if item > 0 {
            hidden.set_all(annotations.induced_terms(item - 1));
        }
        let mut counts = count_all(ontology, &config.inheritance, &hidden, observed);
        apply_diff(
            ontology,
            &config.inheritance,
            &mut hidden,
            observed,
            &mut counts,
            diffs.diff_on(item),
            diffs.diff_off(item),
        );

        let mut scores = Vec::with_capacity(config.alpha_grid.len() * config.beta_grid.len());
        for &alpha in &config.alpha_grid {
            for &beta in &config.beta_grid {
                scores.push(counts.log_likelihood(alpha, beta));
            }
        }
        Ok((log_sum_exp(scores), counts))
    }
}
