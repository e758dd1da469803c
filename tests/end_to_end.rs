//! End-to-end scenarios exercised through the public `Boqa` API
//! (spec.md §8).
use boqa::prelude::*;
use std::str::FromStr;

fn chain_ontology() -> InMemoryOntology<SimpleTerm> {
    let terms = vec![
        SimpleTerm::new(TermId::from_str("HP:0").unwrap(), "t0", vec![], false),
        SimpleTerm::new(TermId::from_str("HP:1").unwrap(), "t1", vec![], false),
        SimpleTerm::new(TermId::from_str("HP:2").unwrap(), "t2", vec![], false),
    ];
    let edges = vec![
        GraphEdge::from((1, Relationship::Child, 0)),
        GraphEdge::from((2, Relationship::Child, 1)),
    ];
    InMemoryOntology::new(terms, edges)
}

fn row(item: &str, term: &str, freq: Option<&str>) -> RawAnnotation {
    RawAnnotation {
        item_name: item.to_string(),
        term_id: TermId::from_str(term).unwrap(),
        frequency: freq.map(str::to_string),
    }
}

/// Scenario 3: frequency weighting — marginal(I1) > marginal(I0).
#[test]
fn frequency_weighting_favours_the_always_present_term() {
    let ontology = chain_ontology();
    let annotations = InMemoryAnnotations::new(vec![
        row("I0", "HP:2", Some("10%")),
        row("I1", "HP:2", Some("obligate")),
    ]);
    let mut config = BoqaConfig::default();
    config.use_frequencies = true;
    config.alpha_grid = vec![0.01];
    config.beta_grid = vec![0.1];

    let engine = Boqa::setup(&ontology, &annotations, config).unwrap();
    let term = engine.id_of_term(&TermId::from_str("HP:2").unwrap()).unwrap();
    let ranked = engine.score(&[term]).unwrap();

    let marginal = |name: &str| {
        ranked
            .iter()
            .find(|r| engine.item_name(r.item_id) == Some(name))
            .unwrap()
            .marginal
    };
    assert!(marginal("I1") > marginal("I0"));
}

/// Scenario 4: ancestor closure — both I0={T0,T2} and I1={T1} get
/// nonzero marginal when the query is {T2}.
#[test]
fn ancestor_closure_gives_both_items_nonzero_marginal() {
    let ontology = chain_ontology();
    let annotations = InMemoryAnnotations::new(vec![
        row("I0", "HP:0", None),
        row("I0", "HP:2", None),
        row("I1", "HP:1", None),
    ]);
    let config = BoqaConfig::default();
    let engine = Boqa::setup(&ontology, &annotations, config).unwrap();
    let term = engine.id_of_term(&TermId::from_str("HP:2").unwrap()).unwrap();
    let ranked = engine.score(&[term]).unwrap();

    for r in &ranked {
        assert!(r.marginal > 0.0, "item {} had zero marginal", r.item_id);
    }
}

/// Scenario 5: empty query.
#[test]
fn empty_query_returns_empty_query_error() {
    let ontology = chain_ontology();
    let annotations = InMemoryAnnotations::new(vec![row("I0", "HP:2", None)]);
    let engine = Boqa::setup(&ontology, &annotations, BoqaConfig::default()).unwrap();
    assert!(matches!(engine.score(&[]), Err(BoqaError::EmptyQuery)));
}

/// Builds a synthetic 20-item, 200-term balanced-binary-tree ontology
/// with each item annotated to a handful of random-ish leaves.
fn synthetic_ontology_and_annotations() -> (InMemoryOntology<SimpleTerm>, InMemoryAnnotations) {
    let n_terms = 200;
    let terms: Vec<SimpleTerm> = (0..n_terms)
        .map(|i| SimpleTerm::new(TermId::from_str(&format!("HP:{i}")).unwrap(), format!("t{i}"), vec![], false))
        .collect();
    let edges: Vec<GraphEdge> = (1..n_terms)
        .map(|i| GraphEdge::from((i, Relationship::Child, (i - 1) / 2)))
        .collect();
    let ontology = InMemoryOntology::new(terms, edges);

    let mut rows = Vec::new();
    for item in 0..20 {
        for k in 0..3 {
            let leaf = n_terms - 1 - ((item * 7 + k * 13) % 50);
            rows.push(row(&format!("item-{item}"), &format!("HP:{leaf}"), None));
        }
    }
    (ontology, InMemoryAnnotations::new(rows))
}

/// Scenario 6: deterministic ranking across thread counts.
#[test]
fn deterministic_ranking_across_thread_counts() {
    let (ontology, annotations) = synthetic_ontology_and_annotations();
    let query_terms = vec!["HP:199", "HP:150", "HP:120"];

    let mut single = BoqaConfig::default();
    single.num_threads = 1;
    let mut multi = BoqaConfig::default();
    multi.num_threads = 8;

    let engine_single = Boqa::setup(&ontology, &annotations, single).unwrap();
    let engine_multi = Boqa::setup(&ontology, &annotations, multi).unwrap();

    let ids_single: Vec<u32> = query_terms
        .iter()
        .map(|t| engine_single.id_of_term(&TermId::from_str(t).unwrap()).unwrap())
        .collect();
    let ids_multi: Vec<u32> = query_terms
        .iter()
        .map(|t| engine_multi.id_of_term(&TermId::from_str(t).unwrap()).unwrap())
        .collect();

    let ranked_single = engine_single.score(&ids_single).unwrap();
    let ranked_multi = engine_multi.score(&ids_multi).unwrap();

    assert_eq!(ranked_single.len(), ranked_multi.len());
    let mut by_item_single: Vec<_> = ranked_single.clone();
    let mut by_item_multi: Vec<_> = ranked_multi.clone();
    by_item_single.sort_by_key(|r| r.item_id);
    by_item_multi.sort_by_key(|r| r.item_id);
    for (a, b) in by_item_single.iter().zip(by_item_multi.iter()) {
        assert_eq!(a.item_id, b.item_id);
        assert!((a.marginal - b.marginal).abs() < 1e-12);
    }
}

/// Normalisation property: sum of marginals is within [1-eps, 1].
#[test]
fn marginals_normalise_to_within_epsilon_of_one() {
    let (ontology, annotations) = synthetic_ontology_and_annotations();
    let config = BoqaConfig::default();
    let engine = Boqa::setup(&ontology, &annotations, config).unwrap();
    let term = engine.id_of_term(&TermId::from_str("HP:199").unwrap()).unwrap();
    let ranked = engine.score(&[term]).unwrap();
    let sum: f64 = ranked.iter().map(|r| r.marginal).sum();
    assert!(sum <= 1.0 + 1e-9);
    assert!(sum >= 1.0 - 1e-6);
}

/// Monotone-in-alpha property on a synthetic two-item ontology: the
/// item whose query mismatches more terms becomes relatively more
/// probable as alpha (false-positive tolerance) grows.
#[test]
fn increasing_alpha_favours_the_item_with_more_mismatches() {
    let terms = vec![
        SimpleTerm::new(TermId::from_str("HP:0").unwrap(), "root", vec![], false),
        SimpleTerm::new(TermId::from_str("HP:1").unwrap(), "a", vec![], false),
        SimpleTerm::new(TermId::from_str("HP:2").unwrap(), "b", vec![], false),
    ];
    let edges = vec![
        GraphEdge::from((1, Relationship::Child, 0)),
        GraphEdge::from((2, Relationship::Child, 0)),
    ];
    let ontology = InMemoryOntology::new(terms, edges);
    let annotations = InMemoryAnnotations::new(vec![row("exact", "HP:1", None), row("mismatch", "HP:2", None)]);

    let mut low_alpha = BoqaConfig::default();
    low_alpha.use_frequencies = false;
    low_alpha.alpha_grid = vec![0.01];
    low_alpha.beta_grid = vec![0.1];
    let mut high_alpha = low_alpha.clone();
    high_alpha.alpha_grid = vec![0.4];

    let engine_low = Boqa::setup(&ontology, &annotations, low_alpha).unwrap();
    let engine_high = Boqa::setup(&ontology, &annotations, high_alpha).unwrap();
    let term = engine_low.id_of_term(&TermId::from_str("HP:1").unwrap()).unwrap();

    let marginal_of = |engine: &Boqa<SimpleTerm>, name: &str| {
        engine
            .score(&[term])
            .unwrap()
            .into_iter()
            .find(|r| engine.item_name(r.item_id) == Some(name))
            .unwrap()
            .marginal
    };

    let mismatch_low = marginal_of(&engine_low, "mismatch");
    let mismatch_high = marginal_of(&engine_high, "mismatch");
    assert!(mismatch_high > mismatch_low);
}
