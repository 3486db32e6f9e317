//! End-to-end tests for ruqu_rerank: project, encode, score, rerank.

use ruqu_rerank::prelude::*;
use std::f64::consts::PI;
use std::sync::Arc;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn toy_projector() -> Arc<FeatureProjector> {
    Arc::new(FeatureProjector::new(Projection::truncated_identity(4, 2, 0.0, 1.0).unwrap()).unwrap())
}

fn toy_corpus() -> Vec<CorpusDocument> {
    vec![
        CorpusDocument::new("d0", "zero", vec![0.0, 0.0, 0.3, 0.3]),
        CorpusDocument::new("d1", "quarter", vec![0.25, 0.25, 0.0, 0.0]),
        CorpusDocument::new("d2", "half", vec![0.5, 0.5, 0.0, 0.0]),
        CorpusDocument::new("d3", "three quarters", vec![0.75, 0.75, 0.0, 0.0]),
        CorpusDocument::new("d4", "one", vec![1.0, 1.0, 0.0, 0.0]),
    ]
}

fn toy_reranker(fusion: FusionPolicy) -> HybridReranker {
    let config = RerankConfig {
        fusion,
        ..RerankConfig::default()
    };
    let encoder = config.encoder(2).unwrap();
    let (store, _) = CorpusStateStore::build(toy_projector(), encoder, &toy_corpus()).unwrap();
    HybridReranker::new(SharedCorpus::new(store), config).unwrap()
}

fn all_candidates() -> Vec<Candidate> {
    toy_corpus()
        .iter()
        .map(|d| Candidate::new(d.id.clone(), 0.5))
        .collect()
}

// ---------------------------------------------------------------------------
// Golden path
// ---------------------------------------------------------------------------

#[test]
fn test_toy_embedding_projects_to_half_pi() {
    let features = toy_projector().project(&[0.5, 0.5, 0.5, 0.5]).unwrap();
    assert_eq!(features.len(), 2);
    for &a in features.angles() {
        assert!(approx_eq(a, PI / 2.0));
    }
}

#[test]
fn test_toy_embedding_encodes_to_uniform_state() {
    // RY(pi/2) on both qubits gives 1/2 everywhere; the CNOT only permutes
    // equal amplitudes.
    let features = toy_projector().project(&[0.5, 0.5, 0.5, 0.5]).unwrap();
    let state = StateEncoder::new(2).unwrap().encode(&features).unwrap();
    assert_eq!(state.amplitudes().len(), 4);
    for &a in state.amplitudes() {
        assert!(approx_eq(a, 0.5), "amplitude {}", a);
    }
    assert!(approx_eq(state.norm_sq(), 1.0));
}

#[test]
fn test_query_equal_to_document_scores_one() {
    let reranker = toy_reranker(FusionPolicy::QuantumOnly);
    let out = reranker
        .rerank(&[0.5, 0.5, 0.0, 0.0], &all_candidates(), 5)
        .unwrap();
    assert_eq!(out[0].id, "d2");
    assert!(approx_eq(out[0].fidelity, 1.0));
    assert!(approx_eq(out[0].score, 1.0));
}

#[test]
fn test_quantum_ranking_follows_angle_distance() {
    let reranker = toy_reranker(FusionPolicy::QuantumOnly);
    let out = reranker
        .rerank(&[0.3, 0.3, 0.0, 0.0], &all_candidates(), 5)
        .unwrap();
    let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2", "d0", "d3", "d4"]);
    for pair in out.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

// ---------------------------------------------------------------------------
// Fusion
// ---------------------------------------------------------------------------

#[test]
fn test_weighted_sum_blends_both_signals() {
    let reranker = toy_reranker(FusionPolicy::WeightedSum {
        classical: 0.5,
        quantum: 0.5,
    });
    let candidates = vec![Candidate::new("d4", 1.0), Candidate::new("d2", 0.0)];
    let out = reranker.rerank(&[0.5, 0.5, 0.0, 0.0], &candidates, 2).unwrap();
    for c in &out {
        let expected = 0.5 * c.classical_score as f64 + 0.5 * c.fidelity;
        assert!(approx_eq(c.score, expected));
    }
}

#[test]
fn test_classical_only_ignores_fidelity() {
    let reranker = toy_reranker(FusionPolicy::ClassicalOnly);
    let candidates = vec![
        Candidate::new("d4", 0.9),
        Candidate::new("d2", 0.1),
        Candidate::new("d0", 0.5),
    ];
    let out = reranker.rerank(&[0.5, 0.5, 0.0, 0.0], &candidates, 3).unwrap();
    let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["d4", "d0", "d2"]);
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn test_empty_shortlist_gives_empty_result() {
    let reranker = toy_reranker(FusionPolicy::default());
    let out = reranker.rerank(&[0.5, 0.5, 0.0, 0.0], &[], 5).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_all_candidates_missing() {
    let reranker = toy_reranker(FusionPolicy::default());
    let candidates = vec![Candidate::new("x", 0.9), Candidate::new("y", 0.8)];
    let outcome = reranker
        .rerank_with_report(&[0.5, 0.5, 0.0, 0.0], &candidates, 5)
        .unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.omitted, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn test_out_of_range_query_is_clamped() {
    let reranker = toy_reranker(FusionPolicy::QuantumOnly);
    let high = reranker
        .rerank(&[5.0, 5.0, 0.0, 0.0], &all_candidates(), 1)
        .unwrap();
    assert_eq!(high[0].id, "d4");
    assert!(approx_eq(high[0].fidelity, 1.0));

    let low = reranker
        .rerank(&[-3.0, -3.0, 0.0, 0.0], &all_candidates(), 1)
        .unwrap();
    assert_eq!(low[0].id, "d0");
}

#[test]
fn test_rerank_is_deterministic() {
    let reranker = toy_reranker(FusionPolicy::default());
    let a = reranker
        .rerank(&[0.4, 0.6, 0.0, 0.0], &all_candidates(), 5)
        .unwrap();
    let b = reranker
        .rerank(&[0.4, 0.6, 0.0, 0.0], &all_candidates(), 5)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_default_top_k_is_five() {
    let reranker = toy_reranker(FusionPolicy::default());
    let mut candidates = all_candidates();
    candidates.push(Candidate::new("missing", 0.1));
    let out = reranker
        .rerank_default(&[0.4, 0.6, 0.0, 0.0], &candidates)
        .unwrap();
    assert_eq!(out.len(), 5);
}

// ---------------------------------------------------------------------------
// Corpus swap
// ---------------------------------------------------------------------------

#[test]
fn test_swapped_corpus_is_used_by_next_query() {
    let reranker = toy_reranker(FusionPolicy::QuantumOnly);
    let replacement = vec![CorpusDocument::new("new", "fresh", vec![0.5, 0.5, 0.0, 0.0])];
    let encoder = StateEncoder::new(2).unwrap();
    let (store, _) = CorpusStateStore::build(toy_projector(), encoder, &replacement).unwrap();

    let previous = reranker.corpus().replace(store);
    assert_eq!(previous.len(), 5);

    let candidates = vec![Candidate::new("d2", 0.9), Candidate::new("new", 0.1)];
    let outcome = reranker
        .rerank_with_report(&[0.5, 0.5, 0.0, 0.0], &candidates, 5)
        .unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].id, "new");
    assert_eq!(outcome.omitted, vec!["d2".to_string()]);
}

#[test]
fn test_concurrent_queries_during_swap() {
    let reranker = toy_reranker(FusionPolicy::QuantumOnly);
    std::thread::scope(|s| {
        for _ in 0..4 {
            let r = &reranker;
            s.spawn(move || {
                for _ in 0..50 {
                    let out = r
                        .rerank(&[0.5, 0.5, 0.0, 0.0], &all_candidates(), 5)
                        .unwrap();
                    assert!(out.len() <= 5);
                    for c in &out {
                        assert!(c.fidelity >= 0.0 && c.fidelity <= 1.0);
                    }
                }
            });
        }
        s.spawn(|| {
            for _ in 0..10 {
                let encoder = StateEncoder::new(2).unwrap();
                let (store, _) =
                    CorpusStateStore::build(toy_projector(), encoder, &toy_corpus()).unwrap();
                reranker.corpus().replace(store);
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Full pipeline with the flat shortlist
// ---------------------------------------------------------------------------

struct FixedEmbedder;

impl EmbeddingProvider for FixedEmbedder {
    fn dimensions(&self) -> usize {
        4
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match text {
            "middle" => Ok(vec![0.5, 0.5, 0.0, 0.0]),
            "top" => Ok(vec![1.0, 1.0, 0.0, 0.0]),
            other => Err(RerankError::provider(format!("unknown query {:?}", other))),
        }
    }
}

#[test]
fn test_pipeline_over_flat_shortlist() {
    let shortlist = FlatShortlist::new(4);
    for doc in toy_corpus() {
        let mut v = doc.embedding.clone();
        ruqu_rerank::pipeline::l2_normalize(&mut v);
        shortlist.insert(doc.id, v).unwrap();
    }
    let pipeline =
        RetrievalPipeline::new(FixedEmbedder, shortlist, toy_reranker(FusionPolicy::QuantumOnly))
            .unwrap();

    let out = pipeline.query("top", 3).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].id, "d4");
    assert_eq!(out[0].text, "one");
    assert!(approx_eq(out[0].fidelity, 1.0));

    assert!(pipeline.query("nothing", 3).is_err());
}
