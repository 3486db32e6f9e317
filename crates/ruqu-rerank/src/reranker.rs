//! Hybrid reranking: classical shortlist + statevector fidelity
//!
//! The query is projected and encoded once; each shortlisted document's
//! precomputed state is looked up and compared against it. Candidates the
//! store does not know are dropped, never fatal. Output order is fully
//! determined by (fused score, fidelity, classical rank).

use crate::config::RerankConfig;
use crate::error::{RerankError, Result};
use crate::fidelity::fidelity;
use crate::shared::SharedCorpus;
use crate::types::{Candidate, DocumentId, ScoredCandidate};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Result of one rerank call with the ids that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    pub results: Vec<ScoredCandidate>,
    /// Shortlisted ids absent from the corpus store, in shortlist order
    pub omitted: Vec<DocumentId>,
}

/// Reranks classical shortlists against the live corpus.
#[derive(Debug, Clone)]
pub struct HybridReranker {
    corpus: SharedCorpus,
    config: RerankConfig,
}

impl HybridReranker {
    /// The installed store must have been encoded with `config.norm_tolerance`.
    /// Stores installed later through [`SharedCorpus::replace`] bring their
    /// own encoder; drift is always judged by the store's tolerance.
    pub fn new(corpus: SharedCorpus, config: RerankConfig) -> Result<Self> {
        config.validate()?;
        let store_tolerance = corpus.current().encoder().norm_tolerance();
        if store_tolerance != config.norm_tolerance {
            return Err(RerankError::config(
                "norm_tolerance",
                format!(
                    "config has {} but the corpus store was encoded with {}",
                    config.norm_tolerance, store_tolerance
                ),
            ));
        }
        Ok(Self { corpus, config })
    }

    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    pub fn corpus(&self) -> &SharedCorpus {
        &self.corpus
    }

    /// Rerank `candidates` and keep the best `top_k`.
    pub fn rerank(
        &self,
        query_embedding: &[f32],
        candidates: &[Candidate],
        top_k: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        Ok(self
            .rerank_with_report(query_embedding, candidates, top_k)?
            .results)
    }

    /// [`HybridReranker::rerank`] with the configured `top_k`.
    pub fn rerank_default(
        &self,
        query_embedding: &[f32],
        candidates: &[Candidate],
    ) -> Result<Vec<ScoredCandidate>> {
        self.rerank(query_embedding, candidates, self.config.top_k)
    }

    /// Rerank and also report which candidates were dropped.
    #[instrument(skip(self, query_embedding, candidates), fields(candidates = candidates.len()))]
    pub fn rerank_with_report(
        &self,
        query_embedding: &[f32],
        candidates: &[Candidate],
        top_k: usize,
    ) -> Result<RerankOutcome> {
        if top_k == 0 {
            return Err(RerankError::invalid_argument("top_k must be > 0"));
        }
        if let Some((rank, c)) = candidates
            .iter()
            .enumerate()
            .find(|(_, c)| !c.classical_score.is_finite())
        {
            return Err(RerankError::invalid_argument(format!(
                "candidate {} at rank {} has non-finite classical score {}",
                c.id, rank, c.classical_score
            )));
        }

        // One snapshot for the whole call; a concurrent swap cannot split it.
        let store = self.corpus.current();
        let (_, query_state) = store.encode_query(query_embedding)?;

        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        let mut omitted = Vec::new();
        let mut results = Vec::with_capacity(candidates.len());

        for (rank, candidate) in candidates.iter().enumerate() {
            if !seen.insert(candidate.id.as_str()) {
                debug!(id = %candidate.id, rank, "duplicate shortlist entry skipped");
                continue;
            }
            let doc_state = match store.lookup(&candidate.id) {
                Ok(state) => state,
                Err(RerankError::NotFound(id)) => {
                    debug!(id = %id, rank, "candidate missing from corpus store, dropped");
                    omitted.push(id);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let fid = fidelity(&query_state, doc_state)?;
            results.push(ScoredCandidate {
                id: candidate.id.clone(),
                classical_score: candidate.classical_score,
                fidelity: fid,
                score: self.config.fusion.fuse(candidate.classical_score, fid),
                classical_rank: rank,
            });
        }

        results.sort_by(ranking_order);
        results.truncate(top_k);

        debug!(
            returned = results.len(),
            omitted = omitted.len(),
            "rerank complete"
        );
        Ok(RerankOutcome { results, omitted })
    }
}

/// Descending fused score, then descending fidelity, then classical rank.
pub fn ranking_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.fidelity.total_cmp(&a.fidelity))
        .then_with(|| a.classical_rank.cmp(&b.classical_rank))
}
