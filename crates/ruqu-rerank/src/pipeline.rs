//! End-to-end retrieval: embed, shortlist, rerank

use crate::error::{RerankError, Result};
use crate::provider::{EmbeddingProvider, ShortlistProvider};
use crate::reranker::HybridReranker;
use crate::types::DocumentId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A reranked passage with its text attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPassage {
    pub id: DocumentId,
    pub text: String,
    pub classical_score: f32,
    pub fidelity: f64,
    pub score: f64,
}

/// Glues an embedding model, a shortlist index and the reranker together.
pub struct RetrievalPipeline<E, S> {
    embedder: E,
    shortlist: S,
    reranker: HybridReranker,
}

impl<E: EmbeddingProvider, S: ShortlistProvider> RetrievalPipeline<E, S> {
    pub fn new(embedder: E, shortlist: S, reranker: HybridReranker) -> Result<Self> {
        let expected = reranker.corpus().current().projector().input_dim();
        if embedder.dimensions() != expected {
            return Err(RerankError::dimension(
                "embedding provider",
                expected,
                embedder.dimensions(),
            ));
        }
        Ok(Self {
            embedder,
            shortlist,
            reranker,
        })
    }

    pub fn reranker(&self) -> &HybridReranker {
        &self.reranker
    }

    pub fn shortlist(&self) -> &S {
        &self.shortlist
    }

    /// Answer `text` with at most `top_k` passages.
    ///
    /// The shortlist sees the L2-normalised embedding; the reranker sees the
    /// raw one, matching how the projection was fitted.
    #[instrument(skip(self, text), fields(query_len = text.len()))]
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<RankedPassage>> {
        let embedding = self.embedder.embed(text)?;

        let mut normalized = embedding.clone();
        l2_normalize(&mut normalized);
        let shortlist_size = self.reranker.config().shortlist_size;
        let candidates = self.shortlist.search(&normalized, shortlist_size)?;
        debug!(shortlisted = candidates.len(), "shortlist retrieved");

        // Text lookup uses the same snapshot the reranker scored against.
        let store = self.reranker.corpus().current();
        let scored = self.reranker.rerank(&embedding, &candidates, top_k)?;

        scored
            .into_iter()
            .filter_map(|c| match store.record(&c.id) {
                Ok(record) => Some(Ok(RankedPassage {
                    text: record.text.clone(),
                    id: c.id,
                    classical_score: c.classical_score,
                    fidelity: c.fidelity,
                    score: c.score,
                })),
                // Swapped out between scoring and lookup.
                Err(RerankError::NotFound(_)) => None,
                Err(e) => Some(Err(e)),
            })
            .collect()
    }
}

/// Scale `v` to unit length in place; a zero vector is left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
