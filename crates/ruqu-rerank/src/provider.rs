//! Seams to the external collaborators: embedding model and ANN index

use crate::error::Result;
use crate::types::Candidate;

/// Turns text into a fixed-dimension embedding.
pub trait EmbeddingProvider: Send + Sync {
    /// Output dimensionality `D`
    fn dimensions(&self) -> usize;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Classical nearest-neighbour shortlist.
pub trait ShortlistProvider: Send + Sync {
    /// Return at most `n` candidates, best first.
    fn search(&self, query: &[f32], n: usize) -> Result<Vec<Candidate>>;
}
