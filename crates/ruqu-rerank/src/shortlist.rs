//! Flat (brute-force) cosine shortlist for small corpora and tests

use crate::error::{RerankError, Result};
use crate::provider::ShortlistProvider;
use crate::types::{Candidate, DocumentId};
use dashmap::DashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Flat index scoring every stored vector by cosine similarity
pub struct FlatShortlist {
    vectors: DashMap<DocumentId, Vec<f32>>,
    dimensions: usize,
}

impl FlatShortlist {
    /// Create a new flat shortlist for `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            vectors: DashMap::new(),
            dimensions,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Add or replace a vector
    pub fn insert(&self, id: impl Into<DocumentId>, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(RerankError::dimension(
                "shortlist vector",
                self.dimensions,
                vector.len(),
            ));
        }
        self.vectors.insert(id.into(), vector);
        Ok(())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.vectors.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl ShortlistProvider for FlatShortlist {
    fn search(&self, query: &[f32], n: usize) -> Result<Vec<Candidate>> {
        if query.len() != self.dimensions {
            return Err(RerankError::dimension(
                "shortlist query",
                self.dimensions,
                query.len(),
            ));
        }

        // Similarity calculation - parallel with the `parallel` feature
        #[cfg(feature = "parallel")]
        let mut results: Vec<Candidate> = self
            .vectors
            .iter()
            .par_bridge()
            .map(|entry| Candidate::new(entry.key().clone(), cosine_similarity(query, entry.value())))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let mut results: Vec<Candidate> = self
            .vectors
            .iter()
            .map(|entry| Candidate::new(entry.key().clone(), cosine_similarity(query, entry.value())))
            .collect();

        // Sort by similarity (descending), ids break ties, take top n
        results.sort_by(|a, b| {
            b.classical_score
                .total_cmp(&a.classical_score)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(n);
        Ok(results)
    }
}

/// Cosine similarity between two vectors; 0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-12 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_shortlist() -> Result<()> {
        let index = FlatShortlist::new(3);

        index.insert("v1", vec![1.0, 0.0, 0.0])?;
        index.insert("v2", vec![0.0, 1.0, 0.0])?;
        index.insert("v3", vec![0.7, 0.7, 0.0])?;

        let results = index.search(&[1.0, 0.0, 0.0], 2)?;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "v1");
        assert!((results[0].classical_score - 1.0).abs() < 1e-6);
        assert_eq!(results[1].id, "v3");

        Ok(())
    }

    #[test]
    fn test_ties_ordered_by_id() -> Result<()> {
        let index = FlatShortlist::new(2);
        index.insert("b", vec![1.0, 0.0])?;
        index.insert("a", vec![2.0, 0.0])?;
        let results = index.search(&[1.0, 0.0], 10)?;
        let ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_dimension_checks() {
        let index = FlatShortlist::new(2);
        assert!(index.insert("x", vec![1.0]).is_err());
        assert!(index.search(&[1.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_remove() -> Result<()> {
        let index = FlatShortlist::new(2);
        index.insert("x", vec![1.0, 0.0])?;
        assert!(index.remove("x"));
        assert!(!index.remove("x"));
        assert!(index.is_empty());
        Ok(())
    }

    #[test]
    fn test_zero_vector_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
