//! # ruqu-rerank -- Fidelity Reranking for Retrieval
//!
//! Reranks a classical nearest-neighbour shortlist by the overlap between
//! small real-amplitude statevectors. Embeddings are projected to `Q` angles,
//! encoded by an RY layer plus a CNOT chain, and compared with
//! `|<psi_q|psi_d>|^2`. Document states are computed once and served from an
//! immutable store that can be swapped while queries run.
//!
//! ## Quick Start
//!
//! ```
//! use ruqu_rerank::prelude::*;
//! use std::sync::Arc;
//!
//! let projection = Projection::truncated_identity(4, 2, 0.0, 1.0).unwrap();
//! let projector = Arc::new(FeatureProjector::new(projection).unwrap());
//! let docs = vec![
//!     CorpusDocument::new("a", "alpha", vec![0.9, 0.1, 0.0, 0.0]),
//!     CorpusDocument::new("b", "beta", vec![0.1, 0.9, 0.0, 0.0]),
//! ];
//! let config = RerankConfig::default();
//! let (store, _) =
//!     CorpusStateStore::build(projector, config.encoder(2).unwrap(), &docs).unwrap();
//! let reranker = HybridReranker::new(SharedCorpus::new(store), config).unwrap();
//!
//! let shortlist = vec![Candidate::new("b", 0.8), Candidate::new("a", 0.7)];
//! let ranked = reranker.rerank(&[0.85, 0.15, 0.0, 0.0], &shortlist, 2).unwrap();
//! assert_eq!(ranked[0].id, "a");
//! ```

// -- Simulation layer --
pub mod circuit;
pub mod error;
pub mod fidelity;
pub mod gate;
pub mod state;
pub mod types;

// -- Encoding --
pub mod encoder;
pub mod fit;
pub mod projection;

// -- Corpus and scoring --
pub mod config;
pub mod fusion;
pub mod persistence;
pub mod reranker;
pub mod shared;
pub mod store;

// -- Retrieval plumbing --
pub mod pipeline;
pub mod provider;
pub mod shortlist;

/// Qubit count used when nothing else is configured.
pub const DEFAULT_NUM_QUBITS: usize = 6;

/// Re-exports of the most commonly used items.
pub mod prelude {
    pub use crate::config::RerankConfig;
    pub use crate::encoder::StateEncoder;
    pub use crate::error::{RerankError, Result};
    pub use crate::fidelity::fidelity;
    pub use crate::fit::{ProjectionFit, ProjectionFitter};
    pub use crate::fusion::FusionPolicy;
    pub use crate::persistence::StorageFormat;
    pub use crate::pipeline::{RankedPassage, RetrievalPipeline};
    pub use crate::projection::{FeatureProjector, Projection};
    pub use crate::provider::{EmbeddingProvider, ShortlistProvider};
    pub use crate::reranker::HybridReranker;
    pub use crate::shared::SharedCorpus;
    pub use crate::shortlist::FlatShortlist;
    pub use crate::state::Statevector;
    pub use crate::store::{CorpusDocument, CorpusStateStore};
    pub use crate::types::*;
}
