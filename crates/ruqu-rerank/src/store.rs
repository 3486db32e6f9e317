//! Precomputed statevectors for every stored document
//!
//! The store is built once per corpus and never mutated afterwards. It keeps
//! the projector and encoder it was built with, so any query scored against
//! it is projected with the same basis and encoded on the same register.

use crate::encoder::StateEncoder;
use crate::error::{RerankError, Result};
use crate::projection::FeatureProjector;
use crate::state::Statevector;
use crate::types::{DocumentId, FeatureVector};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A document handed to [`CorpusStateStore::build`].
#[derive(Debug, Clone)]
pub struct CorpusDocument {
    pub id: DocumentId,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl CorpusDocument {
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
        }
    }
}

/// A stored document with its encoded state.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub text: String,
    /// Rotation angles the state was encoded from (kept for diagnostics)
    pub features: FeatureVector,
    pub state: Statevector,
}

/// Summary of a bulk build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub documents: usize,
    /// Records whose norm deviation exceeded the encoder tolerance
    pub drifted: usize,
    pub elapsed: Duration,
}

/// Immutable id → statevector store.
#[derive(Debug, Clone)]
pub struct CorpusStateStore {
    projector: Arc<FeatureProjector>,
    encoder: StateEncoder,
    records: Vec<DocumentRecord>,
    index: HashMap<DocumentId, usize>,
}

impl CorpusStateStore {
    /// Project and encode every document.
    ///
    /// Documents are encoded independently (in parallel with the `parallel`
    /// feature) and the store is assembled only after all of them succeed.
    /// Building twice from the same inputs yields identical records.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn build(
        projector: Arc<FeatureProjector>,
        encoder: StateEncoder,
        documents: &[CorpusDocument],
    ) -> Result<(Self, BuildReport)> {
        let start = Instant::now();
        check_compatible(&projector, &encoder)?;
        ensure_unique(documents.iter().map(|d| &d.id))?;

        let encode_one = |doc: &CorpusDocument| -> Result<DocumentRecord> {
            let features = projector.project(&doc.embedding)?;
            let state = encoder.encode(&features)?;
            Ok(DocumentRecord {
                id: doc.id.clone(),
                text: doc.text.clone(),
                features,
                state,
            })
        };

        #[cfg(feature = "parallel")]
        let records: Vec<DocumentRecord> = documents
            .par_iter()
            .map(encode_one)
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let records: Vec<DocumentRecord> = documents
            .iter()
            .map(encode_one)
            .collect::<Result<Vec<_>>>()?;

        let drifted = records
            .iter()
            .filter(|r| !encoder.is_within_tolerance(r.state.norm_deviation()))
            .count();

        let store = Self::assemble(projector, encoder, records);
        let report = BuildReport {
            documents: store.len(),
            drifted,
            elapsed: start.elapsed(),
        };
        info!(
            documents = report.documents,
            drifted = report.drifted,
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "corpus state store built"
        );
        Ok((store, report))
    }

    /// Reassemble a store from already-encoded records (snapshot load).
    ///
    /// Each record must match the encoder's register size; ids must be unique.
    pub fn from_records(
        projector: Arc<FeatureProjector>,
        encoder: StateEncoder,
        records: Vec<DocumentRecord>,
    ) -> Result<Self> {
        check_compatible(&projector, &encoder)?;
        ensure_unique(records.iter().map(|r| &r.id))?;

        let expected = 1usize << encoder.num_qubits();
        for record in &records {
            if record.state.num_amplitudes() != expected {
                return Err(RerankError::dimension(
                    "stored statevector",
                    expected,
                    record.state.num_amplitudes(),
                ));
            }
            if record.features.len() != encoder.num_qubits() {
                return Err(RerankError::dimension(
                    "stored feature vector",
                    encoder.num_qubits(),
                    record.features.len(),
                ));
            }
            if !encoder.is_within_tolerance(record.state.norm_deviation()) {
                warn!(
                    id = %record.id,
                    deviation = record.state.norm_deviation(),
                    "numerical drift: stored statevector is not unit-norm"
                );
            }
        }
        Ok(Self::assemble(projector, encoder, records))
    }

    fn assemble(
        projector: Arc<FeatureProjector>,
        encoder: StateEncoder,
        records: Vec<DocumentRecord>,
    ) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self {
            projector,
            encoder,
            records,
            index,
        }
    }

    /// Statevector for `id`, or [`RerankError::NotFound`].
    pub fn lookup(&self, id: &str) -> Result<&Statevector> {
        self.record(id).map(|r| &r.state)
    }

    /// Full record for `id`, or [`RerankError::NotFound`].
    pub fn record(&self, id: &str) -> Result<&DocumentRecord> {
        self.index
            .get(id)
            .map(|&i| &self.records[i])
            .ok_or_else(|| RerankError::NotFound(id.to_string()))
    }

    /// Lazily iterate `(id, statevector)` pairs in build order.
    pub fn all(&self) -> impl Iterator<Item = (&DocumentId, &Statevector)> + '_ {
        self.records.iter().map(|r| (&r.id, &r.state))
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn num_qubits(&self) -> usize {
        self.encoder.num_qubits()
    }

    pub fn projector(&self) -> &Arc<FeatureProjector> {
        &self.projector
    }

    pub fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    /// Project and encode a query with this store's projector and encoder.
    pub fn encode_query(&self, embedding: &[f32]) -> Result<(FeatureVector, Statevector)> {
        let features = self.projector.project(embedding)?;
        let state = self.encoder.encode(&features)?;
        Ok((features, state))
    }
}

fn check_compatible(projector: &FeatureProjector, encoder: &StateEncoder) -> Result<()> {
    if projector.num_features() != encoder.num_qubits() {
        return Err(RerankError::dimension(
            "encoder qubits vs projection components",
            projector.num_features(),
            encoder.num_qubits(),
        ));
    }
    Ok(())
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a DocumentId>) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RerankError::DuplicateDocument(id.clone()));
        }
    }
    Ok(())
}
