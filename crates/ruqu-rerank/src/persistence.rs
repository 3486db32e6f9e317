//! Projection and corpus snapshot persistence
//!
//! Both artifacts are plain serde values written as JSON (human-readable,
//! larger) or bincode (compact, faster). Loading validates everything the
//! scoring path relies on; it never re-encodes documents.

use crate::encoder::StateEncoder;
use crate::error::{RerankError, Result};
use crate::projection::{FeatureProjector, Projection};
use crate::state::Statevector;
use crate::store::{CorpusStateStore, DocumentRecord};
use crate::types::{DocumentId, FeatureVector};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Current on-disk snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File storage format for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageFormat {
    /// JSON format (human-readable, larger)
    Json,
    /// Bincode format (compact, faster)
    #[default]
    Bincode,
}

impl StorageFormat {
    /// Guess the format from a file extension (`.json` → JSON, else bincode).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StorageFormat::Json,
            _ => StorageFormat::Bincode,
        }
    }
}

/// One document as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: DocumentId,
    pub text: String,
    pub features: Vec<f64>,
    pub amplitudes: Vec<f64>,
}

/// Everything needed to serve queries without re-encoding the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub version: u32,
    pub projection: Projection,
    pub norm_tolerance: f64,
    pub records: Vec<SnapshotRecord>,
}

impl CorpusSnapshot {
    /// Capture a built store.
    pub fn from_store(store: &CorpusStateStore) -> Self {
        let records = store
            .records()
            .iter()
            .map(|r| SnapshotRecord {
                id: r.id.clone(),
                text: r.text.clone(),
                features: r.features.angles().to_vec(),
                amplitudes: r.state.amplitudes().to_vec(),
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            projection: store.projector().projection().clone(),
            norm_tolerance: store.encoder().norm_tolerance(),
            records,
        }
    }

    /// Validate and turn the snapshot back into a queryable store.
    pub fn into_store(self) -> Result<CorpusStateStore> {
        if self.version != SNAPSHOT_VERSION {
            return Err(RerankError::invalid_argument(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        let projector = Arc::new(FeatureProjector::new(self.projection)?);
        let num_qubits = projector.num_features();
        let encoder = StateEncoder::with_tolerance(num_qubits, self.norm_tolerance)?;

        let records = self
            .records
            .into_iter()
            .map(|r| {
                Ok(DocumentRecord {
                    features: FeatureVector::from_angles(r.features)?,
                    state: Statevector::from_amplitudes(r.amplitudes, num_qubits as u32)?,
                    id: r.id,
                    text: r.text,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        CorpusStateStore::from_records(projector, encoder, records)
    }

    pub fn save(&self, path: &Path, format: StorageFormat) -> Result<()> {
        write_value(path, self, format)?;
        info!(
            path = %path.display(),
            documents = self.records.len(),
            ?format,
            "corpus snapshot saved"
        );
        Ok(())
    }

    pub fn load(path: &Path, format: StorageFormat) -> Result<Self> {
        let snapshot: CorpusSnapshot = read_value(path, format)?;
        info!(
            path = %path.display(),
            documents = snapshot.records.len(),
            ?format,
            "corpus snapshot loaded"
        );
        Ok(snapshot)
    }
}

impl CorpusStateStore {
    /// Write this store as a snapshot.
    pub fn save(&self, path: &Path, format: StorageFormat) -> Result<()> {
        CorpusSnapshot::from_store(self).save(path, format)
    }

    /// Load and validate a snapshot written by [`CorpusStateStore::save`].
    pub fn load(path: &Path, format: StorageFormat) -> Result<Self> {
        CorpusSnapshot::load(path, format)?.into_store()
    }
}

impl Projection {
    pub fn save(&self, path: &Path, format: StorageFormat) -> Result<()> {
        self.validate()?;
        write_value(path, self, format)
    }

    /// Load a projection blob and validate it.
    pub fn load(path: &Path, format: StorageFormat) -> Result<Self> {
        let projection: Projection = read_value(path, format)?;
        projection.validate()?;
        Ok(projection)
    }
}

fn write_value<T: Serialize>(path: &Path, value: &T, format: StorageFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        StorageFormat::Json => serde_json::to_writer(&mut writer, value)?,
        StorageFormat::Bincode => {
            let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
            writer.write_all(&bytes)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn read_value<T: DeserializeOwned>(path: &Path, format: StorageFormat) -> Result<T> {
    let mut reader = BufReader::new(File::open(path)?);
    match format {
        StorageFormat::Json => Ok(serde_json::from_reader(reader)?),
        StorageFormat::Bincode => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            let (value, _) =
                bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
            Ok(value)
        }
    }
}
