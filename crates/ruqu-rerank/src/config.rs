//! Reranker configuration.
//!
//! [`RerankConfig`] collects the fixed knobs of the hybrid reranker: the
//! fusion policy, how many classical candidates are rescored, how many are
//! returned, and the norm tolerance used to flag numerical drift. It is
//! serializable so deployments can pin the values next to their corpus
//! snapshot.
//!
//! # Example
//!
//! ```rust
//! use ruqu_rerank::config::RerankConfig;
//!
//! let cfg = RerankConfig::default();
//! cfg.validate().expect("default config is valid");
//! assert_eq!(cfg.shortlist_size, 20);
//! assert_eq!(cfg.top_k, 5);
//! ```

use crate::encoder::{StateEncoder, DEFAULT_NORM_TOLERANCE};
use crate::error::{RerankError, Result};
use crate::fusion::FusionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of classical candidates rescored per query.
pub const DEFAULT_SHORTLIST_SIZE: usize = 20;
/// Default number of passages returned.
pub const DEFAULT_TOP_K: usize = 5;

/// Complete configuration for the hybrid reranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Score fusion policy. Default: weighted sum, 0.3 classical / 0.7 quantum.
    pub fusion: FusionPolicy,

    /// Candidates requested from the ANN shortlist. Default: **20**.
    pub shortlist_size: usize,

    /// Passages returned when the caller does not specify. Default: **5**.
    pub top_k: usize,

    /// Allowed `|norm² - 1|` after encoding. Default: **1e-6**.
    pub norm_tolerance: f64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            fusion: FusionPolicy::default(),
            shortlist_size: DEFAULT_SHORTLIST_SIZE,
            top_k: DEFAULT_TOP_K,
            norm_tolerance: DEFAULT_NORM_TOLERANCE,
        }
    }
}

impl RerankConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let cfg: RerankConfig = serde_json::from_str(&contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this configuration as pretty-printed JSON, creating parent
    /// directories if necessary.
    pub fn to_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Encoder for a `num_qubits` register using this config's tolerance.
    pub fn encoder(&self, num_qubits: usize) -> Result<StateEncoder> {
        StateEncoder::with_tolerance(num_qubits, self.norm_tolerance)
    }

    /// Validate all fields and return the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.fusion.validate()?;
        if self.shortlist_size == 0 {
            return Err(RerankError::config("shortlist_size", "must be > 0"));
        }
        if self.top_k == 0 {
            return Err(RerankError::config("top_k", "must be > 0"));
        }
        if !self.norm_tolerance.is_finite() || self.norm_tolerance <= 0.0 {
            return Err(RerankError::config(
                "norm_tolerance",
                "must be finite and > 0",
            ));
        }
        Ok(())
    }
}
