//! Similarity service port (§6): the scan engine's sole external
//! collaborator for "how similar is this patent to this molecule". The core
//! never computes this itself — no fingerprinting, no model inference.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait SimilarityService: Send + Sync {
    /// Returns a score in `[0, 1]`. Implementations are expected to
    /// validate that range; the scan engine does not re-clamp it.
    async fn similarity(&self, patent_number: &str, molecule_id: &str) -> Result<f64>;
}
