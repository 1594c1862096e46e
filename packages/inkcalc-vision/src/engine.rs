use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::normalize::NormalizedTensor;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Failed to load data: {0}")]
    DataLoad(String),
    #[error("Prediction failed at symbol {index}: {message}")]
    Prediction { index: usize, message: String },
    /// Failure message reported by the worker process itself.
    #[error("{0}")]
    Worker(String),
    #[error("failed to spawn worker: {0}")]
    Spawn(String),
    #[error("worker timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("worker exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("malformed worker output: {0}")]
    MalformedOutput(String),
}

/// Maps an ordered batch of normalized symbols to class indices, one per symbol.
///
/// Implementations must return exactly `batch.len()` indices in input order,
/// or a single error for the whole batch.
#[async_trait]
pub trait SymbolClassifier: Send + Sync {
    async fn classify(&self, batch: &[NormalizedTensor]) -> Result<Vec<usize>, ClassifyError>;
}
