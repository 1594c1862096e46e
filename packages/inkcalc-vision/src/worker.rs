//! The body of the classification worker process.

use std::path::Path;

use tracing::info;

use crate::engine::ClassifyError;
use crate::onnx::OnnxSymbolModel;
use crate::protocol::{read_batch, WorkerResponse};

/// Loads the model, then the batch, then classifies sample by sample.
///
/// The model is loaded fresh on every call; nothing survives between runs.
pub fn classify_file(model_path: &Path, data_path: &Path) -> Result<Vec<usize>, ClassifyError> {
    let mut model = OnnxSymbolModel::load(model_path)?;
    let batch = read_batch(data_path)?;
    info!(samples = batch.len_of(ndarray::Axis(0)), "classifying batch");
    model.classify_batch(&batch)
}

pub fn run(model_path: &Path, data_path: &Path) -> WorkerResponse {
    classify_file(model_path, data_path).into()
}
