//! Wire format shared by the classifier process and its caller.
//!
//! The caller writes the batch as JSON (ndarray's serde layout) to a file and
//! passes `<model path> <batch path>` to the worker. The worker prints one JSON
//! document on stdout: an array of class indices, or `{"error": "..."}`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::engine::ClassifyError;
use crate::normalize::SYMBOL_SIZE;

/// Reported when the worker is started without both positional arguments.
pub const MISSING_ARGUMENTS: &str = "Missing arguments: model_path data_file";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerResponse {
    Labels(Vec<usize>),
    Failure { error: String },
}

impl WorkerResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            // Only reachable if serde_json itself misbehaves; keep the stdout contract.
            Err(e) => format!(r#"{{"error":"failed to encode response: {}"}}"#, e),
        }
    }
}

impl From<Result<Vec<usize>, ClassifyError>> for WorkerResponse {
    fn from(result: Result<Vec<usize>, ClassifyError>) -> Self {
        match result {
            Ok(labels) => Self::Labels(labels),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

pub fn write_batch(writer: impl Write, batch: &Array4<f32>) -> Result<(), ClassifyError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, batch).map_err(|e| ClassifyError::DataLoad(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| ClassifyError::DataLoad(e.to_string()))
}

/// Reads a batch file and checks it holds `[n, 32, 32, 1]` samples.
pub fn read_batch(path: &Path) -> Result<Array4<f32>, ClassifyError> {
    let file = File::open(path)
        .map_err(|e| ClassifyError::DataLoad(format!("{}: {}", path.display(), e)))?;
    let batch: Array4<f32> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ClassifyError::DataLoad(e.to_string()))?;

    let size = SYMBOL_SIZE as usize;
    let shape = batch.shape();
    if shape[1..] != [size, size, 1] {
        return Err(ClassifyError::DataLoad(format!(
            "expected samples of shape [{size}, {size}, 1], got {:?}",
            &shape[1..]
        )));
    }
    Ok(batch)
}
