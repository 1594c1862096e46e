//! Runs classification in a disposable child process per request.
//!
//! Each call writes the batch to its own temporary file, starts a fresh worker
//! which loads its own copy of the model, and waits for it under a timeout.
//! A crash inside the numeric runtime only takes the child down.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::engine::{ClassifyError, SymbolClassifier};
use crate::labels::CLASSES;
use crate::normalize::{stack, NormalizedTensor};
use crate::protocol::{write_batch, WorkerResponse};

/// Environment applied to every worker so math libraries stay single-threaded.
const SINGLE_THREAD_ENV: [(&str, &str); 2] = [("OMP_NUM_THREADS", "1"), ("MKL_NUM_THREADS", "1")];

#[derive(Debug, Clone)]
pub struct ProcessClassifier {
    program: PathBuf,
    model_path: PathBuf,
    timeout: Duration,
}

impl ProcessClassifier {
    pub fn new(program: impl Into<PathBuf>, model_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            model_path: model_path.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

#[async_trait]
impl SymbolClassifier for ProcessClassifier {
    async fn classify(&self, batch: &[NormalizedTensor]) -> Result<Vec<usize>, ClassifyError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let data_file = tempfile::Builder::new()
            .prefix("inkcalc-batch-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| ClassifyError::DataLoad(e.to_string()))?;
        write_batch(data_file.as_file(), &stack(batch))?;

        debug!(
            program = %self.program.display(),
            samples = batch.len(),
            "spawning classification worker"
        );
        let child = Command::new(&self.program)
            .arg(&self.model_path)
            .arg(data_file.path())
            .envs(SINGLE_THREAD_ENV)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ClassifyError::Spawn(format!("{}: {}", self.program.display(), e)))?;

        // On timeout the child handle is dropped, which kills the process.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ClassifyError::Timeout(self.timeout))?
            .map_err(|e| ClassifyError::Spawn(e.to_string()))?;

        let labels = interpret_output(&output, batch.len());
        if let Err(e) = &labels {
            warn!("classification worker failed: {}", e);
        }
        labels
    }
}

/// Turns the worker's exit status and stdout into labels or a failure.
fn interpret_output(output: &Output, expected: usize) -> Result<Vec<usize>, ClassifyError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed = serde_json::from_str::<WorkerResponse>(stdout.trim());

    match parsed {
        Ok(WorkerResponse::Failure { error }) => Err(ClassifyError::Worker(error)),
        Ok(WorkerResponse::Labels(_)) | Err(_) if !output.status.success() => Err(ClassifyError::Exit {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        Ok(WorkerResponse::Labels(labels)) => {
            if labels.len() != expected {
                return Err(ClassifyError::MalformedOutput(format!(
                    "expected {} labels, got {}",
                    expected,
                    labels.len()
                )));
            }
            if let Some(bad) = labels.iter().find(|&&l| l >= CLASSES.len()) {
                return Err(ClassifyError::MalformedOutput(format!(
                    "class index {} out of range",
                    bad
                )));
            }
            Ok(labels)
        }
        Err(e) => Err(ClassifyError::MalformedOutput(e.to_string())),
    }
}
