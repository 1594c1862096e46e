//! Orchestrates one image through segmentation, classification and evaluation.

use std::sync::Arc;

use image::DynamicImage;
use inkcalc_vision::{
    normalize_symbol, resolve_symbol, segment, BoundingBox, ClassifyError, NormalizedTensor,
    ProcessClassifier, Symbol, SymbolClassifier,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SolverConfig;
use crate::expression::{assemble, evaluate, Number};

pub const NO_SYMBOLS_DETECTED: &str = "No symbols detected in image";

/// The single outcome of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub equation: Option<String>,
    pub result: Option<Number>,
    pub symbols_count: usize,
    pub boxes: Vec<BoundingBox>,
    pub error: Option<String>,
}

impl ResultRecord {
    pub fn no_symbols() -> Self {
        Self::failure(Vec::new(), NO_SYMBOLS_DETECTED)
    }

    /// A record with no equation or result. `boxes` keeps whatever was
    /// detected before the failure; no symbols were resolved.
    pub fn failure(boxes: Vec<BoundingBox>, error: impl Into<String>) -> Self {
        Self {
            equation: None,
            result: None,
            symbols_count: 0,
            boxes,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("classifier returned {got} labels for {expected} symbols")]
    LabelCount { expected: usize, got: usize },
    #[error("unknown class index {0}")]
    UnknownClass(usize),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Application-scoped solver state: build once at startup, share by reference.
#[derive(Clone)]
pub struct Solver {
    classifier: Arc<dyn SymbolClassifier>,
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver").finish_non_exhaustive()
    }
}

impl Solver {
    /// Builds a solver that classifies through a fresh worker process per request.
    ///
    /// # Errors
    /// Returns [`SolveError::ModelNotFound`] if the model file does not exist.
    pub fn new(config: &SolverConfig) -> Result<Self, SolveError> {
        if !config.model_path.is_file() {
            return Err(SolveError::ModelNotFound(config.model_path.display().to_string()));
        }
        info!(
            model = %config.model_path.display(),
            worker = %config.worker_program.display(),
            "solver ready"
        );
        Ok(Self::with_classifier(Arc::new(ProcessClassifier::new(
            &config.worker_program,
            &config.model_path,
            config.worker_timeout,
        ))))
    }

    pub fn with_classifier(classifier: Arc<dyn SymbolClassifier>) -> Self {
        Self { classifier }
    }

    /// Solves one image. Never fails: every error ends up in `error`.
    pub async fn solve(&self, image: DynamicImage) -> ResultRecord {
        match self.try_solve(image).await {
            Ok(record) => record,
            Err(Failure { boxes, error }) => {
                warn!("solve failed: {}", error);
                ResultRecord::failure(boxes, error.to_string())
            }
        }
    }

    async fn try_solve(&self, image: DynamicImage) -> Result<ResultRecord, Failure> {
        let (boxes, tensors) = tokio::task::spawn_blocking(move || prepare(&image))
            .await
            .map_err(|e| Failure::bare(SolveError::Internal(e.to_string())))?;

        if boxes.is_empty() {
            info!("no symbols detected");
            return Ok(ResultRecord::no_symbols());
        }

        let labels = match self.classifier.classify(&tensors).await {
            Ok(labels) => labels,
            Err(e) => return Err(Failure::with_boxes(boxes, e.into())),
        };
        let symbols = match resolve_symbols(&labels, &boxes) {
            Ok(symbols) => symbols,
            Err(e) => return Err(Failure::with_boxes(boxes, e)),
        };

        let equation = assemble(&symbols);
        let (result, error) = match evaluate(&equation) {
            Ok(value) => (Some(value), None),
            Err(e) => {
                debug!(equation = %equation, "evaluation failed: {}", e);
                (None, Some(e.to_string()))
            }
        };
        info!(equation = %equation, symbols = symbols.len(), "solved");

        Ok(ResultRecord {
            equation: Some(equation),
            result,
            symbols_count: symbols.len(),
            boxes,
            error,
        })
    }
}

struct Failure {
    boxes: Vec<BoundingBox>,
    error: SolveError,
}

impl Failure {
    fn bare(error: SolveError) -> Self {
        Self::with_boxes(Vec::new(), error)
    }

    fn with_boxes(boxes: Vec<BoundingBox>, error: SolveError) -> Self {
        Self { boxes, error }
    }
}

/// Segments the image and normalizes every region, keeping both lists aligned.
fn prepare(image: &DynamicImage) -> (Vec<BoundingBox>, Vec<NormalizedTensor>) {
    segment(image)
        .into_iter()
        .map(|region| (region.bounding_box, normalize_symbol(&region.crop)))
        .unzip()
}

fn resolve_symbols(labels: &[usize], boxes: &[BoundingBox]) -> Result<Vec<Symbol>, SolveError> {
    if labels.len() != boxes.len() {
        return Err(SolveError::LabelCount {
            expected: boxes.len(),
            got: labels.len(),
        });
    }
    labels
        .iter()
        .zip(boxes)
        .map(|(&label, &bbox)| resolve_symbol(label, bbox).ok_or(SolveError::UnknownClass(label)))
        .collect()
}
