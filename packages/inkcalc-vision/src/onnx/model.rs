use std::path::Path;

use ndarray::{Array4, ArrayView3, Axis};
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use super::session;
use crate::engine::ClassifyError;
use crate::labels::CLASSES;

/// The symbol classifier loaded into an ONNX Runtime session.
///
/// Expects NHWC input `[1, 32, 32, 1]` and produces one score per entry of
/// [`CLASSES`].
pub struct OnnxSymbolModel {
    session: Session,
    input_name: String,
}

impl std::fmt::Debug for OnnxSymbolModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSymbolModel")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OnnxSymbolModel {
    pub fn load(model_path: &Path) -> Result<Self, ClassifyError> {
        if !model_path.is_file() {
            return Err(ClassifyError::ModelLoad(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }

        info!("Loading symbol classifier from {}", model_path.display());
        let session = session::single_threaded(model_path)
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ClassifyError::ModelLoad("model declares no inputs".to_string()))?;
        debug!(input = %input_name, "symbol classifier ready");

        Ok(Self {
            session,
            input_name,
        })
    }

    /// Classifies one `[32, 32, 1]` sample and returns the arg-max class index.
    pub fn predict(&mut self, sample: ArrayView3<'_, f32>) -> Result<usize, String> {
        let input = Value::from_array(sample.insert_axis(Axis(0)).to_owned())
            .map_err(|e| e.to_string())?;
        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input])
            .map_err(|e| e.to_string())?;
        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| e.to_string())?;

        if scores.len() != CLASSES.len() {
            return Err(format!(
                "expected {} class scores, got {}",
                CLASSES.len(),
                scores.len()
            ));
        }
        argmax(scores.iter().copied()).ok_or_else(|| "empty model output".to_string())
    }

    /// Classifies every sample of `batch` in order, one call per sample.
    /// The first failing sample fails the whole batch.
    pub fn classify_batch(&mut self, batch: &Array4<f32>) -> Result<Vec<usize>, ClassifyError> {
        batch
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(index, sample)| {
                self.predict(sample)
                    .map_err(|message| ClassifyError::Prediction { index, message })
            })
            .collect()
    }
}

/// Index of the first maximum, or `None` for an empty sequence.
pub fn argmax(scores: impl IntoIterator<Item = f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, score) in scores.into_iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}
