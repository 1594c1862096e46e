//! Runtime settings for the solver.
use std::path::PathBuf;
use std::time::Duration;

/// Name of the classification worker binary shipped alongside `inkcalc`.
pub const WORKER_BIN: &str = "inkcalc-worker";

pub const DEFAULT_MODEL_PATH: &str = "model.onnx";

pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "inkcalc=info,inkcalc_vision=info"
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// ONNX export of the symbol classifier.
    pub model_path: PathBuf,
    /// Program started once per request to classify a batch.
    pub worker_program: PathBuf,
    /// Upper bound on one worker run, model load included.
    pub worker_timeout: Duration,
}

impl SolverConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            worker_program: default_worker_program(),
            worker_timeout: DEFAULT_WORKER_TIMEOUT,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

/// `inkcalc-worker` next to the running executable, falling back to a `PATH` lookup.
pub fn default_worker_program() -> PathBuf {
    let file_name = format!("{}{}", WORKER_BIN, std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}
