use std::path::Path;

use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

/// Builds a CPU session that never spawns extra runtime threads.
///
/// The worker runs one sample at a time; pinning both thread pools to a single
/// thread and disabling parallel execution must happen before the model is
/// committed, not after.
pub(super) fn single_threaded(model_path: &Path) -> ort::Result<Session> {
    Session::builder()?
        .with_execution_providers([CPUExecutionProvider::default().build()])?
        .with_optimization_level(GraphOptimizationLevel::Level1)?
        .with_intra_threads(1)?
        .with_inter_threads(1)?
        .with_parallel_execution(false)?
        .commit_from_file(model_path)
}
