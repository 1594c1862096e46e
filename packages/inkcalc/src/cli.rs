//! Command line arguments backing the `inkcalc` binary.
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use inkcalc::config::{default_worker_program, SolverConfig, DEFAULT_MODEL_PATH};

#[derive(Parser, Debug)]
#[command(
  name = "inkcalc",
  about = "Solve a handwritten arithmetic expression from an image",
  version
)]
pub struct Args {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Recognize and evaluate the expression in an image
  Solve {
    /// Image file (PNG, JPEG, ...)
    image: PathBuf,

    #[command(flatten)]
    solver: SolverArgs,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
  },
  /// Print the symbol boxes found in an image
  Segment {
    /// Image file (PNG, JPEG, ...)
    image: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
  },
  /// Evaluate an expression string without any image processing
  Eval {
    /// Expression such as "12+3=?" or "6÷2"
    expression: String,
  },
}

#[derive(clap::Args, Debug)]
pub struct SolverArgs {
  /// Path to the ONNX symbol classifier
  #[arg(long, short = 'm', env = "INKCALC_MODEL", default_value = DEFAULT_MODEL_PATH)]
  pub model: PathBuf,

  /// Classification worker program (defaults to inkcalc-worker beside this binary)
  #[arg(long, env = "INKCALC_WORKER")]
  pub worker: Option<PathBuf>,

  /// Seconds a worker may run before the request fails
  #[arg(long, env = "INKCALC_WORKER_TIMEOUT", default_value = "30")]
  pub timeout_secs: u64,
}

impl SolverArgs {
  pub fn to_config(&self) -> SolverConfig {
    SolverConfig {
      model_path: self.model.clone(),
      worker_program: self.worker.clone().unwrap_or_else(default_worker_program),
      worker_timeout: Duration::from_secs(self.timeout_secs),
    }
  }
}
