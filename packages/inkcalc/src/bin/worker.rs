//! `inkcalc-worker <MODEL_PATH> <DATA_PATH>`
//!
//! Classifies one serialized batch and exits. Prints a JSON array of class
//! indices (exit 0) or `{"error": "..."}` (exit 1) on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use inkcalc::logging;
use inkcalc::vision::{worker, WorkerResponse, MISSING_ARGUMENTS};

#[derive(Parser, Debug)]
#[command(name = "inkcalc-worker", about = "Isolated symbol classification worker", version)]
struct WorkerArgs {
    /// ONNX symbol classifier
    model_path: PathBuf,
    /// Batch file written by the solver
    data_file: PathBuf,
}

fn main() -> ExitCode {
    logging::init();

    let args = match WorkerArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            return emit(WorkerResponse::failure(MISSING_ARGUMENTS))
        }
        Err(e) => return emit(WorkerResponse::failure(format!("invalid arguments: {}", e.kind()))),
    };

    emit(worker::run(&args.model_path, &args.data_file))
}

fn emit(response: WorkerResponse) -> ExitCode {
    println!("{}", response.to_json());
    if response.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
