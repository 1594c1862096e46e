//! Solve one image end to end.
//!
//! ```text
//! cargo build --bins
//! cargo run --example solve_image -- equation.png model.onnx
//! ```

use anyhow::{Context, Result};
use inkcalc::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    inkcalc::logging::init();

    let mut args = std::env::args().skip(1);
    let image_path = args.next().context("usage: solve_image <IMAGE> [MODEL]")?;
    let model_path = args.next().unwrap_or_else(|| "model.onnx".to_string());

    let solver = Solver::new(&SolverConfig::new(model_path))?;
    let image = image::open(&image_path).with_context(|| format!("Failed to open {}", image_path))?;

    let record = solver.solve(image).await;
    println!("Equation: {}", record.equation.as_deref().unwrap_or("-"));
    match (&record.result, &record.error) {
        (Some(result), _) => println!("Result:   {}", result),
        (None, Some(error)) => println!("Error:    {}", error),
        (None, None) => println!("Result:   -"),
    }
    for (i, b) in record.boxes.iter().enumerate() {
        println!("  #{} at ({}, {}) {}x{}", i + 1, b.x, b.y, b.w, b.h);
    }
    Ok(())
}
