mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands};
use inkcalc::vision::segment;
use inkcalc::{evaluate, logging, sanitize, Solver};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

#[tokio::main]
async fn main() {
  logging::init();

  let args = Args::parse();

  if let Err(e) = run(args).await {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

async fn run(args: Args) -> Result<()> {
  match args.command {
    Commands::Version => {
      println!("inkcalc {}", env!("CARGO_PKG_VERSION"));
    }
    Commands::Solve { image, solver, pretty } => {
      let solver = Solver::new(&solver.to_config())?;
      let image = open_image(&image)?;
      let record = solver.solve(image).await;
      print_json(&record, pretty)?;
    }
    Commands::Segment { image, pretty } => {
      let image = open_image(&image)?;
      let boxes: Vec<_> = segment(&image).into_iter().map(|r| r.bounding_box).collect();
      print_json(&boxes, pretty)?;
    }
    Commands::Eval { expression } => {
      let (result, error) = match evaluate(&expression) {
        Ok(value) => (Some(value), None),
        Err(e) => (None, Some(e.to_string())),
      };
      let output = json!({
        "equation": sanitize(&expression),
        "result": result,
        "error": error,
      });
      print_json(&output, false)?;
    }
  }
  Ok(())
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
  image::open(path).with_context(|| format!("Failed to open image {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
  let text = if pretty {
    serde_json::to_string_pretty(value)?
  } else {
    serde_json::to_string(value)?
  };
  println!("{}", text);
  Ok(())
}
