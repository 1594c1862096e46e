//! # inkcalc
//!
//! Reads a photo or drawing of a handwritten arithmetic expression and computes
//! its value.
//!
//! ## Pipeline
//!
//! - **Segmentation**: Otsu binarization and external contours split the image
//!   into symbol boxes, ordered left to right
//! - **Normalization**: each crop becomes a 32x32x1 tensor in `[0, 1]`
//! - **Isolated classification**: a disposable `inkcalc-worker` process loads
//!   the ONNX model and labels the batch, so a runtime crash only kills the child
//! - **Geometry correction**: box aspect ratio overrides plus/minus confusion
//! - **Safe evaluation**: a closed recursive-descent grammar, no code execution
//!
//! ## Quick Start
//!
//! ```ignore
//! use inkcalc::prelude::*;
//!
//! let solver = Solver::new(&SolverConfig::new("model.onnx"))?;
//! let image = image::open("equation.png")?;
//! let record = solver.solve(image).await;
//! println!("{}", serde_json::to_string(&record)?);
//!
//! // The evaluator is usable on its own
//! assert_eq!(evaluate("12+3=?")?, Number::Int(15));
//! ```

pub mod config;
pub mod expression;
pub mod logging;
pub mod solver;

pub use config::SolverConfig;
pub use expression::{assemble, evaluate, sanitize, EvalError, Number};
pub use solver::{ResultRecord, SolveError, Solver, NO_SYMBOLS_DETECTED};

pub use inkcalc_vision as vision;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        assemble, evaluate, sanitize, EvalError, Number, ResultRecord, SolveError, Solver, SolverConfig,
    };
    pub use inkcalc_vision::{BoundingBox, ClassifyError, NormalizedTensor, Symbol, SymbolClassifier};
}
