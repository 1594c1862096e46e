mod model;
mod session;

pub use model::{argmax, OnnxSymbolModel};
