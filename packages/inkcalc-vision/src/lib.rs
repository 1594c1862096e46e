pub mod engine;
pub mod geometry;
pub mod labels;
pub mod normalize;
pub mod onnx;
pub mod process;
pub mod protocol;
pub mod region;
pub mod segment;
pub mod worker;

pub use engine::{ClassifyError, SymbolClassifier};
pub use geometry::{correct_by_geometry, resolve_symbol, Symbol};
pub use labels::{glyph_for_class, CLASSES};
pub use normalize::{normalize_image, normalize_symbol, stack, NormalizedTensor, SYMBOL_SIZE};
pub use onnx::OnnxSymbolModel;
pub use process::ProcessClassifier;
pub use protocol::{WorkerResponse, MISSING_ARGUMENTS};
pub use region::{BoundingBox, SymbolRegion};
pub use segment::segment;
