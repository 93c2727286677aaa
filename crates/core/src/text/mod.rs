//! Text handling: normalization, chunking, sentence splitting and alignment

pub mod align;
pub mod chunker;
pub mod preprocessor;
pub mod splitter;

pub use align::to_original_expression;
pub use chunker::chunk;
pub use preprocessor::{normalize, TextPreprocessor};
pub use splitter::{split_raw, SentenceSplitter};
