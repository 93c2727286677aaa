//! Embedding ranking: selection strategies, fusion and the ranking engine

pub mod engine;
pub mod fusion;
pub mod selection;
pub mod target;

pub use engine::RankingEngine;
pub use fusion::{fuse, FusionPolicy, DEFAULT_FUSION_ALPHA, DEFAULT_RRF_K};
pub use selection::{select, ScoreMetric, SelectionError, SelectionStrategy};
pub use target::{mask_text, with_source_text, EmbeddingTarget, MASK_TOKEN};
