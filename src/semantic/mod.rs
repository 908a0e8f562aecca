//! Semantic comparison of titles.
//!
//! Uses fastembed-rs for generating embeddings locally and cosine
//! similarity for scoring.
//!
//! # Architecture
//!
//! - `embeddings`: Wraps fastembed for embedding generation
//! - `similarity`: Cosine similarity and best-match selection

pub mod embeddings;
pub mod similarity;

pub use embeddings::{Embedder, EmbeddingError, LazyEmbeddingModel};
pub use similarity::{best_match, score_candidates};
