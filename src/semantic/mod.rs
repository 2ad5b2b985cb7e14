//! Embedding generation for essay text.
//!
//! - `embeddings`: the [`Embedder`] seam and the OpenAI-backed client
//! - `preprocess`: input truncation applied before every request

pub mod embeddings;
pub mod preprocess;

pub use embeddings::{generate_embedding, Embedder, EmbeddingError, OpenAiEmbedder};
