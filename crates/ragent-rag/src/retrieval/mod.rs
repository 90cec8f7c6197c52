//! Retrieval-augmented context: vector store, retriever and embedding cache

pub mod cache;
pub mod retriever;
pub mod vector;

pub use cache::CachedEmbeddingProvider;
pub use retriever::{rag_prompt, Retriever};
pub use vector::{cosine_similarity, HashEmbeddingProvider, SearchResult, VectorEntry, VectorStore};
