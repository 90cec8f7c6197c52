//! Memoising wrapper for embedding providers

use parking_lot::Mutex;
use ragent_llm::{Embedding, EmbeddingProvider, LlmResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Caches embeddings by exact text so repeated texts hit the provider once
pub struct CachedEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<HashMap<String, Embedding>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CachedEmbeddingProvider {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Number of cached texts
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Whether nothing is cached yet
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Drop every cached embedding
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CachedEmbeddingProvider {
    async fn embed(&self, text: &str) -> LlmResult<Embedding> {
        if let Some(hit) = self.cache.lock().get(text).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(text_length = text.len(), "Embedding cache hit");
            return Ok(hit);
        }

        // lock is not held across the provider call
        let embedding = self.inner.embed(text).await?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.cache.lock().insert(text.to_string(), embedding.clone());

        Ok(embedding)
    }

    fn embedding_model(&self) -> &str {
        self.inner.embedding_model()
    }
}
