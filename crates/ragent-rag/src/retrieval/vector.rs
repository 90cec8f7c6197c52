//! In-memory vector store with cosine similarity search
//!
//! Entries are embedded once when the store is built and are immutable afterwards.
//! Queries scan every entry; there is no approximate index.

use crate::error::{RagentError, RagentResult};
use ragent_llm::{Embedding, EmbeddingProvider, LlmResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Cosine similarity of two vectors
///
/// Vectors must have the same dimensionality and a non-zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> RagentResult<f32> {
    if a.len() != b.len() {
        return Err(RagentError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(RagentError::invalid_embedding(
            "cosine similarity is undefined for zero-length vectors",
        ));
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// A stored text and its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Original text
    pub text: String,

    /// Embedding of the text
    pub vector: Vec<f32>,
}

impl VectorEntry {
    /// Create an entry
    pub fn new(text: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            vector,
        }
    }
}

/// One query hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Text of the matching entry
    pub text: String,

    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,

    /// Insertion position of the entry
    pub index: usize,
}

/// Flat list of embedded texts sharing one dimensionality
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    entries: Vec<VectorEntry>,
    dimensions: Option<usize>,
}

impl VectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from pre-computed entries
    pub fn from_entries(entries: Vec<VectorEntry>) -> RagentResult<Self> {
        let dimensions = entries.first().map(|e| e.vector.len());

        for entry in &entries {
            check_vector(&entry.vector, dimensions)?;
        }

        Ok(Self { entries, dimensions })
    }

    /// Embed every text with `provider` and build a store from the results
    pub async fn index<I, S>(texts: I, provider: &dyn EmbeddingProvider) -> RagentResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();

        for text in texts {
            let text = text.into();
            let embedding = provider
                .embed(&text)
                .await
                .map_err(|e| RagentError::provider("embed_knowledge_base", e))?;
            debug!(dimensions = embedding.dimensions(), text = %text, "Embedded entry");
            entries.push(VectorEntry::new(text, embedding.vector));
        }

        let store = Self::from_entries(entries)?;
        info!(
            entries = store.len(),
            dimensions = store.dimensions.unwrap_or(0),
            model = provider.embedding_model(),
            "Vector store indexed"
        );
        Ok(store)
    }

    /// Entries most similar to `vector`, best first, at most `top_k`
    ///
    /// Ties keep insertion order. An empty store yields no results.
    pub fn query(&self, vector: &[f32], top_k: usize) -> RagentResult<Vec<SearchResult>> {
        let Some(dimensions) = self.dimensions else {
            return Ok(Vec::new());
        };
        if top_k == 0 {
            return Ok(Vec::new());
        }
        check_vector(vector, Some(dimensions))?;

        let mut results = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                cosine_similarity(vector, &entry.vector).map(|score| SearchResult {
                    text: entry.text.clone(),
                    score,
                    index,
                })
            })
            .collect::<RagentResult<Vec<_>>>()?;

        // stable: equal scores stay in insertion order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shared dimensionality, `None` for an empty store
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Stored entries in insertion order
    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }
}

fn check_vector(vector: &[f32], expected: Option<usize>) -> RagentResult<()> {
    if let Some(expected) = expected {
        if vector.len() != expected {
            return Err(RagentError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
    }
    if vector.is_empty() {
        return Err(RagentError::invalid_embedding("vector has no components"));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(RagentError::invalid_embedding("vector contains non-finite values"));
    }
    if vector.iter().all(|x| *x == 0.0) {
        return Err(RagentError::invalid_embedding("vector has zero length"));
    }
    Ok(())
}

/// Deterministic feature-hashing embeddings (for tests and offline demos, NOT for production!)
///
/// Each lowercase word, and each CJK character, is hashed into one of `dimensions`
/// buckets, so texts sharing vocabulary score higher than unrelated texts.
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of `dimensions` components
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn hash_embed(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        if vector.iter().all(|x| *x == 0.0) {
            // no tokens: fall back to a whole-text hash so the vector is usable
            for (i, slot) in vector.iter_mut().enumerate() {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                i.hash(&mut hasher);
                *slot = ((hasher.finish() as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32;
            }
        }

        vector
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for ch in text.chars() {
        if is_cjk(ch) {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(ch.to_string());
        } else if ch.is_alphanumeric() {
            word.extend(ch.to_lowercase());
        } else if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }

    tokens
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x3040..=0x30FF | 0xAC00..=0xD7AF)
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> LlmResult<Embedding> {
        Ok(Embedding::new(self.hash_embed(text), "hash-embedding"))
    }

    fn embedding_model(&self) -> &str {
        "hash-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_reference_values() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-6);

        let sim = cosine_similarity(&[0.3, 0.4, 0.5], &[0.3, 0.4, 0.5]).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);

        let sim = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_rejects_bad_input() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, RagentError::DimensionMismatch { expected: 2, actual: 3 }));

        let err = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, RagentError::InvalidEmbedding { .. }));
    }

    #[test]
    fn test_query_ties_keep_insertion_order() {
        // scores against [1, 0]: 0.9, 0.9, 0.1
        let tied = vec![0.9, (1.0f32 - 0.81).sqrt()];
        let low = vec![0.1, (1.0f32 - 0.01).sqrt()];
        let store = VectorStore::from_entries(vec![
            VectorEntry::new("first", tied.clone()),
            VectorEntry::new("second", tied),
            VectorEntry::new("third", low),
        ])
        .unwrap();

        let results = store.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "first");
        assert_eq!(results[1].text, "second");
        assert!((results[0].score - 0.9).abs() < 1e-5);
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn test_query_orders_by_score_descending() {
        let store = VectorStore::from_entries(vec![
            VectorEntry::new("opposite", vec![-1.0, 0.0]),
            VectorEntry::new("orthogonal", vec![0.0, 1.0]),
            VectorEntry::new("same", vec![2.0, 0.0]),
        ])
        .unwrap();

        let results = store.query(&[1.0, 0.0], 10).unwrap();
        let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["same", "orthogonal", "opposite"]);
        assert_eq!(results[0].index, 2);
    }

    #[test]
    fn test_empty_store_returns_nothing() {
        let store = VectorStore::new();
        assert!(store.query(&[1.0, 2.0, 3.0], 1).unwrap().is_empty());
        assert!(store.query(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_mismatch_is_error() {
        let store = VectorStore::from_entries(vec![VectorEntry::new("a", vec![1.0, 0.0])]).unwrap();
        let err = store.query(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, RagentError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_from_entries_validates_vectors() {
        let err = VectorStore::from_entries(vec![
            VectorEntry::new("a", vec![1.0, 0.0]),
            VectorEntry::new("b", vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, RagentError::DimensionMismatch { .. }));

        let err = VectorStore::from_entries(vec![VectorEntry::new("zero", vec![0.0, 0.0])]).unwrap_err();
        assert!(matches!(err, RagentError::InvalidEmbedding { .. }));
    }

    #[test]
    fn test_top_k_zero() {
        let store = VectorStore::from_entries(vec![VectorEntry::new("a", vec![1.0])]).unwrap();
        assert!(store.query(&[1.0], 0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_with_hash_provider() {
        let provider = HashEmbeddingProvider::new(4096);
        let store = VectorStore::index(
            [
                "Theon works at LEGO as a senior frontend engineer",
                "Theon's favourite singer is Jay Chou",
                "OpenClaw is an AI agent framework built on Node.js",
            ],
            &provider,
        )
        .await
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.dimensions(), Some(4096));

        let query = provider.embed("Where does Theon work? LEGO?").await.unwrap();
        let results = store.query(&query.vector, 1).unwrap();
        assert_eq!(results[0].index, 0);
    }

    #[tokio::test]
    async fn test_hash_provider_is_deterministic() {
        let provider = HashEmbeddingProvider::new(64);
        let a = provider.embed("Hello world").await.unwrap();
        let b = provider.embed("hello, WORLD").await.unwrap();
        let c = provider.embed("!!!").await.unwrap();

        assert_eq!(a.dimensions(), 64);
        assert!((cosine_similarity(&a.vector, &b.vector).unwrap() - 1.0).abs() < 1e-6);
        assert!(c.vector.iter().any(|x| *x != 0.0));
    }
}
