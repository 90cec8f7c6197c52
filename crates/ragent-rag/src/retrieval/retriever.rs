//! Query-time context lookup for retrieval-augmented prompts

use super::vector::{SearchResult, VectorStore};
use crate::error::{RagentError, RagentResult};
use ragent_llm::EmbeddingProvider;
use std::sync::Arc;
use tracing::debug;

/// Embeds a question and pulls the closest stored texts
///
/// The embedder must be the one the store was indexed with.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: Option<usize>,
    min_score: Option<f32>,
}

impl Retriever {
    /// Create a retriever returning the single best match
    pub fn new(store: Arc<VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            top_k: None,
            min_score: None,
        }
    }

    /// Number of matches joined into the context
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Use `top_k` unless a match count was already chosen
    pub(crate) fn or_top_k(mut self, top_k: usize) -> Self {
        self.top_k.get_or_insert(top_k);
        self
    }

    /// Drop matches scoring below `min_score`
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Configured match count
    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(1)
    }

    /// Underlying store
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Ranked matches for `query`
    pub async fn retrieve(&self, query: &str) -> RagentResult<Vec<SearchResult>> {
        if self.store.is_empty() {
            debug!("Vector store is empty, skipping retrieval");
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RagentError::provider("embed_query", e))?;

        let mut results = self.store.query(&embedding.vector, self.top_k())?;
        if let Some(min_score) = self.min_score {
            results.retain(|r| r.score >= min_score);
        }

        debug!(
            query_length = query.len(),
            matches = results.len(),
            best_score = results.first().map(|r| r.score),
            "Retrieved context"
        );

        Ok(results)
    }

    /// Context string for `query`: matched texts in score order, one per line
    ///
    /// Returns an empty string when nothing matches.
    pub async fn augment(&self, query: &str) -> RagentResult<String> {
        let results = self.retrieve(query).await?;
        Ok(results
            .into_iter()
            .map(|r| r.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("entries", &self.store.len())
            .field("embedding_model", &self.embedder.embedding_model())
            .field("top_k", &self.top_k())
            .field("min_score", &self.min_score)
            .finish()
    }
}

/// Wrap retrieved context and a question into a grounded prompt
///
/// The model is told to answer only from the context and to say it does not know
/// otherwise. An empty context is still sent.
pub fn rag_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant. Answer the question using only the context below.\n\
         If the context does not contain the answer, say that you do not know.\n\
         \n\
         [Context]\n\
         {context}\n\
         \n\
         [Question]\n\
         {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{HashEmbeddingProvider, VectorEntry};

    fn knowledge_base() -> Vec<&'static str> {
        vec![
            "Theon is a software engineer who works at LEGO in Billund.",
            "The office coffee machine is on the third floor.",
            "Ragent stores embeddings in memory only.",
        ]
    }

    async fn retriever(top_k: usize) -> Retriever {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(4096));
        let store = VectorStore::index(knowledge_base(), embedder.as_ref())
            .await
            .unwrap();
        Retriever::new(Arc::new(store), embedder).with_top_k(top_k)
    }

    #[tokio::test]
    async fn test_augment_returns_best_match_verbatim() {
        let retriever = retriever(1).await;
        let context = retriever.augment("Where does Theon work?").await.unwrap();
        assert_eq!(context, knowledge_base()[0]);
    }

    #[tokio::test]
    async fn test_top_k_joins_matches_with_newlines() {
        let retriever = retriever(2).await;
        let context = retriever.augment("Where does Theon work?").await.unwrap();
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], knowledge_base()[0]);
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_context() {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(8));
        let retriever = Retriever::new(Arc::new(VectorStore::new()), embedder);
        assert_eq!(retriever.augment("anything").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_min_score_filters_weak_matches() {
        let store = VectorStore::from_entries(vec![
            VectorEntry::new("close", vec![1.0, 0.0]),
            VectorEntry::new("far", vec![-1.0, 0.0]),
        ])
        .unwrap();

        struct Fixed;
        #[async_trait::async_trait]
        impl EmbeddingProvider for Fixed {
            async fn embed(&self, _text: &str) -> ragent_llm::LlmResult<ragent_llm::Embedding> {
                Ok(ragent_llm::Embedding::new(vec![1.0, 0.0], "fixed"))
            }
            fn embedding_model(&self) -> &str {
                "fixed"
            }
        }

        let retriever = Retriever::new(Arc::new(store), Arc::new(Fixed))
            .with_top_k(2)
            .with_min_score(0.0);
        let results = retriever.retrieve("q").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "close");
    }

    #[test]
    fn test_rag_prompt_layout() {
        let prompt = rag_prompt("Theon works at LEGO.", "Where does Theon work?");
        assert!(prompt.contains("[Context]\nTheon works at LEGO.\n"));
        assert!(prompt.ends_with("[Question]\nWhere does Theon work?"));
        assert!(prompt.contains("do not know"));
    }
}
