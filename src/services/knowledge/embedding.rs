//! Embedding Provider Abstraction
//!
//! Defines the async [`EmbeddingProvider`] trait plus two implementations:
//! a deterministic local feature-hashing embedder (no external service)
//! and a read-through caching wrapper. Embedding is a distinct
//! responsibility from chat completion, so it gets its own trait rather
//! than extending `LlmProvider`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::utils::error::EngineResult;

/// Trait for pluggable embedding backends.
///
/// Implementations must be deterministic for a given input: retrieval
/// ranking is specified as a pure function of the query embedding and the
/// store contents.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of documents.
    async fn embed_documents(&self, documents: &[&str]) -> EngineResult<Vec<Vec<f32>>>;

    /// Embed a single query string.
    async fn embed_query(&self, query: &str) -> EngineResult<Vec<f32>>;

    /// Fixed output dimensionality.
    fn dimension(&self) -> usize;

    /// Check the backend is usable.
    async fn health_check(&self) -> EngineResult<()>;
}

/// Cosine similarity between two equal-length vectors.
///
/// Returns 0.0 for mismatched lengths or zero-norm inputs, so degenerate
/// embeddings rank last instead of poisoning the sort with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Default embedding dimensionality for the local embedder.
pub const DEFAULT_DIMENSION: usize = 384;

/// Deterministic local embedder using the feature-hashing trick.
///
/// Tokens are FNV-hashed into a fixed-dimension signed bag-of-words
/// vector which is then L2-normalised. Pure and stateless: the same text
/// always yields the same vector, which makes retrieval ranking
/// reproducible and the output safely cacheable per input.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let h = fnv1a(token.as_bytes());
            let index = (h % self.dimension as u64) as usize;
            // One hash bit decides the sign so unrelated tokens cancel
            // rather than accumulate.
            let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }
        l2_normalize(&mut vector);
        vector
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

/// FNV-1a, 64-bit. Stable across platforms and releases, unlike the std
/// hasher.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed_documents(&self, documents: &[&str]) -> EngineResult<Vec<Vec<f32>>> {
        Ok(documents.iter().map(|d| self.embed(d)).collect())
    }

    async fn embed_query(&self, query: &str) -> EngineResult<Vec<f32>> {
        Ok(self.embed(query))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn health_check(&self) -> EngineResult<()> {
        Ok(())
    }
}

/// Read-through cache around an embedding backend.
///
/// Embeddings are pure functions of their input, so query vectors are
/// cached by exact text. Document batches go straight through: they are
/// embedded once at indexing time.
pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    cache: mini_moka::sync::Cache<String, Vec<f32>>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, capacity: u64) -> Self {
        Self {
            inner,
            cache: mini_moka::sync::Cache::new(capacity),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbedder {
    async fn embed_documents(&self, documents: &[&str]) -> EngineResult<Vec<Vec<f32>>> {
        self.inner.embed_documents(documents).await
    }

    async fn embed_query(&self, query: &str) -> EngineResult<Vec<f32>> {
        if let Some(hit) = self.cache.get(&query.to_string()) {
            return Ok(hit);
        }
        let vector = self.inner.embed_query(query).await?;
        self.cache.insert(query.to_string(), vector.clone());
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn health_check(&self) -> EngineResult<()> {
        self.inner.health_check().await
    }
}
