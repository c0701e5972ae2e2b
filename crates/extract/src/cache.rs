use async_trait::async_trait;
use dashmap::DashMap;
use record::ExtractionResult;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::{ExtractError, ExtractionGateway};

/// Successful extractions keyed by a hash of the submitted text.
pub struct ExtractionCache {
    results: Arc<DashMap<String, ExtractionResult>>,
    max_entries: usize,
}

impl ExtractionCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            results: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn set(&self, text: &str, result: ExtractionResult) {
        if self.max_entries == 0 {
            return;
        }
        if self.results.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self.results.iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.results.remove(&key);
            }
        }
        self.results.insert(hash_text(text), result);
    }

    pub fn get(&self, text: &str) -> Option<ExtractionResult> {
        self.results.get(&hash_text(text)).map(|r| r.value().clone())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            extractions_cached: self.results.len(),
            max_entries: self.max_entries,
        }
    }

    pub fn clear(&self) {
        self.results.clear();
    }
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub extractions_cached: usize,
    pub max_entries: usize,
}

/// Wraps another gateway and answers repeated texts from the cache.
/// Failures are never cached.
pub struct CachedExtractor {
    inner: Arc<dyn ExtractionGateway>,
    cache: ExtractionCache,
}

impl CachedExtractor {
    pub fn new(inner: Arc<dyn ExtractionGateway>, max_entries: usize) -> Self {
        Self {
            inner,
            cache: ExtractionCache::new(max_entries),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl ExtractionGateway for CachedExtractor {
    async fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractError> {
        if let Some(hit) = self.cache.get(raw_text) {
            tracing::debug!("Extraction cache hit");
            return Ok(hit);
        }
        let result = self.inner.extract(raw_text).await?;
        self.cache.set(raw_text, result.clone());
        Ok(result)
    }
}
