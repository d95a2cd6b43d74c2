//! Guide request orchestrator: classify, consult the cache, then remote or local generation

use crate::cache_key::CacheKey;
use crate::cache_store::{CacheEntry, GuideCache};
use crate::error::{GuideError, RemoteFailure};
use crate::fallback::build_fallback_guide;
use crate::generators::GuideGenerator;
use crate::prompt::build_prompt;
use crate::selection::classify;
use crate::types::*;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Main guide engine (thread-safe via Arc)
pub struct GuideEngine {
    pub cache: Arc<dyn GuideCache>,
    /// `None` when no credential is configured
    pub remote: Option<Box<dyn GuideGenerator>>,
}

pub type SharedGuideEngine = Arc<GuideEngine>;

impl GuideEngine {
    pub fn new(
        cache: Arc<dyn GuideCache>,
        remote: Option<Box<dyn GuideGenerator>>,
    ) -> SharedGuideEngine {
        Arc::new(Self { cache, remote })
    }

    /// Engine that only ever uses the local generator
    pub fn local_only(cache: Arc<dyn GuideCache>) -> SharedGuideEngine {
        Self::new(cache, None)
    }

    /// Main entry point: produce a guide for the requested component names
    pub async fn generate_guide<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<GuideResponse, GuideError> {
        // Step 1: Validate
        if names.is_empty() {
            return Err(GuideError::InvalidInput);
        }

        // Step 2: Classify
        let selection = classify(names);
        info!(
            "Guide request: sensors={:?}, outputs={:?}",
            selection.sensor_names(),
            selection.output_names()
        );
        if !selection.is_complete() {
            return Err(GuideError::IncompleteSelection);
        }

        // Step 3: Cache check
        let key = CacheKey::for_selection(&selection);
        if let Some(entry) = self.cached(&key).await {
            info!(
                "Returning cached guide from {} store (source={})",
                self.cache.name(),
                entry.source.as_str()
            );
            return Ok(GuideResponse {
                result: entry.result,
                cached: true,
                source: entry.source,
                fallback: None,
                note: None,
            });
        }
        debug!("Cache miss for {}", key);

        // Step 4: Dispatch
        let remote = match &self.remote {
            Some(remote) => remote,
            None => {
                warn!("No remote credential configured. Returning local fallback guide.");
                return Ok(self.fallback(&key, &selection, FallbackReason::NoCredential).await);
            }
        };

        // Step 5: Remote call
        let prompt = build_prompt(&selection);
        match remote.generate(&prompt).await {
            Ok(result) => {
                info!("Remote generator '{}' produced a guide", remote.name());
                self.store(&key, &selection, &result, GuideSource::OpenAi).await;
                Ok(GuideResponse {
                    result,
                    cached: false,
                    source: GuideSource::OpenAi,
                    fallback: None,
                    note: None,
                })
            }
            // Step 6: Failure classification
            Err(e) => match RemoteFailure::classify(&e) {
                RemoteFailure::Auth => {
                    warn!("Remote auth failed ({}). Returning local fallback guide.", e);
                    Ok(self.fallback(&key, &selection, FallbackReason::AuthFailure).await)
                }
                RemoteFailure::RateLimited => {
                    warn!("Remote rate/quota issue ({}). Returning local fallback guide.", e);
                    Ok(self.fallback(&key, &selection, FallbackReason::RateLimited).await)
                }
                RemoteFailure::ModelMisconfigured => {
                    error!("Remote rejected model '{}': {}", remote.model(), e);
                    Err(GuideError::ModelMisconfigured {
                        model: remote.model().to_string(),
                    })
                }
                RemoteFailure::Unclassified => {
                    error!("Remote generation failed: {:?}", e);
                    Err(GuideError::Remote {
                        status: e.status,
                        message: e.message,
                    })
                }
            },
        }
    }

    /// Step 7: local generation, cached under the reason's source tag
    async fn fallback(
        &self,
        key: &CacheKey,
        selection: &ClassifiedSelection,
        reason: FallbackReason,
    ) -> GuideResponse {
        let result = build_fallback_guide(selection);
        self.store(key, selection, &result, reason.source()).await;

        GuideResponse {
            result,
            cached: false,
            source: reason.source(),
            fallback: Some(true),
            note: Some(reason.note().to_string()),
        }
    }

    /// Cache reads touch the filesystem, so they run on the blocking pool
    async fn cached(&self, key: &CacheKey) -> Option<CacheEntry> {
        let cache = self.cache.clone();
        let key = key.clone();
        match tokio::task::spawn_blocking(move || cache.get(&key)).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cache read task failed: {}", e);
                None
            }
        }
    }

    /// Best-effort write; the response never re-reads the store
    async fn store(
        &self,
        key: &CacheKey,
        selection: &ClassifiedSelection,
        result: &str,
        source: GuideSource,
    ) {
        let entry = CacheEntry::new(
            result.to_string(),
            source,
            &selection.sensor_names(),
            &selection.output_names(),
        );
        let cache = self.cache.clone();
        let key = key.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || cache.put(&key, entry)).await {
            warn!("Cache write task failed: {}", e);
        }
    }
}
