// Hybrid Rewriter
// Fix chain: generative service -> local rewrite engine -> static template.
// Exactly one primary attempt per request; every request ends with a result.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::models::{RewriteResult, RewriteSource};
use crate::services::providers::{preview, ProviderError, RewriteProvider};

use super::engine::FallbackRewriter;

/// Appended to rewrites from the generative service
pub const PRIMARY_SUFFIX: &str = " [Watsonx AI]";

/// Last-resort guidance when nothing could rewrite the text
pub fn static_fallback(text: &str) -> String {
    format!(
        "[Fallback] Try rephrasing: \"{}\" by using synonyms and changing sentence structure.",
        text
    )
}

pub struct HybridRewriter {
    primary: Option<Arc<dyn RewriteProvider>>,
    engine: Arc<dyn FallbackRewriter>,
    primary_timeout: Duration,
}

impl HybridRewriter {
    pub fn new(
        primary: Option<Arc<dyn RewriteProvider>>,
        engine: Arc<dyn FallbackRewriter>,
        primary_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            engine,
            primary_timeout,
        }
    }

    pub async fn fix(&self, text: &str) -> RewriteResult {
        let started = Instant::now();
        let mut stage = RewriteSource::Primary;

        loop {
            match stage {
                RewriteSource::Primary => match self.try_primary(text).await {
                    Ok(generated) => {
                        return self.finish(started, true, format!("{}{}", generated, PRIMARY_SUFFIX), stage);
                    }
                    Err(e) => {
                        let provider = self.primary_name();
                        if e.is_configuration() {
                            info!("[FIX] {} skipped: {}", provider, e);
                        } else {
                            warn!("[FIX] {} rewrite failed: {}", provider, e);
                        }
                        stage = RewriteSource::FallbackEngine;
                    }
                },
                RewriteSource::FallbackEngine => match self.engine.rewrite_text(text) {
                    Ok(rewritten) => return self.finish(started, true, rewritten, stage),
                    Err(e) => {
                        warn!("[FIX] rewrite engine failed: {}", e);
                        stage = RewriteSource::FallbackStatic;
                    }
                },
                RewriteSource::FallbackStatic => {
                    return self.finish(started, false, static_fallback(text), stage);
                }
            }
        }
    }

    fn primary_name(&self) -> &str {
        self.primary.as_deref().map(|p| p.name()).unwrap_or("primary")
    }

    async fn try_primary(&self, text: &str) -> Result<String, ProviderError> {
        let provider = self
            .primary
            .as_ref()
            .ok_or(ProviderError::MissingCredentials("Generative rewrite service"))?;

        match timeout(self.primary_timeout, provider.rephrase(text)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.primary_timeout.as_secs())),
        }
    }

    fn finish(&self, started: Instant, success: bool, fixed_text: String, source: RewriteSource) -> RewriteResult {
        info!(
            "[FIX] source={} success={} elapsed_ms={} output={}",
            source.tag(),
            success,
            started.elapsed().as_millis(),
            preview(&fixed_text, 60)
        );
        RewriteResult {
            success,
            fixed_text,
            source,
        }
    }
}
