//! Inference seams: span extraction, text generation, and the construct-once model cache.

pub mod client;
pub mod types;

use tokio::sync::OnceCell;
use tracing::info;

use types::{GenerationParams, SpanAnswer};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid model configuration: {0}")]
    Config(String),

    #[error(
        "model '{model}' is still loading{}",
        .estimated_secs.map(|s| format!(" (ready in about {s:.0}s)")).unwrap_or_default()
    )]
    ModelLoading {
        model: String,
        estimated_secs: Option<f64>,
    },

    #[error("inference API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("inference API rejected credentials: {0}. Set HF_TOKEN to a valid token.")]
    Unauthorized(String),

    #[error("inference API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned no output")]
    EmptyOutput,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Span-extraction question answering.
pub trait ExtractiveModel {
    fn model_id(&self) -> &str;

    async fn infer(&self, question: &str, context: &str) -> Result<SpanAnswer, InferenceError>;
}

/// Autoregressive text generation from a prompt.
pub trait GenerativeModel {
    fn model_id(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}

/// Builds the pair of model handles. Called at most once per successful load.
pub trait ModelLoader {
    type Extractive: ExtractiveModel;
    type Generative: GenerativeModel;

    async fn load(&self) -> Result<Models<Self::Extractive, Self::Generative>, InferenceError>;
}

pub struct Models<E, G> {
    pub extractive: E,
    pub generative: G,
}

/// Lazily constructed, never invalidated model handles.
///
/// Concurrent first callers wait on the same initialization; a failed load
/// leaves the cache empty so the next query tries again.
pub struct ModelCache<L: ModelLoader> {
    loader: L,
    models: OnceCell<Models<L::Extractive, L::Generative>>,
}

impl<L: ModelLoader> ModelCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            models: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&Models<L::Extractive, L::Generative>, InferenceError> {
        self.models
            .get_or_try_init(|| async {
                info!("loading inference models");
                let models = self.loader.load().await?;
                info!(
                    extractive = models.extractive.model_id(),
                    generative = models.generative.model_id(),
                    "inference models ready"
                );
                Ok::<_, InferenceError>(models)
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.models.initialized()
    }

    #[cfg(test)]
    pub(crate) fn loader(&self) -> &L {
        &self.loader
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CountingLoader;
    use super::*;

    #[tokio::test]
    async fn cache_loads_once_across_sequential_gets() {
        let cache = ModelCache::new(CountingLoader::new());
        assert!(!cache.is_loaded());

        for _ in 0..5 {
            cache.get().await.unwrap();
        }

        assert!(cache.is_loaded());
        assert_eq!(cache.loader.load_count(), 1);
    }

    #[tokio::test]
    async fn cache_loads_once_under_concurrent_first_access() {
        let cache = ModelCache::new(CountingLoader::new());

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(cache.loader.load_count(), 1);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let mut loader = CountingLoader::new();
        loader.fail_first = 1;
        let cache = ModelCache::new(loader);

        let err = cache.get().await.err().unwrap();
        assert!(err.to_string().contains("weights unavailable"));
        assert!(!cache.is_loaded());

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(cache.loader.load_count(), 2);
    }

    #[test]
    fn model_loading_message_includes_estimate() {
        let err = InferenceError::ModelLoading {
            model: "gpt2".into(),
            estimated_secs: Some(20.4),
        };
        assert_eq!(err.to_string(), "model 'gpt2' is still loading (ready in about 20s)");

        let err = InferenceError::ModelLoading {
            model: "gpt2".into(),
            estimated_secs: None,
        };
        assert_eq!(err.to_string(), "model 'gpt2' is still loading");
    }
}
