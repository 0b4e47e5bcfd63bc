use std::env;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{
    ApiError, GeneratedText, GenerationParams, GenerationRequest, QuestionAnsweringInputs,
    QuestionAnsweringRequest, QuestionAnsweringResponse, SpanAnswer,
};
use super::{ExtractiveModel, GenerativeModel, InferenceError, ModelLoader, Models};

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_EXTRACTIVE_MODEL: &str = "deepset/xlm-roberta-large-squad2";
pub const DEFAULT_GENERATIVE_MODEL: &str = "gpt2";

#[derive(Clone)]
struct ApiToken(String);

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Where and how to reach the hosted inference pipelines.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub extractive_model: String,
    pub generative_model: String,
    token: Option<ApiToken>,
}

impl InferenceConfig {
    /// Blank values fall back to the defaults; the token comes from `HF_TOKEN`
    /// or `HUGGINGFACE_API_TOKEN`.
    pub fn new(base_url: &str, extractive_model: &str, generative_model: &str) -> Self {
        let or_default = |value: &str, default: &str| {
            let value = value.trim();
            let chosen = if value.is_empty() { default } else { value };
            chosen.to_string()
        };
        let token = resolve_token();
        if token.is_none() {
            warn!("No HF_TOKEN set. Hosted inference is heavily rate limited without one.");
        }
        Self {
            base_url: or_default(base_url, DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            extractive_model: or_default(extractive_model, DEFAULT_EXTRACTIVE_MODEL),
            generative_model: or_default(generative_model, DEFAULT_GENERATIVE_MODEL),
            token: token.map(ApiToken),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            extractive_model: DEFAULT_EXTRACTIVE_MODEL.to_string(),
            generative_model: DEFAULT_GENERATIVE_MODEL.to_string(),
            token: Some(ApiToken("test-token".to_string())),
        }
    }
}

fn resolve_token() -> Option<String> {
    ["HF_TOKEN", "HUGGINGFACE_API_TOKEN"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

/// One hosted model endpoint.
#[derive(Clone)]
struct Endpoint {
    http: Client,
    url: String,
    model: String,
    token: Option<ApiToken>,
}

impl Endpoint {
    fn new(http: Client, config: &InferenceConfig, model: &str) -> Self {
        Self {
            http,
            url: format!("{}/{model}", config.base_url),
            model: model.to_string(),
            token: config.token.clone(),
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        body: &B,
    ) -> Result<T, InferenceError> {
        let mut request = self
            .http
            .post(&self.url)
            .header("User-Agent", crate::USER_AGENT)
            .json(body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(&token.0);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            let parsed = response.json().await?;
            debug!(model = %self.model, "inference complete");
            return Ok(parsed);
        }

        let text = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ApiError>(&text).ok();
        let message = api_error
            .as_ref()
            .and_then(ApiError::message)
            .unwrap_or_else(|| text.chars().take(200).collect());

        let err = match status {
            StatusCode::SERVICE_UNAVAILABLE => InferenceError::ModelLoading {
                model: self.model.clone(),
                estimated_secs: api_error.and_then(|e| e.estimated_time),
            },
            StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                InferenceError::Unauthorized(message)
            }
            _ => InferenceError::Api {
                code: status.as_u16(),
                message,
            },
        };
        warn!(model = %self.model, status = %status, error = %err, "inference API error");
        Err(err)
    }
}

#[derive(Clone)]
pub struct HostedExtractive(Endpoint);

impl ExtractiveModel for HostedExtractive {
    fn model_id(&self) -> &str {
        &self.0.model
    }

    async fn infer(&self, question: &str, context: &str) -> Result<SpanAnswer, InferenceError> {
        let request = QuestionAnsweringRequest {
            inputs: QuestionAnsweringInputs { question, context },
        };
        let response: QuestionAnsweringResponse = self.0.post_json(&request).await?;
        response.best().ok_or(InferenceError::EmptyOutput)
    }
}

#[derive(Clone)]
pub struct HostedGenerative(Endpoint);

impl GenerativeModel for HostedGenerative {
    fn model_id(&self) -> &str {
        &self.0.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let request = GenerationRequest {
            inputs: prompt,
            parameters: *params,
        };
        let response: Vec<GeneratedText> = self.0.post_json(&request).await?;
        response
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or(InferenceError::EmptyOutput)
    }
}

/// Builds handles for the hosted extractive and generative pipelines.
pub struct HostedLoader {
    http: Client,
    config: InferenceConfig,
}

impl HostedLoader {
    pub fn new(http: Client, config: InferenceConfig) -> Self {
        Self { http, config }
    }
}

impl ModelLoader for HostedLoader {
    type Extractive = HostedExtractive;
    type Generative = HostedGenerative;

    async fn load(&self) -> Result<Models<HostedExtractive, HostedGenerative>, InferenceError> {
        let base = url::Url::parse(&self.config.base_url)
            .map_err(|e| InferenceError::Config(format!("{}: {e}", self.config.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(InferenceError::Config(format!(
                "inference URL must be HTTP(S), got '{}'",
                self.config.base_url
            )));
        }
        if base.scheme() == "http" && self.config.token.is_some() {
            warn!("sending inference token over plain HTTP");
        }

        Ok(Models {
            extractive: HostedExtractive(Endpoint::new(
                self.http.clone(),
                &self.config,
                &self.config.extractive_model,
            )),
            generative: HostedGenerative(Endpoint::new(
                self.http.clone(),
                &self.config,
                &self.config.generative_model,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = InferenceConfig::new("  ", "", "\t");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.extractive_model, DEFAULT_EXTRACTIVE_MODEL);
        assert_eq!(config.generative_model, DEFAULT_GENERATIVE_MODEL);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let config = InferenceConfig::new("https://example.com/models/", "a/b", "c");
        assert_eq!(config.base_url, "https://example.com/models");
        assert_eq!(config.extractive_model, "a/b");
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let config = InferenceConfig::with_base_url("http://localhost");
        let printed = format!("{config:?}");
        assert!(!printed.contains("test-token"), "got: {printed}");
        assert!(printed.contains("REDACTED"));
    }

    #[tokio::test]
    async fn loader_rejects_non_http_base_url() {
        let config = InferenceConfig::with_base_url("ftp://models.example");
        let loader = HostedLoader::new(Client::new(), config);
        let err = loader.load().await.err().unwrap();
        assert!(matches!(err, InferenceError::Config(_)), "got: {err:?}");
    }
}
