//! Content resolution: topic + language → plain-text Wikipedia article.

mod lang;
pub mod types;

pub use lang::Language;

use reqwest::Client;
use tracing::{debug, info, warn};

use types::{Page, QueryResponse};

const API_TEMPLATE: &str = "https://{lang}.wikipedia.org/w/api.php";
const MAX_RESPONSE_BYTES: usize = 10_000_000;

/// Classified outcome of a failed lookup.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Page '{topic}' not found in Wikipedia ({language})")]
    NotFound { topic: String, language: Language },

    #[error("'{topic}' is ambiguous in Wikipedia ({language})")]
    Ambiguous {
        topic: String,
        language: Language,
        options: Vec<String>,
    },

    #[error("{0}")]
    Unexpected(String),
}

/// Low-level transport failures, folded into `ContentError::Unexpected`.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("invalid endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed: status {0}")]
    Status(u16),

    #[error("response too large (>{} bytes)", MAX_RESPONSE_BYTES)]
    TooLarge,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error ({code}): {info}")]
    Api { code: String, info: String },

    #[error("response contained no pages")]
    NoPages,
}

/// Source of encyclopedia article text.
/// Implemented by `WikipediaClient` for production; test doubles in the session tests.
pub trait ContentSource {
    async fn resolve(&self, topic: &str, language: Language) -> Result<String, ContentError>;
}

/// MediaWiki Action API client. The endpoint is a template where `{lang}`
/// is replaced by the edition code on every request.
#[derive(Clone)]
pub struct WikipediaClient {
    http: Client,
    api_template: String,
}

impl WikipediaClient {
    pub fn new(http: Client, api_template: Option<String>) -> Self {
        let api_template = api_template
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| API_TEMPLATE.to_string());
        if !api_template.contains("{lang}") {
            warn!(template = %api_template, "wiki endpoint has no {{lang}} placeholder; language selection is ignored");
        }
        Self { http, api_template }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_template: format!("{base_url}/{{lang}}/w/api.php"),
        }
    }

    fn endpoint(&self, language: Language) -> String {
        self.api_template.replace("{lang}", language.code())
    }

    async fn query(
        &self,
        language: Language,
        params: &[(&str, &str)],
    ) -> Result<QueryResponse, FetchError> {
        let mut pairs = vec![("action", "query"), ("format", "json"), ("formatversion", "2")];
        pairs.extend_from_slice(params);
        let url = url::Url::parse_with_params(&self.endpoint(language), &pairs)?;

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > MAX_RESPONSE_BYTES
        {
            return Err(FetchError::TooLarge);
        }

        let mut body = Vec::new();
        let mut stream = response;
        while let Some(chunk) = stream.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > MAX_RESPONSE_BYTES {
                return Err(FetchError::TooLarge);
            }
        }

        let parsed: QueryResponse = serde_json::from_slice(&body)?;
        if let Some(err) = &parsed.error {
            return Err(FetchError::Api {
                code: err.code.clone().unwrap_or_else(|| "unknown".to_string()),
                info: err.info.clone().unwrap_or_else(|| "no details".to_string()),
            });
        }
        Ok(parsed)
    }

    async fn lookup(&self, topic: &str, language: Language) -> Result<Page, FetchError> {
        let response = self
            .query(
                language,
                &[
                    ("prop", "extracts|pageprops"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("ppprop", "disambiguation"),
                    ("titles", topic),
                ],
            )
            .await?;
        response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or(FetchError::NoPages)
    }

    async fn candidates(&self, title: &str, language: Language) -> Result<Vec<String>, FetchError> {
        let response = self
            .query(
                language,
                &[
                    ("prop", "links"),
                    ("plnamespace", "0"),
                    ("pllimit", "max"),
                    ("titles", title),
                ],
            )
            .await?;
        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or(FetchError::NoPages)?;
        Ok(page.links.into_iter().map(|l| l.title).collect())
    }
}

impl ContentSource for WikipediaClient {
    async fn resolve(&self, topic: &str, language: Language) -> Result<String, ContentError> {
        let not_found = || ContentError::NotFound {
            topic: topic.to_string(),
            language,
        };
        let unexpected = |e: FetchError| {
            warn!(topic, lang = %language, error = %e, "wikipedia lookup failed");
            ContentError::Unexpected(format!(
                "could not fetch '{topic}' from Wikipedia ({language}): {e}"
            ))
        };

        let title = topic.trim();
        if title.is_empty() {
            return Err(not_found());
        }

        info!(topic = title, lang = %language, "resolving page");
        let page = self.lookup(title, language).await.map_err(unexpected)?;

        if page.missing || page.invalid {
            debug!(topic = title, lang = %language, "page does not exist");
            return Err(not_found());
        }

        if page.is_disambiguation() {
            let resolved = page.title.as_deref().unwrap_or(title);
            let options = self
                .candidates(resolved, language)
                .await
                .map_err(unexpected)?;
            if options.is_empty() {
                return Err(ContentError::Unexpected(format!(
                    "'{resolved}' is a disambiguation page in Wikipedia ({language}) with no candidate pages"
                )));
            }
            info!(topic = title, options = options.len(), "topic is ambiguous");
            return Err(ContentError::Ambiguous {
                topic: topic.to_string(),
                language,
                options,
            });
        }

        let text = page.extract.unwrap_or_default();
        debug!(topic = title, chars = text.chars().count(), "page resolved");
        Ok(text)
    }
}
