//! One user session: resolve the page, run the selected engine, render the outcome.

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::answer::{Mode, answer_extractive, answer_generative};
use crate::inference::{ExtractiveModel, GenerativeModel, ModelCache, ModelLoader};
use crate::present::{AnswerOutcome, render_answer, render_content_error};
use crate::wiki::{ContentSource, Language};

/// The four form fields of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub topic: String,
    pub language: Language,
    pub question: String,
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Processing,
}

#[derive(Debug, PartialEq)]
pub enum Submission {
    /// Rendered outcome, success or error.
    Completed(String),
    /// Arrived while another query was in flight; nothing ran.
    Ignored,
}

pub struct Session<S, L: ModelLoader> {
    content: S,
    models: ModelCache<L>,
    in_flight: Mutex<()>,
}

impl<S: ContentSource, L: ModelLoader> Session<S, L> {
    pub fn new(content: S, loader: L) -> Self {
        Self {
            content,
            models: ModelCache::new(loader),
            in_flight: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.in_flight.try_lock() {
            Ok(_) => SessionState::Idle,
            Err(_) => SessionState::Processing,
        }
    }

    /// Runs one query to a rendered outcome. The session returns to `Idle`
    /// when this future completes or is dropped.
    pub async fn submit(&self, query: &Query) -> Submission {
        let Ok(_processing) = self.in_flight.try_lock() else {
            warn!(topic = %query.topic, "submission ignored: a query is already in flight");
            return Submission::Ignored;
        };

        info!(
            topic = %query.topic,
            lang = %query.language,
            mode = %query.mode,
            models_loaded = self.models.is_loaded(),
            "query submitted"
        );

        let context = match self.content.resolve(&query.topic, query.language).await {
            Ok(text) => text,
            Err(e) => {
                info!(error = %e, "content unavailable");
                return Submission::Completed(render_content_error(&e));
            }
        };

        let outcome = self.answer(query, &context).await;
        if let Err(e) = &outcome.result {
            warn!(mode = %outcome.mode, error = %e, "answer failed");
        }
        Submission::Completed(render_answer(&context, &outcome))
    }

    async fn answer(&self, query: &Query, context: &str) -> AnswerOutcome {
        let models = match self.models.get().await {
            Ok(models) => models,
            Err(e) => {
                return AnswerOutcome {
                    mode: query.mode,
                    model: None,
                    result: Err(e),
                };
            }
        };

        match query.mode {
            Mode::Extractive => AnswerOutcome {
                mode: query.mode,
                model: Some(models.extractive.model_id().to_string()),
                result: answer_extractive(&models.extractive, &query.question, context).await,
            },
            Mode::Generative => AnswerOutcome {
                mode: query.mode,
                model: Some(models.generative.model_id().to_string()),
                result: answer_generative(&models.generative, &query.question, context).await,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use tokio::sync::Notify;

    use crate::wiki::{ContentError, ContentSource, Language};

    /// Content source returning a fixed outcome, optionally held until released.
    pub struct StubSource {
        pub outcome: fn(&str, Language) -> Result<String, ContentError>,
        pub lookups: Mutex<Vec<(String, Language)>>,
        pub gate: Option<Notify>,
    }

    impl StubSource {
        pub fn new(outcome: fn(&str, Language) -> Result<String, ContentError>) -> Self {
            Self {
                outcome,
                lookups: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        pub fn lookup_count(&self) -> usize {
            self.lookups.lock().unwrap().len()
        }
    }

    impl ContentSource for StubSource {
        async fn resolve(&self, topic: &str, language: Language) -> Result<String, ContentError> {
            self.lookups
                .lock()
                .unwrap()
                .push((topic.to_string(), language));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            (self.outcome)(topic, language)
        }
    }

    pub fn einstein(_: &str, _: Language) -> Result<String, ContentError> {
        Ok("Albert Einstein was a German-born theoretical physicist.".to_string())
    }
}
