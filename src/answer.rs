//! Answer engines: span extraction and prompt-conditioned generation over a fetched article.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, info};

use crate::inference::types::GenerationParams;
use crate::inference::{ExtractiveModel, GenerativeModel, InferenceError};

const ANSWER_MARKER: &str = "Answer:";

pub const GENERATION_PARAMS: GenerationParams = GenerationParams {
    max_new_tokens: 100,
    do_sample: true,
    temperature: 0.8,
};

#[derive(Debug, Deserialize, ValueEnum, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Extractive,
    Generative,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Extractive => "Extractive",
            Mode::Generative => "Generative",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mode '{0}' (expected 'extractive' or 'generative')")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    /// Accepts the full name or any prefix of it, so `e` and `gen` work at the prompt.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(UnknownMode(String::new()));
        }
        if "extractive".starts_with(&input) {
            Ok(Mode::Extractive)
        } else if "generative".starts_with(&input) {
            Ok(Mode::Generative)
        } else {
            Err(UnknownMode(s.trim().to_string()))
        }
    }
}

pub async fn answer_extractive(
    model: &impl ExtractiveModel,
    question: &str,
    context: &str,
) -> Result<String, InferenceError> {
    validate(question, context)?;
    info!(model = model.model_id(), "extractive answer");
    let span = model.infer(question, context).await?;
    debug!(score = span.score, start = ?span.start, end = ?span.end, "span selected");
    Ok(span.answer)
}

pub async fn answer_generative(
    model: &impl GenerativeModel,
    question: &str,
    context: &str,
) -> Result<String, InferenceError> {
    validate(question, context)?;
    info!(model = model.model_id(), "generative answer");
    let prompt = build_prompt(question, context);
    let generated = model.generate(&prompt, &GENERATION_PARAMS).await?;
    Ok(extract_generated_answer(&generated).to_string())
}

fn validate(question: &str, context: &str) -> Result<(), InferenceError> {
    if question.trim().is_empty() {
        return Err(InferenceError::InvalidInput("question must not be empty".into()));
    }
    if context.trim().is_empty() {
        return Err(InferenceError::InvalidInput("article has no text to answer from".into()));
    }
    Ok(())
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}\n{ANSWER_MARKER}")
}

/// Text after the last `Answer:` marker, trimmed; the whole text when the marker is absent.
pub fn extract_generated_answer(generated: &str) -> &str {
    generated
        .rsplit_once(ANSWER_MARKER)
        .map_or(generated, |(_, answer)| answer)
        .trim()
}
