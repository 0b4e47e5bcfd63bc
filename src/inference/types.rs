use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct QuestionAnsweringRequest<'a> {
    pub inputs: QuestionAnsweringInputs<'a>,
}

#[derive(Debug, Serialize)]
pub struct QuestionAnsweringInputs<'a> {
    pub question: &'a str,
    pub context: &'a str,
}

/// The hosted pipeline answers with a single object, some deployments wrap it in a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum QuestionAnsweringResponse {
    Single(SpanAnswer),
    Ranked(Vec<SpanAnswer>),
}

impl QuestionAnsweringResponse {
    pub fn best(self) -> Option<SpanAnswer> {
        match self {
            Self::Single(answer) => Some(answer),
            Self::Ranked(answers) => answers.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpanAnswer {
    pub answer: String,
    #[serde(default)]
    pub score: f64,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerationParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: Option<serde_json::Value>,
    pub estimated_time: Option<f64>,
}

impl ApiError {
    pub fn message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            other => Some(other.to_string()),
        }
    }
}
