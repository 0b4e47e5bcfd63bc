use crate::answer::Mode;
use crate::inference::InferenceError;
use crate::markdown::{single_line, truncate_chars};
use crate::wiki::ContentError;

/// Characters of article text shown above the answer.
pub const CONTEXT_PREVIEW_CHARS: usize = 2000;

/// What an answer engine produced for one query.
#[derive(Debug)]
pub struct AnswerOutcome {
    pub mode: Mode,
    /// `None` when the models could not be constructed.
    pub model: Option<String>,
    pub result: Result<String, InferenceError>,
}

pub fn render_content_error(err: &ContentError) -> String {
    let mut output = format!("❌ Error: {}", single_line(&err.to_string()));
    if let ContentError::Ambiguous { options, .. } = err {
        output.push_str(". Did you mean:\n");
        for option in options {
            output.push_str(&format!("- {}\n", single_line(option)));
        }
    }
    output
}

pub fn render_answer(context: &str, outcome: &AnswerOutcome) -> String {
    let mut output = String::from("### 📘 Wikipedia Context:\n\n");
    output.push_str(&truncate_chars(context, CONTEXT_PREVIEW_CHARS));
    output.push_str("\n\n");

    match &outcome.model {
        Some(model) => output.push_str(&format!(
            "### 🧠 {} Answer ({}):\n\n",
            outcome.mode,
            single_line(model)
        )),
        None => output.push_str(&format!("### 🧠 {} Answer:\n\n", outcome.mode)),
    }

    match &outcome.result {
        Ok(answer) => output.push_str(answer),
        Err(e) => output.push_str(&format!("⚠️ {} QA Error: {e}", outcome.mode)),
    }
    output.push('\n');
    output
}
