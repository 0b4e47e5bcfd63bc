use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tokio::io::BufReader;
use tracing::info;

use crate::answer::Mode;
use crate::form::{PrefilledForm, TerminalForm, run_form};
use crate::inference::client::{
    DEFAULT_API_BASE, DEFAULT_EXTRACTIVE_MODEL, DEFAULT_GENERATIVE_MODEL, HostedLoader,
    InferenceConfig,
};
use crate::session::{Query, Session};
use crate::wiki::{Language, WikipediaClient};

/// TCP connection establishment timeout. Requests themselves have no deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

/// Ask questions about a Wikipedia article, answered by span extraction or text generation.
///
/// Inference runs on the Hugging Face Inference API; set `HF_TOKEN` for authenticated access.
#[derive(Parser, Debug)]
#[command(name = "wikisage", version, about)]
pub struct Cli {
    /// Wikipedia topic (pre-filled in the form)
    #[arg(long, default_value = "Albert Einstein")]
    pub topic: String,

    /// Wikipedia language edition
    #[arg(long, value_enum, default_value = "en")]
    pub lang: Language,

    /// Question about the topic (pre-filled in the form)
    #[arg(long, default_value = "What is he famous for?")]
    pub question: String,

    /// Answer mode
    #[arg(long, value_enum, default_value = "extractive")]
    pub mode: Mode,

    /// Answer the pre-filled query once and exit instead of prompting
    #[arg(long)]
    pub once: bool,

    /// Model used for extractive answers
    #[arg(long, env = "WIKISAGE_EXTRACTIVE_MODEL", default_value = DEFAULT_EXTRACTIVE_MODEL)]
    pub extractive_model: String,

    /// Model used for generative answers
    #[arg(long, env = "WIKISAGE_GENERATIVE_MODEL", default_value = DEFAULT_GENERATIVE_MODEL)]
    pub generative_model: String,

    /// Base URL of the inference API (model id is appended)
    #[arg(long, env = "WIKISAGE_INFERENCE_URL", default_value = DEFAULT_API_BASE)]
    pub inference_url: String,

    /// MediaWiki API endpoint template; `{lang}` is replaced by the language code
    #[arg(long, env = "WIKISAGE_WIKI_URL")]
    pub wiki_url: Option<String>,
}

impl Cli {
    pub fn query(&self) -> Query {
        Query {
            topic: self.topic.clone(),
            language: self.lang,
            question: self.question.clone(),
            mode: self.mode,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        let wiki = WikipediaClient::new(http.clone(), self.wiki_url.clone());
        let config = InferenceConfig::new(
            &self.inference_url,
            &self.extractive_model,
            &self.generative_model,
        );
        let session = Session::new(wiki, HostedLoader::new(http, config));

        let submissions = if self.once {
            let mut form = PrefilledForm::new(self.query(), tokio::io::stdout());
            run_form(&session, &mut form).await?
        } else {
            let mut form = TerminalForm::new(
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                self.query(),
            );
            run_form(&session, &mut form).await?
        };

        info!(submissions, "session ended");
        Ok(())
    }
}
