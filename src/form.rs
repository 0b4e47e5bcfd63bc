//! Form surfaces: where submissions come from and where rendered outcomes go.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::answer::Mode;
use crate::inference::ModelLoader;
use crate::session::{Query, Session, SessionState, Submission};
use crate::wiki::{ContentSource, Language};

const QUIT: &str = ":q";

pub trait FormSurface {
    /// Next explicit submission, or `None` when the user is done.
    async fn next_submission(&mut self) -> io::Result<Option<Query>>;

    async fn show(&mut self, rendered: &str) -> io::Result<()>;
}

/// Drives the form: one submission, one rendered outcome. Returns the number of submissions.
pub async fn run_form<S, L, F>(session: &Session<S, L>, form: &mut F) -> io::Result<usize>
where
    S: ContentSource,
    L: ModelLoader,
    F: FormSurface,
{
    let mut submissions = 0;
    while let Some(query) = form.next_submission().await? {
        submissions += 1;
        match session.submit(&query).await {
            Submission::Completed(rendered) => form.show(&rendered).await?,
            Submission::Ignored => debug!("submission dropped while processing"),
        }
        debug_assert_eq!(session.state(), SessionState::Idle);
    }
    Ok(submissions)
}

/// Line-oriented prompts. Each field shows its current value; an empty line keeps it.
pub struct TerminalForm<R, W> {
    input: R,
    output: W,
    current: Query,
}

impl<R, W> TerminalForm<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, initial: Query) -> Self {
        Self {
            input,
            output,
            current: initial,
        }
    }

    async fn prompt(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
        self.output
            .write_all(format!("{label} [{current}]: ").as_bytes())
            .await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let value = line.trim();
        if value == QUIT {
            return Ok(None);
        }
        Ok(Some(if value.is_empty() {
            current.to_string()
        } else {
            value.to_string()
        }))
    }

    async fn prompt_parsed<T>(&mut self, label: &str, current: T) -> io::Result<Option<T>>
    where
        T: std::str::FromStr + std::fmt::Display + Copy,
        T::Err: std::fmt::Display,
    {
        loop {
            let Some(raw) = self.prompt(label, &current.to_string()).await? else {
                return Ok(None);
            };
            match raw.parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    self.output.write_all(format!("  {e}\n").as_bytes()).await?;
                }
            }
        }
    }
}

impl<R, W> FormSurface for TerminalForm<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn next_submission(&mut self) -> io::Result<Option<Query>> {
        self.output
            .write_all("\n🌐 WikiSageQA: Multilingual Wikipedia Question Answering (:q to quit)\n".as_bytes())
            .await?;

        let topic = self.current.topic.clone();
        let Some(topic) = self.prompt("🔍 Wikipedia Topic", &topic).await? else {
            return Ok(None);
        };
        let Some(language) = self
            .prompt_parsed::<Language>("🌐 Language (en/hi/fr/es/de)", self.current.language)
            .await?
        else {
            return Ok(None);
        };
        let question = self.current.question.clone();
        let Some(question) = self.prompt("❓ Your Question", &question).await? else {
            return Ok(None);
        };
        let Some(mode) = self
            .prompt_parsed::<Mode>("⚙️ QA Mode (extractive/generative)", self.current.mode)
            .await?
        else {
            return Ok(None);
        };

        self.current = Query {
            topic,
            language,
            question,
            mode,
        };
        self.output.write_all("🔄 Getting answer...\n".as_bytes()).await?;
        self.output.flush().await?;
        Ok(Some(self.current.clone()))
    }

    async fn show(&mut self, rendered: &str) -> io::Result<()> {
        self.output.write_all(rendered.as_bytes()).await?;
        if !rendered.ends_with('\n') {
            self.output.write_all(b"\n").await?;
        }
        self.output.flush().await
    }
}

/// Submits a single pre-filled query without prompting.
pub struct PrefilledForm<W> {
    query: Option<Query>,
    output: W,
}

impl<W: AsyncWrite + Unpin> PrefilledForm<W> {
    pub fn new(query: Query, output: W) -> Self {
        Self {
            query: Some(query),
            output,
        }
    }
}

impl<W: AsyncWrite + Unpin> FormSurface for PrefilledForm<W> {
    async fn next_submission(&mut self) -> io::Result<Option<Query>> {
        Ok(self.query.take())
    }

    async fn show(&mut self, rendered: &str) -> io::Result<()> {
        self.output.write_all(rendered.as_bytes()).await?;
        if !rendered.ends_with('\n') {
            self.output.write_all(b"\n").await?;
        }
        self.output.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::CountingLoader;
    use crate::session::testing::{StubSource, einstein};

    fn defaults() -> Query {
        Query {
            topic: "Albert Einstein".into(),
            language: Language::En,
            question: "What is he famous for?".into(),
            mode: Mode::Extractive,
        }
    }

    fn form(input: &str) -> TerminalForm<&[u8], Vec<u8>> {
        TerminalForm::new(input.as_bytes(), Vec::new(), defaults())
    }

    #[tokio::test]
    async fn empty_lines_keep_defaults() {
        let mut f = form("\n\n\n\n");
        let query = f.next_submission().await.unwrap().unwrap();
        assert_eq!(query, defaults());
    }

    #[tokio::test]
    async fn typed_values_replace_defaults_and_persist() {
        let mut f = form("Marie Curie\nfr\nQuand est-elle née ?\ngen\n\n\n\n\n");
        let first = f.next_submission().await.unwrap().unwrap();
        assert_eq!(first.topic, "Marie Curie");
        assert_eq!(first.language, Language::Fr);
        assert_eq!(first.question, "Quand est-elle née ?");
        assert_eq!(first.mode, Mode::Generative);

        let second = f.next_submission().await.unwrap().unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn invalid_language_reprompts() {
        let mut f = form("\nja\nde\n\n\n");
        let query = f.next_submission().await.unwrap().unwrap();
        assert_eq!(query.language, Language::De);

        let transcript = String::from_utf8(f.output).unwrap();
        assert!(transcript.contains("unsupported language 'ja'"), "got: {transcript}");
    }

    #[tokio::test]
    async fn quit_or_eof_ends_session() {
        let mut f = form(":q\n");
        assert!(f.next_submission().await.unwrap().is_none());

        let mut f = form("Berlin\nde\n");
        assert!(f.next_submission().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn run_form_renders_one_outcome_per_submission() {
        let session = Session::new(StubSource::new(einstein), CountingLoader::new());
        let mut f = form("\n\n\n\n\n\n\ngenerative\n:q\n");

        let submissions = run_form(&session, &mut f).await.unwrap();
        assert_eq!(submissions, 2);

        let transcript = String::from_utf8(f.output).unwrap();
        assert_eq!(transcript.matches("### 📘 Wikipedia Context:").count(), 2);
        assert!(transcript.contains("### 🧠 Extractive Answer (mock/extractive):"));
        assert!(transcript.contains("### 🧠 Generative Answer (mock/generative):"));
    }

    #[tokio::test]
    async fn prefilled_form_submits_exactly_once() {
        let session = Session::new(StubSource::new(einstein), CountingLoader::new());
        let mut f = PrefilledForm::new(defaults(), Vec::new());

        let submissions = run_form(&session, &mut f).await.unwrap();
        assert_eq!(submissions, 1);

        let output = String::from_utf8(f.output).unwrap();
        assert!(output.ends_with("German\n"), "got: {output}");
    }
}
