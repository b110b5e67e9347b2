//! Where answers to program prompts come from.
//!
//! [`LineInput`] reads lines from any async reader (stdin in the binary). [`PresetInput`] answers
//! from `-i/--input` values first and then either falls back to another source or reports end of
//! input (`--no-interactive`).

use std::collections::VecDeque;
use std::io::{self, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

#[async_trait]
pub trait InputSource: Send {
    /// Next answer for `prompt`. `Ok(None)` means no more input will come.
    async fn next_input(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Line reader. Optionally writes a `> ` marker before each read (the binary sends it to stderr
/// when stdin is a terminal, so stdout stays clean for program output and `--json`).
pub struct LineInput<R> {
    lines: Lines<R>,
    marker: Option<Box<dyn Write + Send>>,
}

impl<R: AsyncBufRead + Unpin + Send> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            marker: None,
        }
    }

    pub fn with_marker(mut self, out: impl Write + Send + 'static) -> Self {
        self.marker = Some(Box::new(out));
        self
    }

    /// Reads one line without the trailing newline (and `\r`). `None` at EOF.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(m) = self.marker.as_mut() {
            m.write_all(b"> ")?;
            m.flush()?;
        }
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.strip_suffix('\r').map(str::to_string).unwrap_or(l)))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> InputSource for LineInput<R> {
    async fn next_input(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        self.read_line().await
    }
}

/// Pre-supplied answers, consumed in order.
pub struct PresetInput {
    answers: VecDeque<String>,
    fallback: Option<Box<dyn InputSource>>,
    echo: bool,
}

impl PresetInput {
    pub fn new(answers: impl IntoIterator<Item = String>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: None,
            echo: false,
        }
    }

    /// Source asked once the presets run out.
    pub fn with_fallback(mut self, fallback: Box<dyn InputSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Print `> value` on stdout for each preset answer used, so transcripts read like a session.
    pub fn with_echo(mut self, on: bool) -> Self {
        self.echo = on;
        self
    }
}

#[async_trait]
impl InputSource for PresetInput {
    async fn next_input(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if let Some(answer) = self.answers.pop_front() {
            tracing::debug!(prompt, remaining = self.answers.len(), "preset input used");
            if self.echo {
                println!("> {}", answer);
            }
            return Ok(Some(answer));
        }
        match self.fallback.as_mut() {
            Some(f) => f.next_input(prompt).await,
            None => Ok(None),
        }
    }
}
