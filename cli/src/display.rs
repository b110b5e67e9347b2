//! Terminal rendering of the [`Console`] panel.
//!
//! Each round trip replays the program, so a response repeats the output already shown. The
//! terminal view remembers what it printed for the current run and prints only the new tail; if a
//! replay diverges from what was shown, it says so and prints the whole output again.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use compila::{Console, ConsoleStatus, Outbound, RunId, Token};

/// Widest lexeme column in the token table.
const LEXEME_WIDTH: usize = 24;

/// Truncates a string to at most `max` chars; appends "..." when truncated. UTF-8 safe.
pub(crate) fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    let suffix_len = 3;
    if max <= suffix_len {
        return s.chars().take(max).collect();
    }
    let content_max = max - suffix_len;
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!(
        "{}{}",
        s.chars().take(content_max).collect::<String>(),
        SUFFIX
    )
}

/// Renders the token table: one `lexeme  CATEGORY` row per token.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut lines = vec![format!("Tokens ({}):", tokens.len())];
    for t in tokens {
        lines.push(format!(
            "  {:<width$} {}",
            truncate_display(&t.lexeme, LEXEME_WIDTH),
            t.category,
            width = LEXEME_WIDTH
        ));
    }
    lines.join("\n")
}

/// Writes the console image (if any) to `dir` as `compila-run<run>-<round>.<ext>`.
///
/// `round` is the number of inputs answered before the image was produced.
pub fn save_image(console: &Console, dir: &Path) -> io::Result<Option<PathBuf>> {
    let (Some(image), Some(run)) = (&console.image, console.run) else {
        return Ok(None);
    };
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "compila-run{}-{}.{}",
        run.0,
        console.echoed_inputs.len(),
        image.kind.extension()
    ));
    std::fs::write(&path, &image.bytes)?;
    Ok(Some(path))
}

/// Something that shows the console as the run progresses.
pub trait ConsoleView: Send {
    /// Called after every state change of the controller that affects the console.
    fn render(&mut self, console: &Console) -> io::Result<()>;

    /// Called just before a request goes out.
    fn request_sent(&mut self, _out: &Outbound) -> io::Result<()> {
        Ok(())
    }
}

/// Shows only input prompts. Used with `--json`, where the final console is printed once on
/// stdout and the prompts go to stderr.
pub struct PromptView<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> PromptView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ConsoleView for PromptView<W> {
    fn render(&mut self, console: &Console) -> io::Result<()> {
        if console.status != Some(ConsoleStatus::AwaitingInput) {
            return Ok(());
        }
        if let Some(p) = &console.prompt {
            writeln!(self.out, "{}", p)?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Incremental plain-text renderer.
pub struct TerminalView<W: Write + Send> {
    out: W,
    image_dir: PathBuf,
    show_tokens: bool,
    verbose: bool,
    run: Option<RunId>,
    printed: Vec<String>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, image_dir: PathBuf) -> Self {
        Self {
            out,
            image_dir,
            show_tokens: false,
            verbose: false,
            run: None,
            printed: Vec::new(),
        }
    }

    pub fn with_tokens(mut self, on: bool) -> Self {
        self.show_tokens = on;
        self
    }

    pub fn with_verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_output(&mut self, output: &[String]) -> io::Result<()> {
        if !output.starts_with(&self.printed) {
            writeln!(
                self.out,
                "(program output changed on replay; showing it again)"
            )?;
            self.printed.clear();
        }
        for line in &output[self.printed.len()..] {
            writeln!(self.out, "{}", line)?;
        }
        self.printed = output.to_vec();
        Ok(())
    }

    fn render_finish(&mut self, console: &Console) -> io::Result<()> {
        for a in &console.actions {
            writeln!(self.out, "· {}", a)?;
        }
        if let Some(image) = &console.image {
            let label = if image.kind.is_animated() {
                format!("{}, animated", image.kind.mime())
            } else {
                image.kind.mime().to_string()
            };
            match save_image(console, &self.image_dir)? {
                Some(path) => writeln!(
                    self.out,
                    "[{}, {} bytes: {}]",
                    label,
                    image.size,
                    path.display()
                )?,
                None => writeln!(self.out, "[{}, {} bytes]", label, image.size)?,
            }
        }
        if let Some(d) = &console.diagnostics {
            match &d.message {
                Some(m) => writeln!(self.out, "{}: {}", d.kind.header(), m)?,
                None => writeln!(self.out, "{}:", d.kind.header())?,
            }
            for line in &d.lines {
                writeln!(self.out, "  {}", line)?;
            }
        }
        if self.show_tokens && !console.tokens.is_empty() {
            writeln!(self.out, "{}", format_tokens(&console.tokens))?;
        }
        Ok(())
    }
}

impl<W: Write + Send> ConsoleView for TerminalView<W> {
    fn render(&mut self, console: &Console) -> io::Result<()> {
        if console.run != self.run {
            self.run = console.run;
            self.printed.clear();
        }
        let Some(status) = console.status else {
            return Ok(());
        };
        self.render_output(&console.output)?;
        match status {
            ConsoleStatus::Running => {}
            ConsoleStatus::AwaitingInput => {
                if let Some(p) = &console.prompt {
                    writeln!(self.out, "{}", p)?;
                }
            }
            ConsoleStatus::Succeeded | ConsoleStatus::Failed => self.render_finish(console)?,
        }
        self.out.flush()
    }

    fn request_sent(&mut self, out: &Outbound) -> io::Result<()> {
        if self.verbose {
            eprintln!(
                "[{} round {}] POST with {} input(s)",
                out.tag.run,
                out.tag.round,
                out.request.inputs.len()
            );
        }
        Ok(())
    }
}
