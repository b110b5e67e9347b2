//! Interactive editor loop: collect source lines, compile on `.run`, repeat until EOF or quit.
//!
//! The same reader serves both source lines and program input, so a run that waits for input
//! reads its answers from the lines that follow `.run`. Commands still work while a run waits:
//! `.show` lists the buffer and keeps waiting, `.clear` and `.quit` drop the run, and `.run`
//! starts it over.

use std::io::{self, Write};

use async_trait::async_trait;
use compila::{Controller, Event};
use tokio::io::AsyncBufRead;

use cli::{run_program, CompileBackend, ConsoleView, InputSource, LineInput, RunError};

const BANNER: &str = "compila: type source lines, then .run (.show lists, .clear resets, .quit leaves)";

#[derive(Debug, PartialEq, Eq)]
enum ReplLine {
    Run,
    Clear,
    Show,
    Quit,
    Source(String),
}

fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), ".quit" | ".exit" | "/quit")
}

fn parse_line(line: String) -> ReplLine {
    if is_quit_command(&line) {
        return ReplLine::Quit;
    }
    match line.trim() {
        ".run" => ReplLine::Run,
        ".clear" => ReplLine::Clear,
        ".show" => ReplLine::Show,
        _ => ReplLine::Source(line),
    }
}

fn show_buffer<W: Write>(out: &mut W, buffer: &[String]) -> io::Result<()> {
    for (i, l) in buffer.iter().enumerate() {
        writeln!(out, "{:>3} | {}", i + 1, l)?;
    }
    Ok(())
}

/// Program input read from the REPL lines. Any command other than `.show` ends the wait and is
/// kept in `interrupt` for the loop to act on once the run returns.
struct ReplInput<'a, R, W> {
    lines: &'a mut LineInput<R>,
    out: &'a mut W,
    buffer: &'a [String],
    interrupt: Option<ReplLine>,
}

#[async_trait]
impl<R, W> InputSource for ReplInput<'_, R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn next_input(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        while let Some(line) = self.lines.read_line().await? {
            match parse_line(line) {
                ReplLine::Source(value) => return Ok(Some(value)),
                ReplLine::Show => {
                    show_buffer(&mut *self.out, self.buffer)?;
                    self.out.flush()?;
                }
                cmd => {
                    tracing::debug!(?cmd, "command while awaiting input");
                    self.interrupt = Some(cmd);
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }
}

/// Runs the REPL until EOF or a quit command.
///
/// Local validation errors (e.g. `.run` on an empty buffer) are reported on `out` and the loop
/// continues. Only I/O failures end it early.
pub async fn run_repl_loop<R, W>(
    backend: &dyn CompileBackend,
    lines: &mut LineInput<R>,
    view: &mut dyn ConsoleView,
    out: &mut W,
) -> Result<(), RunError>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    let mut controller = Controller::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut pending: Option<ReplLine> = None;
    writeln!(out, "{}", BANNER)?;

    loop {
        let cmd = match pending.take() {
            Some(cmd) => cmd,
            None => match lines.read_line().await? {
                Some(line) => parse_line(line),
                None => break,
            },
        };
        match cmd {
            ReplLine::Quit => break,
            ReplLine::Source(l) => buffer.push(l),
            ReplLine::Show => show_buffer(&mut *out, &buffer)?,
            ReplLine::Clear => {
                controller.dispatch(Event::Clear)?;
                view.render(controller.console())?;
                buffer.clear();
                writeln!(out, "(cleared)")?;
            }
            ReplLine::Run => {
                if !controller.compile_enabled() {
                    writeln!(out, "a compile request is still in flight")?;
                    continue;
                }
                let mut input = ReplInput {
                    lines: &mut *lines,
                    out: &mut *out,
                    buffer: &buffer,
                    interrupt: None,
                };
                let result =
                    run_program(backend, &mut controller, buffer.join("\n"), &mut input, view)
                        .await;
                pending = input.interrupt;
                match result {
                    Ok(outcome) => tracing::info!(?outcome, "repl run finished"),
                    Err(RunError::Session(e)) => writeln!(out, "{}", e)?,
                    Err(e) => return Err(e),
                }
            }
        }
        out.flush()?;
    }
    writeln!(out, "Bye.")?;
    Ok(())
}
