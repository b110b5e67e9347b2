//! compila CLI binary: compile and run toy-language programs against a `/compilar` service.
//!
//! Subcommands: `run` (one program to completion, answering prompts from `-i` values or stdin) and
//! `repl` (interactive source buffer).

mod log_format;
mod logging;
mod repl;

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cli::{
    run_program, save_image, HttpBackend, LineInput, PresetInput, PromptView, RunOutcome,
    TerminalView,
};
use compila::{Console, Controller};
use config::Settings;
use tokio::io::{BufReader, Stdin};

const APP_NAME: &str = "compila";

#[derive(Parser, Debug)]
#[command(name = "compila")]
#[command(about = "compila: compile and run programs on a remote /compilar service")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Service endpoint (default: COMPILA_ENDPOINT, config file, or http://127.0.0.1:5000/compilar)
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Verbose: print each round trip on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile and run one program (FILE, or - for stdin)
    Run(RunArgs),
    /// Interactive source buffer: type lines, then .run
    Repl,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Source file, or - to read the program from stdin
    #[arg(value_name = "FILE")]
    file: String,

    /// Answer for the next input prompt (repeatable, used in order)
    #[arg(short, long = "input", value_name = "VALUE")]
    inputs: Vec<String>,

    /// Fail instead of reading stdin when the -i values run out
    #[arg(long)]
    no_interactive: bool,

    /// Print the token table of the first round
    #[arg(long)]
    tokens: bool,

    /// Directory for rendered images (default: COMPILA_IMAGE_DIR, config file, or temp dir)
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Print the final console as JSON instead of rendering it
    #[arg(long)]
    json: bool,

    /// With --json, pretty-print
    #[arg(long)]
    pretty: bool,
}

/// Reads the program text. `-` reads all of stdin, which is then no longer available for input.
fn read_source(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        Ok(s)
    } else {
        std::fs::read_to_string(file)
    }
}

/// Stdin as a line source, with the `> ` marker on stderr when a person is typing.
fn stdin_lines() -> LineInput<BufReader<Stdin>> {
    let lines = LineInput::new(BufReader::new(tokio::io::stdin()));
    if std::io::stdin().is_terminal() {
        lines.with_marker(std::io::stderr())
    } else {
        lines
    }
}

fn image_dir(flag: Option<PathBuf>, settings: &Settings) -> PathBuf {
    flag.or_else(|| settings.image_dir.clone())
        .unwrap_or_else(std::env::temp_dir)
}

fn json_report(
    console: &Console,
    outcome: RunOutcome,
    image_path: Option<&Path>,
    pretty: bool,
) -> Result<String, serde_json::Error> {
    let value = serde_json::json!({
        "outcome": outcome,
        "console": console,
        "image_path": image_path,
    });
    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
}

async fn cmd_run(
    args: RunArgs,
    backend: &HttpBackend,
    settings: &Settings,
    verbose: bool,
) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let from_stdin = args.file == "-";
    let source = read_source(&args.file)?;
    let dir = image_dir(args.image_dir, settings);

    let mut input = PresetInput::new(args.inputs).with_echo(!args.json);
    if !args.no_interactive && !from_stdin {
        input = input.with_fallback(Box::new(stdin_lines()));
    }

    let mut controller = Controller::new();
    let outcome = if args.json {
        let mut view = PromptView::new(std::io::stderr());
        run_program(backend, &mut controller, source, &mut input, &mut view).await?
    } else {
        let mut view = TerminalView::new(std::io::stdout(), dir.clone())
            .with_tokens(args.tokens)
            .with_verbose(verbose);
        run_program(backend, &mut controller, source, &mut input, &mut view).await?
    };

    if args.json {
        let path = save_image(controller.console(), &dir)?;
        println!(
            "{}",
            json_report(controller.console(), outcome, path.as_deref(), args.pretty)?
        );
    }
    if outcome == RunOutcome::Abandoned {
        eprintln!("compila: input ended while the program was waiting for a value");
    }
    Ok(outcome)
}

async fn cmd_repl(
    backend: &HttpBackend,
    settings: &Settings,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = stdin_lines();
    let mut view =
        TerminalView::new(std::io::stdout(), image_dir(None, settings)).with_verbose(verbose);
    let mut out = std::io::stdout();
    repl::run_repl_loop(backend, &mut lines, &mut view, &mut out).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply(APP_NAME, None)?;
    logging::init()?;

    let args = Args::parse();

    let mut settings = Settings::load(APP_NAME)?;
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
    }
    let backend = HttpBackend::from_settings(&settings)?;
    tracing::info!(endpoint = %backend.endpoint(), "compila starting");

    let result = match args.cmd {
        Command::Run(run_args) => cmd_run(run_args, &backend, &settings, args.verbose)
            .await
            .map(RunOutcome::is_success),
        Command::Repl => cmd_repl(&backend, &settings, args.verbose).await.map(|_| true),
    };
    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("compila: {}", e);
            std::process::exit(1);
        }
    }
}
