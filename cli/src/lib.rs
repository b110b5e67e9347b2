//! compila CLI library: backend, input sources, terminal rendering and the run driver.
//!
//! Used by the `compila` binary. A run is driven by [`run_program`]: it feeds a
//! [`compila::Controller`], sends each round trip through a [`CompileBackend`], and renders the
//! console through a [`ConsoleView`].

pub mod backend;
pub mod display;
pub mod input;
pub mod run;

pub use backend::{CompileBackend, HttpBackend};
pub use display::{format_tokens, save_image, ConsoleView, PromptView, TerminalView};
pub use input::{InputSource, LineInput, PresetInput};
pub use run::{run_program, RunError, RunOutcome};
