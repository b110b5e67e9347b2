//! End-to-end: the `compila` binary against a stub `/compilar` service.

mod common;
mod errors;
mod json_output;
mod prompts;
