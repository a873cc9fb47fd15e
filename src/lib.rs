//! Golden-output regression harness
//!
//! Runs sample programs as subprocesses and checks that head and tail
//! windows of their standard output match checked-in golden transcripts.

pub mod cli;
pub mod commands;
pub mod common;
pub mod fixtures;
pub mod golden;
pub mod process;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use golden::{CapturedOutput, FinalSegment, GoldenStore, Window};
pub use process::{Invocation, ProcessRunner};
