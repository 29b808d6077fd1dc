//! Built-in suite runner
//!
//! Plays the part of an external test framework: it registers the generated
//! test cases and runs them in order between suite setup and teardown.

mod runner;

pub use runner::{run_suite, CaseReport, RunOptions, SuiteReport};
