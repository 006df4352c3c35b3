//! # rill
//!
//! A command-line front-end for the rill pipeline interpreter: the process
//! arguments are translated into a single script, handed to the interpreter,
//! and the interpreter's outcome is mapped back onto stdout/stderr text and
//! the process exit code.
//!
//! ## Usage
//!
//! - Run a pipeline: `rill print "hello"`
//! - Run a script file: `rill myscript.rill [argument]`
//! - Inspect a command: `rill help warn`
//!
//! See README.md for more details and examples.

/// Entry point for the CLI tool.
fn main() {
    std::process::exit(rill::cli::run_cli());
}
