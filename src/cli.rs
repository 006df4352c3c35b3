//! CLI module containing the main entry point logic.
//!
//! This module is separated from main.rs so the whole startup sequence can
//! be driven from tests with an explicit argument vector.

use clap::Parser as ClapParser;

use crate::interpreter::Interpreter;
use crate::output::Diag;
use crate::{config, runner, scriptfile, signal, startup, translator, verbosity};

/// Turns the debug condition on when set to a non-empty value.
pub const DEBUG_ENV: &str = "RILL_DEBUG";

/// CLI arguments for the rill tool.
///
/// Every token is forwarded to the interpreter untouched, so clap's own
/// help/version handling is disabled: `help`, `-h` and `version` are
/// interpreter commands here, not flags.
#[derive(ClapParser)]
#[command(name = "rill")]
#[command(about = "A command-line front-end for the rill pipeline interpreter")]
#[command(long_about = None)]
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Raw interpreter tokens, passed through verbatim.
    #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// Main CLI logic; returns the process exit code.
#[must_use]
pub fn run_cli() -> i32 {
    let cli = Cli::parse();
    run_with_args(&cli.tokens)
}

/// Run one full invocation with an explicit argument vector.
#[must_use]
pub fn run_with_args(tokens: &[String]) -> i32 {
    // Select the diagnostic stream before anything can print.
    let debug = debug_condition(tokens);
    init_logging(debug);
    let output = Diag::new(debug);

    // Set fallback for segfault signals.
    signal::install();

    // Init resources folder.
    if let Err(err) = config::ensure_resource_dir() {
        output.emit(&format!("\n[rill] Unable to create resources folder ({err}).\n"));
    }

    // Declare the main interpreter instance.
    let mut interpreter = Interpreter::new(output);
    interpreter.set_variable("_host", "cli");
    if let Err(err) = interpreter.add_commands("cli_start : \n", None) {
        unreachable!("startup marker failed to register: {err}");
    }

    // Load startup command files.
    let startup = startup::load_startup_files(&mut interpreter);

    // Determine special mode for running .rill files as scripts.
    interpreter.allow_entrypoint = scriptfile::detect(tokens, output);

    // Determine initial verbosity.
    interpreter.verbosity = verbosity::resolve(tokens, interpreter.allow_entrypoint);

    // Convert the argument vector into one script and launch the interpreter.
    let script = translator::assemble(tokens, &startup);
    log::debug!("assembled script: {script}");
    let outcome = runner::execute(&mut interpreter, &script);
    runner::report(outcome, interpreter.verbosity, &startup, output)
}

/// The debug condition: a `debug`/`-debug` token, or the debug environment
/// variable set non-empty.
#[must_use]
pub fn debug_condition(tokens: &[String]) -> bool {
    tokens.iter().any(|t| t == "debug" || t == "-debug")
        || std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty())
}

fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter));
    if debug {
        builder.target(env_logger::Target::Stdout);
    }
    builder.format_timestamp(None);
    let _ = builder.try_init();
}
