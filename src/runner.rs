//! Execution and failure adaptation.
//!
//! The assembled script runs against the main interpreter; anything it
//! raises is classified into either a status-coded termination (the script
//! chose its own exit code, nothing is printed) or a diagnostic failure
//! (message, best-effort contextual help, exit code -1).

use log::debug;

use crate::interpreter::{Interpreter, RunError};
use crate::output::Diag;
use crate::startup::StartupFiles;
use crate::verbosity::parse_coded_int;

/// Classified result of one script execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The script completed; the process exits 0.
    Success,
    /// The script terminated itself with an explicit exit code embedded in
    /// the status text; no diagnostics are printed.
    StatusCoded(i32),
    /// An unexpected failure worth a diagnostic and a help lookup.
    Diagnostic {
        /// Human-readable failure message.
        message: String,
        /// Offending command name, when known.
        command: Option<String>,
    },
}

/// Which help path produced output for a diagnostic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpPath {
    /// The merged lookup (startup files re-registered) succeeded.
    Contextual,
    /// The merged lookup failed; the baseline-only fallback ran.
    Baseline,
}

/// Run `script` on `interpreter` and classify the result.
pub fn execute(interpreter: &mut Interpreter, script: &str) -> RunOutcome {
    match interpreter.run(script) {
        Ok(()) => RunOutcome::Success,
        Err(err) => classify(&interpreter.status, err),
    }
}

/// Classify a raised failure by scanning the interpreter's status text.
#[must_use]
pub fn classify(status: &str, err: RunError) -> RunOutcome {
    match parse_status_code(status) {
        Some(code) => RunOutcome::StatusCoded(code),
        None => RunOutcome::Diagnostic {
            message: err.message,
            command: err.command,
        },
    }
}

/// Extract the embedded exit code from a status text: two `***` markers,
/// with the text at the second parsing as an integer followed by at most one
/// trailing character.
#[must_use]
pub fn parse_status_code(status: &str) -> Option<i32> {
    let first = status.find("***")?;
    let rest = &status[first + 3..];
    let second = rest.find("***")?;
    parse_coded_int(&rest[second + 3..])
}

/// Print the diagnostics for a classified outcome and return the process
/// exit code.
pub fn report(outcome: RunOutcome, verbosity: i32, startup: &StartupFiles, output: Diag) -> i32 {
    match outcome {
        RunOutcome::Success => 0,
        RunOutcome::StatusCoded(code) => code,
        RunOutcome::Diagnostic { message, command } => {
            if verbosity <= 0 {
                output.emit(&format!("\n[rill] {}", output.emphasize(&message)));
            }
            match command {
                Some(name) => {
                    output.emit(&format!(
                        "\n[rill] Command '{name}' has the following description: \n"
                    ));
                    lookup_help(&name, startup, output);
                }
                None => output.emit("\n\n"),
            }
            -1
        }
    }
}

/// Best-effort contextual help for the offending command.
///
/// A disposable interpreter re-registers the auto-update and user files
/// (each guarded so a registration failure is swallowed), then invokes the
/// help facility against the merged set. When that attempt itself raises
/// (e.g. a malformed overridden help command), fall back to the baseline
/// built-in set only; a failure of the fallback is swallowed too.
pub fn lookup_help(name: &str, startup: &StartupFiles, output: Diag) -> HelpPath {
    let script = format!(
        "local[] command \"{}\" onfail done local[] command \"{}\" onfail done help \"{name}\"",
        startup.update_path.display(),
        startup.user_path.display(),
    );
    let mut merged = Interpreter::new(output);
    if merged.run(&script).is_ok() {
        return HelpPath::Contextual;
    }
    debug!("contextual help lookup failed; falling back to the baseline set");
    let mut baseline = Interpreter::new(output);
    if let Err(err) = baseline.run(&format!("help \"{name}\"")) {
        debug!("baseline help lookup failed too: {}", err.message);
    }
    HelpPath::Baseline
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::startup::LoadOutcome;
    use std::path::{Path, PathBuf};

    fn startup_with(update: &Path, user: &Path) -> StartupFiles {
        StartupFiles {
            update_path: update.to_path_buf(),
            user_path: user.to_path_buf(),
            update: LoadOutcome::Absent,
            user: LoadOutcome::Absent,
        }
    }

    fn absent_startup() -> StartupFiles {
        startup_with(
            &PathBuf::from("/no/update.rill"),
            &PathBuf::from("/no/.rill"),
        )
    }

    #[test]
    fn test_parse_status_code_variants() {
        assert_eq!(
            parse_status_code("*** Termination requested *** 3"),
            Some(3)
        );
        assert_eq!(
            parse_status_code("*** Termination requested *** -7"),
            Some(-7)
        );
        assert_eq!(
            parse_status_code("*** Error in ./ *** Unknown command 'x'."),
            None
        );
        assert_eq!(parse_status_code("no markers at all"), None);
        assert_eq!(parse_status_code("only one *** marker"), None);
        // Digits followed by more text are a message, not a code.
        assert_eq!(
            parse_status_code("*** Error in ./ *** 3 things went wrong"),
            None
        );
    }

    #[test]
    fn test_classify_status_coded() {
        let err = RunError {
            message: String::new(),
            command: None,
        };
        assert_eq!(
            classify("*** Termination requested *** 3", err),
            RunOutcome::StatusCoded(3)
        );
    }

    #[test]
    fn test_classify_without_marker_is_diagnostic() {
        let err = RunError {
            message: "boom".to_string(),
            command: Some("blur".to_string()),
        };
        let outcome = classify("something odd with no markers", err);
        assert_eq!(
            outcome,
            RunOutcome::Diagnostic {
                message: "boom".to_string(),
                command: Some("blur".to_string()),
            }
        );
    }

    #[test]
    fn test_execute_success() {
        let mut interp = Interpreter::new(Diag::plain());
        interp.add_commands("cli_start : \n", None).unwrap();
        assert_eq!(execute(&mut interp, "cli_start ,"), RunOutcome::Success);
    }

    #[test]
    fn test_execute_unknown_command_is_diagnostic() {
        let mut interp = Interpreter::new(Diag::plain());
        match execute(&mut interp, "nosuchthing") {
            RunOutcome::Diagnostic { command, .. } => {
                assert_eq!(command.as_deref(), Some("nosuchthing"));
            }
            other => panic!("expected a diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn test_execute_quit_is_status_coded() {
        let mut interp = Interpreter::new(Diag::plain());
        assert_eq!(execute(&mut interp, "quit 42"), RunOutcome::StatusCoded(42));
    }

    #[test]
    fn test_report_exit_codes() {
        let startup = absent_startup();
        assert_eq!(report(RunOutcome::Success, 1, &startup, Diag::plain()), 0);
        assert_eq!(
            report(RunOutcome::StatusCoded(3), 1, &startup, Diag::plain()),
            3
        );
        let diagnostic = RunOutcome::Diagnostic {
            message: "boom".to_string(),
            command: None,
        };
        assert_eq!(report(diagnostic, 0, &startup, Diag::plain()), -1);
    }

    #[test]
    fn test_lookup_help_uses_contextual_path() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join(".rill");
        std::fs::write(&user, "mine : print hello\n").unwrap();
        let startup = startup_with(&dir.path().join("none.rill"), &user);
        assert_eq!(
            lookup_help("mine", &startup, Diag::plain()),
            HelpPath::Contextual
        );
    }

    #[test]
    fn test_lookup_help_falls_back_on_broken_override() {
        // The user file overrides 'help' with a body that raises, so the
        // merged lookup fails and the baseline path must run exactly once.
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join(".rill");
        std::fs::write(&user, "help : error \"broken override\"\n").unwrap();
        let startup = startup_with(&dir.path().join("none.rill"), &user);
        assert_eq!(
            lookup_help("warn", &startup, Diag::plain()),
            HelpPath::Baseline
        );
    }

    #[test]
    fn test_lookup_help_survives_missing_files() {
        let startup = absent_startup();
        assert_eq!(
            lookup_help("warn", &startup, Diag::plain()),
            HelpPath::Contextual
        );
    }
}
