//! The pipeline-command interpreter driven by the CLI front-end.
//!
//! The front-end consumes exactly three operations: register command
//! definitions ([`Interpreter::add_commands`]), execute a script producing a
//! final status or error ([`Interpreter::run`]), and look up help text for a
//! command name ([`Interpreter::print_help`]). Everything else in this module
//! exists to make those three behave.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;

use crate::output::Diag;

mod commands;
mod execution;
mod help;

/// Command name a script file may define to receive CLI-supplied parameters.
pub const ENTRYPOINT: &str = "_main_";

/// Filename extension of command/script files.
pub const SCRIPT_EXTENSION: &str = "rill";

/// Baseline command set registered into every non-bare interpreter.
const STDLIB: &str = include_str!("../stdlib.rill");

/// A command-definition source that could not be registered.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A line that is neither a definition head, a continuation, a comment
    /// nor blank.
    #[error("line {line}: not a command definition: '{text}'")]
    MalformedDefinition {
        /// 1-indexed source line.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },
}

/// A failure raised during script execution.
///
/// The carried message is human-readable; the formatted status text the
/// front-end classifies lives on [`Interpreter::status`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RunError {
    /// Human-readable description of the failure.
    pub message: String,
    /// Name of the offending command, when one is known.
    pub command: Option<String>,
}

/// One registered command definition.
#[derive(Debug, Clone)]
pub struct CommandDef {
    /// The name as written at the definition site.
    pub name: String,
    /// Unsubstituted body text.
    pub body: String,
    /// True when the body references positional arguments.
    pub has_arguments: bool,
}

/// Result of registering one command-definition source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationOutcome {
    /// Number of definitions merged into the registration set.
    pub added: usize,
    /// True when the source defines the protected entry-point command.
    pub defines_entrypoint: bool,
}

/// One interpreter context: a registration set plus the mutable run state
/// the front-end configures before execution.
///
/// The process owns exactly one long-lived instance; disposable instances
/// are constructed for file pre-scanning and help fallback and never share
/// state with it except by explicit registration transfer.
pub struct Interpreter {
    commands: BTreeMap<String, CommandDef>,
    docs: BTreeMap<String, String>,
    variables: HashMap<String, String>,
    call_stack: Vec<String>,
    output: Diag,
    /// Diagnostic verbosity; consumed by failure reporting.
    pub verbosity: i32,
    /// Whether a script file's entry-point command may be invoked.
    pub allow_entrypoint: bool,
    /// Formatted status text of the last failure, empty after success.
    pub status: String,
}

impl Interpreter {
    /// An interpreter carrying the baseline command set.
    #[must_use]
    pub fn new(output: Diag) -> Self {
        let mut interpreter = Self::bare(output);
        if let Err(err) = interpreter.add_commands(STDLIB, None) {
            unreachable!("embedded baseline set failed to register: {err}");
        }
        interpreter
    }

    /// An interpreter with an empty registration set, used for isolated
    /// pre-scanning of script files.
    #[must_use]
    pub fn bare(output: Diag) -> Self {
        Self {
            commands: BTreeMap::new(),
            docs: BTreeMap::new(),
            variables: HashMap::new(),
            call_stack: Vec::new(),
            output,
            verbosity: 1,
            allow_entrypoint: false,
            status: String::new(),
        }
    }

    /// Register every definition contained in `source`.
    ///
    /// Registration is two-phase: the whole source is parsed before anything
    /// is merged, so a malformed source leaves the registration set
    /// untouched. Later definitions override earlier ones of the same name.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `source` contains a line that cannot belong to a
    /// command definition.
    pub fn add_commands(
        &mut self,
        source: &str,
        origin: Option<&Path>,
    ) -> Result<RegistrationOutcome, EngineError> {
        let parsed = commands::parse_definitions(source)?;
        if let Some(path) = origin {
            log::debug!(
                "registering {} commands from '{}'",
                parsed.definitions.len(),
                path.display()
            );
        }
        let added = parsed.definitions.len();
        let mut defines_entrypoint = false;
        for definition in parsed.definitions {
            defines_entrypoint |= definition.name.eq_ignore_ascii_case(ENTRYPOINT);
            self.commands
                .insert(definition.name.to_ascii_lowercase(), definition);
        }
        for (name, text) in parsed.docs {
            self.docs.insert(name.to_ascii_lowercase(), text);
        }
        Ok(RegistrationOutcome {
            added,
            defines_entrypoint,
        })
    }

    /// Case-insensitive lookup in the sorted registration set.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&CommandDef> {
        self.commands.get(&name.to_ascii_lowercase())
    }

    /// Registered command names, in sorted order.
    #[must_use]
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.values().map(|d| d.name.as_str()).collect()
    }

    /// Set an interpreter variable, available to command bodies as
    /// `${name}`.
    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    /// Read back an interpreter variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    fn scope(&self) -> String {
        if self.call_stack.is_empty() {
            "./".to_string()
        } else {
            format!("./{}/", self.call_stack.join("/"))
        }
    }

    fn fail(&mut self, command: Option<&str>, message: String) -> RunError {
        self.status = format!("*** Error in {} *** {message}", self.scope());
        RunError {
            message,
            command: command.map(str::to_string),
        }
    }
}

/// True when `path` has the extension command files carry: none, or the
/// script extension exactly.
#[must_use]
pub fn matches_script_extension(path: &Path) -> bool {
    match path.extension() {
        None => true,
        Some(ext) => ext
            .to_str()
            .is_some_and(|e| e.is_empty() || e == SCRIPT_EXTENSION),
    }
}
