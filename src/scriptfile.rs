//! Script-file mode detection.
//!
//! `rill file.rill [argument]` runs a command file directly. The file is
//! pre-scanned in an isolated sub-interpreter to find out whether it defines
//! the protected entry-point command, and whether that entry point declares
//! formal parameters, which decides how a second CLI argument is treated.
//! The pre-scan result is a single permission flag; it is discarded on any
//! failure.

use std::fs;
use std::path::Path;

use log::debug;

use crate::interpreter::{ENTRYPOINT, Interpreter, matches_script_extension};
use crate::output::Diag;

/// What the pre-scan discovered about the entry-point command. Never
/// outlives the invocation that discovered it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryPointDescriptor {
    /// The file defines the entry-point command.
    pub exists: bool,
    /// The entry-point body declares formal parameters.
    pub accepts_arguments: bool,
}

/// Compute the entry-point permission for this invocation.
///
/// Returns `false` unless the invocation has the script-file shape (one or
/// two trailing arguments, first one named like a script file), the file is
/// readable, it defines the entry point, and (when a second argument was
/// supplied) the entry point accepts arguments.
#[must_use]
pub fn detect(arguments: &[String], output: Diag) -> bool {
    if arguments.len() != 1 && arguments.len() != 2 {
        return false;
    }
    let path = Path::new(&arguments[0]);
    if !matches_script_extension(path) {
        return false;
    }
    let Some(descriptor) = scan_file(path, output) else {
        return false;
    };
    descriptor.exists && (arguments.len() == 1 || descriptor.accepts_arguments)
}

/// Pre-scan `path` in an isolated, bare sub-interpreter. `None` when the
/// file cannot be read or registered.
#[must_use]
pub fn scan_file(path: &Path, output: Diag) -> Option<EntryPointDescriptor> {
    let Ok(source) = fs::read_to_string(path) else {
        debug!("script-file detection: cannot open '{}'", path.display());
        return None;
    };
    let mut scanner = Interpreter::bare(output);
    let outcome = match scanner.add_commands(&source, Some(path)) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(
                "script-file detection: '{}' did not register ({err})",
                path.display()
            );
            return None;
        }
    };
    Some(EntryPointDescriptor {
        exists: outcome.defines_entrypoint,
        accepts_arguments: scanner
            .lookup(ENTRYPOINT)
            .is_some_and(|definition| definition.has_arguments),
    })
}
