//! Argument-to-script translation.
//!
//! Turns the raw process tokens into the one script handed to the
//! interpreter: per-token quoting, whitespace-as-separator normalization,
//! and injection of the startup marker and of the warning directives the
//! startup loader asked for.

use std::path::Path;

use crate::startup::{LoadOutcome, StartupFiles};

/// Script assembled for a zero-argument invocation: the no-argument handler,
/// wrapped so any failure inside it is swallowed.
pub const NOARG_SCRIPT: &str = "local[] cli_noarg onfail done";

/// Startup marker directive: a no-argument marker command followed by an
/// empty-argument continuation token.
pub const STARTUP_MARKER: &str = "cli_start , ";

/// Warning directive naming an invalid auxiliary file. `noun` is
/// `"update file"` or `"command file"`.
#[must_use]
pub fn warn_directive(path: &Path, noun: &str) -> String {
    format!("warn \"File '{}' is not a valid {noun}.\" ", path.display())
}

/// True when `token` selects verbosity, compared case-insensitively with all
/// leading dashes stripped.
#[must_use]
pub fn is_verbosity_token(token: &str) -> bool {
    let token = token.trim_start_matches('-').to_ascii_lowercase();
    token == "v" || token == "verbose"
}

/// The script items one argument contributes: the token itself, or an
/// open-quote/token/close-quote triple when it embeds a space. The last item
/// carries the trailing token separator.
#[must_use]
pub fn argument_items(argument: &str) -> Vec<String> {
    let mut items = if argument.contains(' ') {
        vec![
            "\"".to_string(),
            argument.to_string(),
            "\"".to_string(),
        ]
    } else {
        vec![argument.to_string()]
    };
    if let Some(last) = items.last_mut() {
        last.push(' ');
    }
    items
}

/// Assemble the final script from the raw process tokens and the startup
/// loader's report.
#[must_use]
pub fn assemble(arguments: &[String], startup: &StartupFiles) -> String {
    if arguments.is_empty() {
        return NOARG_SCRIPT.to_string();
    }

    let mut groups: Vec<Vec<String>> = arguments
        .iter()
        .map(|argument| argument_items(argument))
        .collect();

    // The marker goes in front, unless the invocation leads with a verbosity
    // token: then it goes after the verbosity clause (the flag plus its
    // level), so verbosity takes effect before the marker runs. Warning
    // directives share the position, update file first.
    let at = if is_verbosity_token(&arguments[0]) {
        groups.len().min(2)
    } else {
        0
    };
    let mut head: Vec<Vec<String>> = Vec::new();
    if startup.update == LoadOutcome::Invalid {
        head.push(vec![warn_directive(&startup.update_path, "update file")]);
    }
    if startup.user == LoadOutcome::Invalid {
        head.push(vec![warn_directive(&startup.user_path, "command file")]);
    }
    head.push(vec![STARTUP_MARKER.to_string()]);
    groups.splice(at..at, head);

    let mut script = groups.concat().concat();
    if script.ends_with(' ') {
        script.pop();
    }
    script
}
