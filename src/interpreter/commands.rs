//! Line-oriented parsing of command-definition files.
//!
//! The recognised shape:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `name : body` | start a definition (body may be empty) |
//! | leading whitespace | continuation of the current body |
//! | `#@help name : text` | help text for `name` |
//! | `#...` | comment, ignored |
//! | blank | ignored |
//!
//! Anything else is malformed and rejects the whole source.

use std::sync::OnceLock;

use regex::Regex;

use super::{CommandDef, EngineError};

/// Everything extracted from one command-definition source.
#[derive(Debug, Default)]
pub(super) struct ParsedFile {
    pub(super) definitions: Vec<CommandDef>,
    pub(super) docs: Vec<(String, String)>,
}

fn definition_head() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        match Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)[ \t]*:[ \t]?(.*)$") {
            Ok(re) => re,
            Err(err) => unreachable!("invalid definition-head pattern: {err}"),
        }
    })
}

fn doc_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        match Regex::new(r"^#@help[ \t]+([A-Za-z_][A-Za-z0-9_]*)[ \t]*:[ \t]?(.*)$") {
            Ok(re) => re,
            Err(err) => unreachable!("invalid doc-line pattern: {err}"),
        }
    })
}

fn argument_reference() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| match Regex::new(r"\$(\*|[0-9]|\{[0-9]+\})") {
        Ok(re) => re,
        Err(err) => unreachable!("invalid argument-reference pattern: {err}"),
    })
}

/// True when a command body references positional arguments (`$1`…`$9`,
/// `${n}`, `$*`). Named-variable references do not count.
#[must_use]
pub(super) fn references_arguments(body: &str) -> bool {
    argument_reference().is_match(body)
}

/// Parse one command-definition source into definitions and doc entries.
///
/// # Errors
///
/// Returns `Err` on the first line that cannot belong to a definition.
pub(super) fn parse_definitions(source: &str) -> Result<ParsedFile, EngineError> {
    let mut parsed = ParsedFile::default();
    let mut current: Option<CommandDef> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim_end();

        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = doc_line().captures(line) {
            parsed.docs.push((caps[1].to_string(), caps[2].to_string()));
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        // Continuation lines extend the body of the open definition.
        if raw.starts_with([' ', '\t']) {
            let Some(definition) = current.as_mut() else {
                return Err(EngineError::MalformedDefinition {
                    line: index + 1,
                    text: line.trim().to_string(),
                });
            };
            if !definition.body.is_empty() {
                definition.body.push('\n');
            }
            definition.body.push_str(line.trim());
            continue;
        }

        let Some(caps) = definition_head().captures(line) else {
            return Err(EngineError::MalformedDefinition {
                line: index + 1,
                text: line.trim().to_string(),
            });
        };
        if let Some(finished) = current.take() {
            parsed.definitions.push(seal(finished));
        }
        current = Some(CommandDef {
            name: caps[1].to_string(),
            body: caps[2].trim().to_string(),
            has_arguments: false,
        });
    }

    if let Some(finished) = current.take() {
        parsed.definitions.push(seal(finished));
    }
    Ok(parsed)
}

fn seal(mut definition: CommandDef) -> CommandDef {
    definition.has_arguments = references_arguments(&definition.body);
    definition
}
