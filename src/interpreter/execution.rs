//! Script execution: the item walker, guarded blocks, native operations.

use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{CommandDef, ENTRYPOINT, Interpreter, RunError, matches_script_extension};
use crate::parser::{self, Token};

const MAX_CALL_DEPTH: usize = 256;

struct Block {
    body: Range<usize>,
    onfail: Option<Range<usize>>,
    end: usize,
}

impl Interpreter {
    /// Execute one script against this interpreter.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the first failing item. The formatted status text is
    /// left on [`Interpreter::status`] for classification by the caller.
    pub fn run(&mut self, script: &str) -> Result<(), RunError> {
        self.status.clear();
        let tokens = match parser::tokenize(script) {
            Ok(tokens) => tokens,
            Err(err) => return Err(self.fail(None, format!("Invalid script syntax: {err}"))),
        };
        self.exec_sequence(&tokens)
    }

    fn exec_sequence(&mut self, tokens: &[Token]) -> Result<(), RunError> {
        let mut index = 0;
        while index < tokens.len() {
            index = self.exec_item(tokens, index)?;
        }
        Ok(())
    }

    fn exec_item(&mut self, tokens: &[Token], index: usize) -> Result<usize, RunError> {
        let Token::Word(word) = &tokens[index] else {
            log::debug!("ignoring literal item '{}'", tokens[index].text());
            return Ok(index + 1);
        };
        if word == "," {
            return Ok(index + 1);
        }
        let name = word.strip_prefix('-').unwrap_or(word);

        if is_local(name) {
            return self.exec_local(tokens, index);
        }
        if name == "onfail" || name == "done" {
            return Err(self.fail(
                Some(name),
                format!("Command '{name}': not inside a 'local[] ... done' block."),
            ));
        }
        if let Some(definition) = self.lookup(name).cloned() {
            return self.exec_custom(&definition, tokens, index);
        }
        if let Some(next) = self.exec_native(name, tokens, index)? {
            return Ok(next);
        }
        if is_command_file(word) {
            return self.exec_file(word, tokens, index);
        }
        Err(self.fail(
            Some(name),
            format!("Unknown command or filename '{name}'."),
        ))
    }

    /// Dispatch `name` as a native operation. `Ok(None)` means the name is
    /// not native.
    fn exec_native(
        &mut self,
        name: &str,
        tokens: &[Token],
        index: usize,
    ) -> Result<Option<usize>, RunError> {
        let next = match name {
            "verbose" | "v" => self.exec_verbose(tokens, index),
            "debug" => {
                self.verbosity = self.verbosity.max(3);
                log::debug!("debug diagnostics enabled from script");
                index + 1
            }
            "print" | "echo" => {
                let (argument, next) = take_argument(tokens, index);
                println!("{}", argument.map_or("", Token::text));
                next
            }
            "warn" => {
                let (argument, next) = take_argument(tokens, index);
                if self.verbosity >= 1 {
                    let message = argument.map_or("Unspecified warning.", Token::text);
                    let text = self.output.emphasize(&format!("*** Warning *** {message}"));
                    self.output.emit(&format!("[rill] {text}\n"));
                }
                next
            }
            "version" => {
                println!("rill {}", env!("CARGO_PKG_VERSION"));
                index + 1
            }
            "help" => {
                let (argument, next) = take_argument(tokens, index);
                self.print_help(argument.map(Token::text));
                next
            }
            "command" => {
                let (argument, next) = take_argument(tokens, index);
                let Some(item) = argument else {
                    return Err(self.fail(
                        Some("command"),
                        "Command 'command': missing command filename.".to_string(),
                    ));
                };
                let path = item.text().to_string();
                self.register_file(Path::new(&path))?;
                next
            }
            "error" => {
                let (argument, _) = take_argument(tokens, index);
                let message =
                    argument.map_or_else(|| "Unspecified error.".to_string(), |t| {
                        t.text().to_string()
                    });
                return Err(self.fail(None, message));
            }
            "quit" => {
                let (argument, _) = take_argument(tokens, index);
                let code = argument
                    .and_then(|t| t.text().parse::<i32>().ok())
                    .unwrap_or(0);
                self.status = format!("*** Termination requested *** {code}");
                return Err(RunError {
                    message: String::new(),
                    command: None,
                });
            }
            _ => return Ok(None),
        };
        Ok(Some(next))
    }

    fn exec_verbose(&mut self, tokens: &[Token], index: usize) -> usize {
        if let Some(Token::Word(level)) = tokens.get(index + 1) {
            match level.as_str() {
                "+" => {
                    self.verbosity += 1;
                    return index + 2;
                }
                "-" => {
                    self.verbosity -= 1;
                    return index + 2;
                }
                _ => {
                    if let Ok(level) = level.parse::<i32>() {
                        self.verbosity = level;
                        return index + 2;
                    }
                }
            }
        }
        index + 1
    }

    /// Execute a `local[] ... [onfail ...] done` block. A failure in the
    /// body runs the recovery branch when one is present, otherwise it
    /// propagates.
    fn exec_local(&mut self, tokens: &[Token], index: usize) -> Result<usize, RunError> {
        let Some(block) = find_block(tokens, index) else {
            return Err(self.fail(
                Some("local"),
                "Command 'local': missing closing 'done'.".to_string(),
            ));
        };
        if let Err(err) = self.exec_sequence(&tokens[block.body.clone()]) {
            let Some(recovery) = block.onfail.clone() else {
                return Err(err);
            };
            log::debug!("guarded block failed: {}", err.message);
            self.status.clear();
            self.exec_sequence(&tokens[recovery])?;
        }
        Ok(block.end + 1)
    }

    fn exec_custom(
        &mut self,
        definition: &CommandDef,
        tokens: &[Token],
        index: usize,
    ) -> Result<usize, RunError> {
        let (arguments, next) = if definition.has_arguments {
            let (argument, next) = take_argument(tokens, index);
            (split_arguments(argument), next)
        } else {
            (Vec::new(), index + 1)
        };
        self.invoke(definition, &arguments)?;
        Ok(next)
    }

    /// Invoke a registered command with explicit arguments.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the substituted body fails to tokenize or to
    /// execute, or when invocations nest too deep.
    pub fn invoke(&mut self, definition: &CommandDef, arguments: &[String]) -> Result<(), RunError> {
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(self.fail(
                Some(&definition.name),
                format!("Command '{}': call stack overflow.", definition.name),
            ));
        }
        let body = self.substitute(&definition.body, &definition.name, arguments);
        let body_tokens = match parser::tokenize(&body) {
            Ok(tokens) => tokens,
            Err(err) => {
                return Err(self.fail(
                    Some(&definition.name),
                    format!("Command '{}': invalid body ({err}).", definition.name),
                ));
            }
        };
        self.call_stack.push(definition.name.clone());
        let result = self.exec_sequence(&body_tokens);
        self.call_stack.pop();
        result
    }

    /// Run a word item that names a command file: register its definitions,
    /// then invoke the entry point when permission was granted.
    fn exec_file(&mut self, word: &str, tokens: &[Token], index: usize) -> Result<usize, RunError> {
        self.register_file(Path::new(word))?;
        if self.allow_entrypoint
            && let Some(definition) = self.lookup(ENTRYPOINT).cloned()
        {
            let (argument, next) = take_argument(tokens, index);
            let arguments = split_arguments(argument);
            self.invoke(&definition, &arguments)?;
            return Ok(next);
        }
        Ok(index + 1)
    }

    fn register_file(&mut self, path: &Path) -> Result<(), RunError> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                return Err(self.fail(
                    Some("command"),
                    format!(
                        "Command 'command': cannot read file '{}' ({err}).",
                        path.display()
                    ),
                ));
            }
        };
        if let Err(err) = self.add_commands(&source, Some(path)) {
            return Err(self.fail(
                Some("command"),
                format!(
                    "File '{}' is not a valid command file ({err}).",
                    path.display()
                ),
            ));
        }
        Ok(())
    }

    fn substitute(&self, body: &str, name: &str, arguments: &[String]) -> String {
        substitution_pattern()
            .replace_all(body, |caps: &Captures| {
                let key = &caps[1];
                if key == "*" {
                    return arguments.join(",");
                }
                if let Some(inner) = key.strip_prefix('{').and_then(|k| k.strip_suffix('}')) {
                    if let Ok(position) = inner.parse::<usize>() {
                        return positional(arguments, name, position);
                    }
                    return self.variables.get(inner).cloned().unwrap_or_default();
                }
                match key.parse::<usize>() {
                    Ok(position) => positional(arguments, name, position),
                    Err(_) => String::new(),
                }
            })
            .into_owned()
    }
}

fn positional(arguments: &[String], name: &str, position: usize) -> String {
    if position == 0 {
        return name.to_string();
    }
    arguments.get(position - 1).cloned().unwrap_or_default()
}

fn substitution_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        match Regex::new(r"\$(\*|[0-9]|\{[A-Za-z0-9_]+\})") {
            Ok(re) => re,
            Err(err) => unreachable!("invalid substitution pattern: {err}"),
        }
    })
}

/// Take the item following `index` as an argument. A lone `,` is an
/// explicit empty argument list; it is consumed but yields nothing.
fn take_argument(tokens: &[Token], index: usize) -> (Option<&Token>, usize) {
    match tokens.get(index + 1) {
        Some(token) if !token.is_word(",") => (Some(token), index + 2),
        Some(_) => (None, index + 2),
        None => (None, index + 1),
    }
}

fn split_arguments(argument: Option<&Token>) -> Vec<String> {
    match argument {
        Some(token) if !token.text().is_empty() => {
            token.text().split(',').map(str::to_string).collect()
        }
        _ => Vec::new(),
    }
}

fn is_local(name: &str) -> bool {
    name == "local" || (name.starts_with("local[") && name.ends_with(']'))
}

fn is_command_file(word: &str) -> bool {
    let path = Path::new(word);
    path.is_file() && matches_script_extension(path)
}

/// Find the block opened at `start`: its body, its optional recovery branch
/// and its closing `done`, accounting for nested blocks.
fn find_block(tokens: &[Token], start: usize) -> Option<Block> {
    let mut depth = 1usize;
    let mut split: Option<usize> = None;
    for (offset, token) in tokens.iter().enumerate().skip(start + 1) {
        let Token::Word(word) = token else { continue };
        let name = word.strip_prefix('-').unwrap_or(word);
        if is_local(name) {
            depth += 1;
        } else if name == "done" {
            depth -= 1;
            if depth == 0 {
                let body_end = split.unwrap_or(offset);
                return Some(Block {
                    body: start + 1..body_end,
                    onfail: split.map(|s| s + 1..offset),
                    end: offset,
                });
            }
        } else if name == "onfail" && depth == 1 {
            split = Some(offset);
        }
    }
    None
}
