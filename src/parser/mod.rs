//! Script tokenizer built on pest.
//!
//! A script is a flat sequence of whitespace-separated items; double quotes
//! group embedded whitespace into a single literal item. The tokenizer is the
//! only place the grammar is consulted; everything downstream works on
//! [`Token`] values.

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct ScriptParser;

/// One item of a script, as produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word (command name, argument list, separator).
    Word(String),
    /// A double-quoted literal, quotes removed.
    Quoted(String),
}

impl Token {
    /// The item's text, without surrounding quotes.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Token::Word(text) | Token::Quoted(text) => text,
        }
    }

    /// True when the item is the bare word `word`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(text) if text == word)
    }
}

/// Split a script into its items.
///
/// # Errors
///
/// Returns `Err` if the input violates the grammar. In practice that is an
/// unterminated double quote, since words accept any non-whitespace text.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Box<pest::error::Error<Rule>>> {
    let mut pairs = ScriptParser::parse(Rule::script, input).map_err(Box::new)?;
    let mut tokens = Vec::new();
    let Some(root) = pairs.next() else {
        return Ok(tokens);
    };
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::word => tokens.push(Token::Word(pair.as_str().to_string())),
            Rule::quoted => {
                let inner = pair
                    .into_inner()
                    .next()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tokens.push(Token::Quoted(inner));
            }
            Rule::EOI | _ => {}
        }
    }
    Ok(tokens)
}
