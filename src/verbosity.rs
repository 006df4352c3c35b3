//! Initial-verbosity resolution.
//!
//! Verbosity comes from the first matching source: an environment override,
//! the entry-point permission, a help- or version-shaped invocation, and
//! finally the default of 1.

/// Environment variable supplying the initial verbosity.
pub const VERBOSITY_ENV: &str = "RILL_VERBOSITY";

/// Parse an integer allowing at most one trailing character after the
/// digits. Used for the environment override and for the embedded status
/// code scanned by the failure adapter.
#[must_use]
pub(crate) fn parse_coded_int(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let (sign_len, digits) = match raw.strip_prefix(['+', '-']) {
        Some(rest) => (raw.len() - rest.len(), rest),
        None => (0, raw),
    };
    let digit_count = digits.chars().take_while(char::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }
    let (number, tail) = raw.split_at(sign_len + digit_count);
    if tail.chars().count() > 1 {
        return None;
    }
    number.parse::<i32>().ok()
}

/// Resolve the initial verbosity for this invocation.
///
/// `arguments` are the raw trailing process tokens; `allow_entrypoint` is
/// the permission computed by script-file mode detection.
#[must_use]
pub fn resolve(arguments: &[String], allow_entrypoint: bool) -> i32 {
    if let Ok(raw) = std::env::var(VERBOSITY_ENV)
        && let Some(level) = parse_coded_int(&raw)
    {
        return level;
    }
    if allow_entrypoint {
        return 0;
    }
    let first = arguments.first().map(String::as_str);
    if (arguments.len() == 1 || arguments.len() == 2)
        && matches!(first, Some("help" | "-help" | "h" | "-h"))
    {
        return 0;
    }
    if arguments.len() == 1 && matches!(first, Some("version" | "-version")) {
        return 0;
    }
    1
}
