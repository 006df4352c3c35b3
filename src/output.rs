//! Diagnostic stream selection and emphasis markers.
//!
//! Diagnostics go to standard error by default, or to standard output when
//! the debug condition holds, so that debug sessions see script output and
//! diagnostics interleaved on one stream.

use std::io::{IsTerminal, Write};

/// Handle on the selected diagnostic stream.
///
/// Cheap to copy; every component that prints diagnostics receives one
/// instead of picking a stream itself.
#[derive(Debug, Clone, Copy)]
pub struct Diag {
    to_stdout: bool,
    color: bool,
}

impl Diag {
    /// Select the diagnostic stream: stdout under the debug condition,
    /// stderr otherwise. Emphasis markers are emitted only when the selected
    /// stream is a terminal.
    #[must_use]
    pub fn new(debug: bool) -> Self {
        let color = if debug {
            std::io::stdout().is_terminal()
        } else {
            std::io::stderr().is_terminal()
        };
        Self {
            to_stdout: debug,
            color,
        }
    }

    /// A stream handle that writes to stderr without emphasis, regardless of
    /// terminal state. Used by tests and disposable sub-interpreters.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            to_stdout: false,
            color: false,
        }
    }

    /// Write `text` to the selected stream and flush it.
    pub fn emit(&self, text: &str) {
        if self.to_stdout {
            let mut out = std::io::stdout();
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        } else {
            let mut err = std::io::stderr();
            let _ = err.write_all(text.as_bytes());
            let _ = err.flush();
        }
    }

    /// Wrap `text` in bold-red emphasis markers when the stream supports
    /// them, or return it unchanged.
    #[must_use]
    pub fn emphasize(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1;31m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}
