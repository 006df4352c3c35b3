//! Startup command-file loading.
//!
//! Two auxiliary sources are merged ahead of the user script: the
//! auto-update file inside the resource directory and the user file next to
//! the home directory. Neither is required, and nothing in here is fatal:
//! every failure degrades to [`LoadOutcome::Invalid`] or
//! [`LoadOutcome::Absent`], and the translator later injects a warning
//! directive for the invalid ones.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::config;
use crate::interpreter::Interpreter;

/// Magic prefix a valid update file starts with (after optional leading
/// whitespace): the marker `#@ril` immediately followed by the letter `l`.
pub const UPDATE_MAGIC: &str = "#@rill";

/// Per-file load result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file could not be read; nothing was registered.
    Absent,
    /// The file was read but its content is not a valid command source;
    /// a warning directive must be injected.
    Invalid,
    /// The file's definitions were registered.
    Loaded,
}

/// What the loader found, consumed by the translator and the failure
/// adapter.
#[derive(Debug)]
pub struct StartupFiles {
    /// Location of the auto-update file.
    pub update_path: PathBuf,
    /// Location of the user file.
    pub user_path: PathBuf,
    /// Outcome for the auto-update file.
    pub update: LoadOutcome,
    /// Outcome for the user file.
    pub user: LoadOutcome,
}

/// Structured form of the auto-update file, as fetched by an updater.
#[derive(Debug, Deserialize)]
struct UpdateDocument {
    commands: String,
    #[serde(default)]
    version: Option<String>,
}

/// Load both auxiliary files into `interpreter` and report what happened.
pub fn load_startup_files(interpreter: &mut Interpreter) -> StartupFiles {
    let update_path = config::update_command_file();
    let user_path = config::user_command_file();
    let update = load_update_file(interpreter, &update_path);
    let user = load_user_file(interpreter, &user_path);
    StartupFiles {
        update_path,
        user_path,
        update,
        user,
    }
}

/// Load the auto-update file: structured document first, raw bytes as the
/// fallback. Content is normalized, registered, and validated against the
/// magic prefix; every failure is caught here.
pub fn load_update_file(interpreter: &mut Interpreter, path: &Path) -> LoadOutcome {
    let Ok(bytes) = fs::read(path) else {
        debug!("no update file at '{}'", path.display());
        return LoadOutcome::Absent;
    };
    let text = match serde_json::from_slice::<UpdateDocument>(&bytes) {
        Ok(document) => {
            if let Some(version) = &document.version {
                debug!("update document version {version}");
            }
            document.commands
        }
        Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
    };
    let source = normalize(&text);
    let mut outcome = LoadOutcome::Loaded;
    if let Err(err) = interpreter.add_commands(&source, Some(path)) {
        warn!("update file '{}' failed to register: {err}", path.display());
        outcome = LoadOutcome::Invalid;
    }
    if !source.trim_start().starts_with(UPDATE_MAGIC) {
        outcome = LoadOutcome::Invalid;
    }
    outcome
}

/// Load the user file: raw bytes only, no magic validation.
pub fn load_user_file(interpreter: &mut Interpreter, path: &Path) -> LoadOutcome {
    let Ok(text) = fs::read_to_string(path) else {
        debug!("no user file at '{}'", path.display());
        return LoadOutcome::Absent;
    };
    let source = normalize(&text);
    if let Err(err) = interpreter.add_commands(&source, Some(path)) {
        warn!("user file '{}' failed to register: {err}", path.display());
        return LoadOutcome::Invalid;
    }
    LoadOutcome::Loaded
}

/// Normalize line endings and guarantee trailing-newline termination.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut normalized = text.replace("\r\n", "\n");
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::Diag;

    fn interpreter() -> Interpreter {
        Interpreter::new(Diag::plain())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a : b\r\nc : d"), "a : b\nc : d\n");
        assert_eq!(normalize("a : b\n"), "a : b\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn test_missing_files_are_absent() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.rill");
        assert_eq!(load_update_file(&mut interp, &path), LoadOutcome::Absent);
        assert_eq!(load_user_file(&mut interp, &path), LoadOutcome::Absent);
    }

    #[test]
    fn test_update_file_raw_with_magic_loads() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.rill");
        std::fs::write(&path, "#@rill update\nblur : print blurring $1\n").unwrap();
        assert_eq!(load_update_file(&mut interp, &path), LoadOutcome::Loaded);
        assert!(interp.lookup("blur").is_some());
    }

    #[test]
    fn test_update_file_structured_document_loads() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.rill");
        let document = serde_json::json!({
            "version": "0.2.0",
            "commands": "#@rill update\nsharpen : print sharpening\n",
        });
        std::fs::write(&path, document.to_string()).unwrap();
        assert_eq!(load_update_file(&mut interp, &path), LoadOutcome::Loaded);
        assert!(interp.lookup("sharpen").is_some());
    }

    #[test]
    fn test_update_file_without_magic_is_invalid_but_registered() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.rill");
        std::fs::write(&path, "blur : print blurring\n").unwrap();
        assert_eq!(load_update_file(&mut interp, &path), LoadOutcome::Invalid);
        // Validation failure does not undo the registration itself.
        assert!(interp.lookup("blur").is_some());
    }

    #[test]
    fn test_empty_update_file_is_invalid() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.rill");
        std::fs::write(&path, "").unwrap();
        assert_eq!(load_update_file(&mut interp, &path), LoadOutcome::Invalid);
    }

    #[test]
    fn test_malformed_update_file_is_invalid() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.rill");
        std::fs::write(&path, "#@rill update\n!!! garbage\n").unwrap();
        assert_eq!(load_update_file(&mut interp, &path), LoadOutcome::Invalid);
    }

    #[test]
    fn test_user_file_loads_without_magic() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rill");
        std::fs::write(&path, "mine : print hello\n").unwrap();
        assert_eq!(load_user_file(&mut interp, &path), LoadOutcome::Loaded);
        assert!(interp.lookup("mine").is_some());
    }

    #[test]
    fn test_malformed_user_file_is_invalid() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rill");
        std::fs::write(&path, "not a definition at all !\n").unwrap();
        assert_eq!(load_user_file(&mut interp, &path), LoadOutcome::Invalid);
    }

    #[test]
    fn test_crlf_content_is_normalized() {
        let mut interp = interpreter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rill");
        std::fs::write(&path, "a : print one\r\nb : print two").unwrap();
        assert_eq!(load_user_file(&mut interp, &path), LoadOutcome::Loaded);
        assert!(interp.lookup("a").is_some());
        assert!(interp.lookup("b").is_some());
    }
}
