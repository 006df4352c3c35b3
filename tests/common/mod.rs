//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Package version for testing the `version` command
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper to get the compiled binary path
pub fn get_binary_path() -> PathBuf {
    // Get the directory where cargo places test binaries
    let mut path = env::current_exe().unwrap();
    path.pop(); // Remove test executable name

    // Check if we're in a 'deps' directory (integration tests)
    if path.ends_with("deps") {
        path.pop(); // Go up to debug or release
    }

    path.push("rill");

    // If the binary doesn't exist in debug, try building it first
    if !path.exists() {
        let build_output = Command::new("cargo")
            .args(["build", "--bin", "rill"])
            .output()
            .expect("Failed to build binary");

        assert!(
            build_output.status.success(),
            "Failed to build rill binary: {}",
            String::from_utf8_lossy(&build_output.stderr)
        );
    }

    path
}

/// Helper to create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Helper to write a file inside a test sandbox
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Name of the auto-update file the loader looks for
pub fn update_file_name() -> String {
    let digits: String = PKG_VERSION.chars().filter(char::is_ascii_digit).collect();
    format!("update{digits}.rill")
}

/// Helper to create a Command isolated inside `sandbox`
///
/// Points HOME, the resource directory and the user file into the sandbox
/// and clears the verbosity/debug environment overrides.
pub fn sandboxed_command(binary: &PathBuf, sandbox: &Path) -> Command {
    let mut cmd = Command::new(binary);
    cmd.current_dir(sandbox);
    cmd.env("HOME", sandbox);
    cmd.env("RILL_PATH", sandbox.join("rc"));
    cmd.env("RILL_USER", sandbox.join("user.rill"));
    cmd.env_remove("RILL_VERBOSITY");
    cmd.env_remove("RILL_DEBUG");
    cmd
}
