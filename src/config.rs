//! Resource-directory and startup-file locations.

use std::path::PathBuf;

/// Overrides the resource directory when set.
pub const PATH_ENV: &str = "RILL_PATH";

/// Overrides the user command-file location when set.
pub const USER_ENV: &str = "RILL_USER";

/// Get the user's home directory in a cross-platform way.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    // Try HOME first (Unix-like systems)
    if let Some(home) = std::env::var_os("HOME") {
        return Some(PathBuf::from(home));
    }

    // Try USERPROFILE (Windows)
    if let Some(userprofile) = std::env::var_os("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }

    // Try HOMEDRIVE + HOMEPATH (older Windows)
    if let (Some(homedrive), Some(homepath)) =
        (std::env::var_os("HOMEDRIVE"), std::env::var_os("HOMEPATH"))
    {
        let mut path = PathBuf::from(homedrive);
        path.push(homepath);
        return Some(path);
    }

    None
}

/// The directory holding rill's resources (the auto-update command file).
#[must_use]
pub fn resource_dir() -> PathBuf {
    if let Some(custom) = std::env::var_os(PATH_ENV)
        && !custom.is_empty()
    {
        return PathBuf::from(custom);
    }
    match home_dir() {
        Some(home) => home.join(".config").join("rill"),
        None => std::env::temp_dir().join("rill"),
    }
}

/// Create the resource directory if it does not exist yet.
///
/// # Errors
///
/// Returns `Err` if the directory cannot be created.
pub fn ensure_resource_dir() -> std::io::Result<PathBuf> {
    let dir = resource_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// The crate version with the dots removed, used to name the update file so
/// that each release looks for its own.
#[must_use]
pub fn version_digits() -> String {
    env!("CARGO_PKG_VERSION")
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// Location of the auto-update command file inside the resource directory.
#[must_use]
pub fn update_command_file() -> PathBuf {
    resource_dir().join(format!(
        "update{}.{}",
        version_digits(),
        crate::interpreter::SCRIPT_EXTENSION
    ))
}

/// Location of the user command file (outside the resource directory).
#[must_use]
pub fn user_command_file() -> PathBuf {
    if let Some(custom) = std::env::var_os(USER_ENV)
        && !custom.is_empty()
    {
        return PathBuf::from(custom);
    }
    match home_dir() {
        Some(home) => home.join(".rill"),
        None => PathBuf::from(".rill"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_version_digits_is_numeric() {
        let digits = version_digits();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_update_file_name_carries_version_and_extension() {
        let path = update_command_file();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name.starts_with("update"));
        assert!(name.ends_with(".rill"));
        assert!(name.contains(&version_digits()));
    }

    #[test]
    #[serial]
    fn test_resource_dir_env_override() {
        // SAFETY: test is serialized; no other thread reads the environment.
        unsafe { std::env::set_var(PATH_ENV, "/tmp/rill-test-rc") };
        assert_eq!(resource_dir(), PathBuf::from("/tmp/rill-test-rc"));
        unsafe { std::env::remove_var(PATH_ENV) };
    }

    #[test]
    #[serial]
    fn test_user_file_env_override() {
        // SAFETY: test is serialized; no other thread reads the environment.
        unsafe { std::env::set_var(USER_ENV, "/tmp/rill-test-user.rill") };
        assert_eq!(
            user_command_file(),
            PathBuf::from("/tmp/rill-test-user.rill")
        );
        unsafe { std::env::remove_var(USER_ENV) };
    }
}
