//! Platform-appropriate application paths.
//!
//! All user data lives under one directory resolved via the `dirs` crate:
//!
//! | Platform | Location                                        |
//! |----------|-------------------------------------------------|
//! | Linux    | `~/.config/speak-perfect/`                      |
//! | macOS    | `~/Library/Application Support/speak-perfect/`  |
//! | Windows  | `%APPDATA%\speak-perfect\`                      |

use std::path::PathBuf;

/// Directory name under the platform config root.
const APP_DIR: &str = "speak-perfect";

// ---------------------------------------------------------------------------
// AppPaths
// ---------------------------------------------------------------------------

/// Resolved application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Root of all application data.
    pub config_dir: PathBuf,
    /// `settings.toml` location.
    pub settings_file: PathBuf,
    /// Optional custom word lists (`*.json`).
    pub words_dir: PathBuf,
}

impl AppPaths {
    /// Resolve paths for the current platform.
    ///
    /// Falls back to the current directory when the platform config root
    /// cannot be determined (e.g. minimal containers without `$HOME`).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            settings_file: config_dir.join("settings.toml"),
            words_dir: config_dir.join("words"),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_in_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.starts_with(&paths.config_dir));
        assert_eq!(
            paths.settings_file.file_name().unwrap(),
            "settings.toml"
        );
    }

    #[test]
    fn paths_end_with_app_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.ends_with(APP_DIR));
        assert!(paths.words_dir.starts_with(&paths.config_dir));
    }
}
