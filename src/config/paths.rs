//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir:
//!   Windows: %APPDATA%\pcm-convert\
//!   macOS:   ~/Library/Application Support/pcm-convert/
//!   Linux:   ~/.config/pcm-convert/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "pcm-convert";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
