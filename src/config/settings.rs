//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`, so a file only needs the keys it changes:
//!
//! ```toml
//! [target]
//! sample_rate = 44100
//! container = "pcm"
//! ```

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::engine::{EngineOptions, SincSettings, DEFAULT_CHUNK_FRAMES};
use crate::format::{ChannelLayout, ContainerKind, FormatDescriptor, FormatError, SampleEncoding};

// ---------------------------------------------------------------------------
// SourceConfig
// ---------------------------------------------------------------------------

/// Format assumed for raw PCM sources when the command line does not say.
/// WAV sources always use the format from their own header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample encoding (`u8`, `s16`, `s32`, `s64`, `f32`, `f64`).
    pub encoding: SampleEncoding,
    /// Channel count (1 or 2).
    pub channels: ChannelLayout,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            encoding: SampleEncoding::S16,
            channels: ChannelLayout::Stereo,
        }
    }
}

impl SourceConfig {
    pub fn descriptor(&self) -> Result<FormatDescriptor, FormatError> {
        FormatDescriptor::new(self.sample_rate, self.encoding, self.channels)
    }
}

// ---------------------------------------------------------------------------
// TargetConfig
// ---------------------------------------------------------------------------

/// Default destination format and container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample encoding.
    pub encoding: SampleEncoding,
    /// Channel count (1 or 2).
    pub channels: ChannelLayout,
    /// `"wav"` or `"pcm"`.
    pub container: ContainerKind,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            encoding: SampleEncoding::S16,
            channels: ChannelLayout::Stereo,
            container: ContainerKind::Wav,
        }
    }
}

impl TargetConfig {
    pub fn descriptor(&self) -> Result<FormatDescriptor, FormatError> {
        FormatDescriptor::new(self.sample_rate, self.encoding, self.channels)
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Resampling engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Source frames converted per step; the cancel flag is polled between
    /// steps.
    pub chunk_frames: usize,
    /// Sinc filter parameters (only used when the sample rate changes).
    pub sinc: SincSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            sinc: SincSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            chunk_frames: self.chunk_frames,
            sinc: self.sinc.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Where converted files go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory.  `None` writes next to the process working
    /// directory.
    pub directory: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use pcm_convert::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Raw PCM source defaults.
    pub source: SourceConfig,
    /// Destination defaults.
    pub target: TargetConfig,
    /// Engine tuning.
    pub engine: EngineConfig,
    /// Output location.
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.source.sample_rate, 48_000);
        assert_eq!(cfg.source.encoding, SampleEncoding::S16);
        assert_eq!(cfg.source.channels, ChannelLayout::Stereo);
        assert_eq!(cfg.target.container, ContainerKind::Wav);
        assert_eq!(cfg.engine.chunk_frames, 1024);
        assert!(cfg.output.directory.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[target]\nsample_rate = 22050\nencoding = \"f64\"\nchannels = 1\ncontainer = \"pcm\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.target.sample_rate, 22_050);
        assert_eq!(cfg.target.encoding, SampleEncoding::F64);
        assert_eq!(cfg.target.channels, ChannelLayout::Mono);
        assert_eq!(cfg.target.container, ContainerKind::Raw);
        assert_eq!(cfg.source, SourceConfig::default());
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.source.sample_rate = 44_100;
        cfg.source.encoding = SampleEncoding::U8;
        cfg.source.channels = ChannelLayout::Mono;
        cfg.engine.chunk_frames = 4096;
        cfg.engine.sinc.sinc_len = 256;
        cfg.output.directory = Some(PathBuf::from("/tmp/out"));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn invalid_channel_count_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[source]\nchannels = 6\n").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn zero_rate_fails_descriptor() {
        let mut cfg = AppConfig::default();
        cfg.target.sample_rate = 0;
        assert_eq!(cfg.target.descriptor().unwrap_err(), FormatError::ZeroSampleRate);
        assert!(cfg.source.descriptor().is_ok());
    }
}
