//! Configuration module for pcm-convert.
//!
//! Provides `AppConfig` (top-level settings), one sub-config per concern,
//! `AppPaths` for the cross-platform config directory, and TOML persistence
//! via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, EngineConfig, OutputConfig, SourceConfig, TargetConfig};
