//! pcm-convert: offline PCM audio converter.
//!
//! Converts raw PCM or WAV files between sample rates, sample encodings and
//! channel layouts and writes the result as raw PCM or as a 44-byte-header
//! WAV file.
//!
//! | Module | Role |
//! |--------|------|
//! | [`format`] | format descriptors and the sample codec |
//! | [`container`] | WAV header building/parsing, source sniffing |
//! | [`engine`] | chunked resampling with progress and cancellation |
//! | [`config`] | `settings.toml` persistence |
//! | [`pipeline`] | load → convert → write controller |

pub mod config;
pub mod container;
pub mod engine;
pub mod format;
pub mod pipeline;
