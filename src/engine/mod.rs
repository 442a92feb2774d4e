//! Resampling engine: streaming sample-rate, encoding and channel conversion.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  convert(payload, source, target, cancel, on_progress)     │
//! │                                                            │
//! │   for each 1024-frame chunk:                               │
//! │     decode + remix ──▶ RateConverter ──▶ encode ──▶ append │
//! │     on_progress(done, total)                               │
//! │     CancellationFlag polled                                │
//! │                                                            │
//! │   flush converter tail (completed passes only)             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is synchronous and CPU-bound.  The pipeline runs it on
//! `tokio::task::spawn_blocking`; it never runs twice at once.
//!
//! # Quick start
//!
//! ```rust
//! use pcm_convert::engine::{convert, CancellationFlag, EngineOptions};
//! use pcm_convert::format::{ChannelLayout, FormatDescriptor, SampleEncoding};
//!
//! let src = FormatDescriptor::new(48_000, SampleEncoding::S16, ChannelLayout::Mono).unwrap();
//! let dst = FormatDescriptor::new(44_100, SampleEncoding::S16, ChannelLayout::Mono).unwrap();
//! let payload = vec![0u8; 48_000 * 2]; // 1 s of silence
//!
//! let cancel = CancellationFlag::new();
//! cancel.arm();
//! let out = convert(&payload, &src, &dst, &cancel, &EngineOptions::default(), |_, _| {}).unwrap();
//! assert_eq!(out.payload.len(), 44_100 * 2);
//! ```

pub mod cancel;
pub mod convert;
pub mod resampler;

use thiserror::Error;

pub use cancel::CancellationFlag;
pub use convert::{
    convert, expected_output_frames, required_output_frames, ConversionOutput, EngineOptions,
    DEFAULT_CHUNK_FRAMES,
};
pub use resampler::{build_converter, Passthrough, RateConverter, SincConverter, SincSettings};

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Failures that abort a conversion pass.  Cancellation is not one of them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The rate converter could not be created for the requested rates.
    #[error("could not initialise the resampler: {0}")]
    ResamplerInit(String),

    /// A conversion step failed part-way through.
    #[error("conversion step failed: {0}")]
    Conversion(String),

    /// Chunk size of zero frames.
    #[error("chunk size must be at least one frame")]
    InvalidChunkSize,
}
