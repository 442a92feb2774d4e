//! Sample representation types shared by every stage of a conversion.
//!
//! A conversion always has two [`FormatDescriptor`]s: one describing the
//! source payload and one describing the payload to produce.  Each
//! descriptor combines three independent choices:
//!
//! | Field | Type | Values |
//! |-------|------|--------|
//! | sample rate | `u32` (Hz) | any positive value |
//! | encoding | [`SampleEncoding`] | `u8`, `s16`, `s32`, `s64`, `f32`, `f64` |
//! | channels | [`ChannelLayout`] | mono, stereo |
//!
//! [`sample`] holds the little-endian codec that moves samples between their
//! on-disk encoding and the normalised `f64` representation the engine works
//! in.
//!
//! # Example
//!
//! ```rust
//! use pcm_convert::format::{ChannelLayout, FormatDescriptor, SampleEncoding};
//!
//! let cd = FormatDescriptor::new(44_100, SampleEncoding::S16, ChannelLayout::Stereo).unwrap();
//! assert_eq!(cd.frame_bytes(), 4);
//! assert_eq!(cd.encoding().bits_per_sample(), 16);
//! ```

pub mod descriptor;
pub mod sample;

pub use descriptor::{ChannelLayout, ContainerKind, FormatDescriptor, FormatError, SampleEncoding};
