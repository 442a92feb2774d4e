//! [`FormatDescriptor`] and the closed enums it is built from.
//!
//! All enums implement `Serialize`/`Deserialize` (for `settings.toml`) and
//! `FromStr` (for the command line).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// FormatError
// ---------------------------------------------------------------------------

/// Reasons a descriptor (or one of its parts) could not be built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    /// Sample rates must be strictly positive.
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,

    /// Only mono and stereo layouts are supported.
    #[error("unsupported channel count {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    /// The encoding name did not match any known encoding.
    #[error("unknown sample encoding '{0}' (expected u8, s16, s32, s64, f32 or f64)")]
    UnknownEncoding(String),
}

// ---------------------------------------------------------------------------
// SampleEncoding
// ---------------------------------------------------------------------------

/// Binary representation of a single sample.  All encodings are interleaved
/// and little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// Unsigned 8-bit integer, silence at 128.
    U8,
    /// Signed 16-bit integer.
    S16,
    /// Signed 32-bit integer.
    S32,
    /// Signed 64-bit integer.
    S64,
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
}

impl SampleEncoding {
    /// Every supported encoding, in increasing width order.
    pub const ALL: [SampleEncoding; 6] = [
        SampleEncoding::U8,
        SampleEncoding::S16,
        SampleEncoding::S32,
        SampleEncoding::S64,
        SampleEncoding::F32,
        SampleEncoding::F64,
    ];

    /// Width of one sample in bytes.
    pub fn byte_width(self) -> usize {
        match self {
            SampleEncoding::U8 => 1,
            SampleEncoding::S16 => 2,
            SampleEncoding::S32 | SampleEncoding::F32 => 4,
            SampleEncoding::S64 | SampleEncoding::F64 => 8,
        }
    }

    /// Width of one sample in bits, as written to the WAV `fmt ` chunk.
    pub fn bits_per_sample(self) -> u16 {
        self.byte_width() as u16 * 8
    }

    /// Short lowercase name (`"s16"`, `"f64"`, …).
    pub fn name(self) -> &'static str {
        match self {
            SampleEncoding::U8 => "u8",
            SampleEncoding::S16 => "s16",
            SampleEncoding::S32 => "s32",
            SampleEncoding::S64 => "s64",
            SampleEncoding::F32 => "f32",
            SampleEncoding::F64 => "f64",
        }
    }
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleEncoding {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u8" | "uint8" => Ok(SampleEncoding::U8),
            "s16" | "int16" | "i16" => Ok(SampleEncoding::S16),
            "s32" | "int32" | "i32" => Ok(SampleEncoding::S32),
            "s64" | "int64" | "i64" => Ok(SampleEncoding::S64),
            "f32" | "float" | "flt" => Ok(SampleEncoding::F32),
            "f64" | "double" | "dbl" => Ok(SampleEncoding::F64),
            _ => Err(FormatError::UnknownEncoding(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelLayout
// ---------------------------------------------------------------------------

/// Channel arrangement.  Serialised as the plain channel count (`1` / `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn count(self) -> u16 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

impl TryFrom<u16> for ChannelLayout {
    type Error = FormatError;

    fn try_from(count: u16) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(ChannelLayout::Mono),
            2 => Ok(ChannelLayout::Stereo),
            n => Err(FormatError::UnsupportedChannels(n)),
        }
    }
}

impl From<ChannelLayout> for u16 {
    fn from(layout: ChannelLayout) -> Self {
        layout.count()
    }
}

impl FromStr for ChannelLayout {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "mono" => Ok(ChannelLayout::Mono),
            "2" | "stereo" => Ok(ChannelLayout::Stereo),
            other => Err(FormatError::UnsupportedChannels(other.parse().unwrap_or(0))),
        }
    }
}

// ---------------------------------------------------------------------------
// ContainerKind
// ---------------------------------------------------------------------------

/// File-level wrapper written around the converted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Headerless sample data, written as `*.pcm`.
    #[serde(alias = "pcm")]
    Raw,
    /// 44-byte canonical WAV header followed by the payload, written as `*.wav`.
    Wav,
    /// Anything else.  Conversions targeting it fail before writing.
    #[serde(other)]
    Unsupported,
}

impl ContainerKind {
    /// File extension for the output file, or `None` when nothing can be
    /// written.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ContainerKind::Raw => Some("pcm"),
            ContainerKind::Wav => Some("wav"),
            ContainerKind::Unsupported => None,
        }
    }
}

impl FromStr for ContainerKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "wav" | "wave" => ContainerKind::Wav,
            "pcm" | "raw" => ContainerKind::Raw,
            _ => ContainerKind::Unsupported,
        })
    }
}

// ---------------------------------------------------------------------------
// FormatDescriptor
// ---------------------------------------------------------------------------

/// Immutable description of one side of a conversion.
///
/// The sample rate is validated on construction, so a descriptor in hand is
/// always usable by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    sample_rate: u32,
    encoding: SampleEncoding,
    channels: ChannelLayout,
}

impl FormatDescriptor {
    /// Build a descriptor, rejecting a zero sample rate.
    pub fn new(
        sample_rate: u32,
        encoding: SampleEncoding,
        channels: ChannelLayout,
    ) -> Result<Self, FormatError> {
        if sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        Ok(Self {
            sample_rate,
            encoding,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    pub fn channels(&self) -> ChannelLayout {
        self.channels
    }

    /// Bytes per interleaved frame (`channels × byte_width`), also the WAV
    /// block alignment.
    pub fn frame_bytes(&self) -> usize {
        self.channels.count() as usize * self.encoding.byte_width()
    }

    /// Bytes per second of audio in this format, as stored in the 32-bit WAV
    /// field.  Wraps for rates beyond that field's range.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.wrapping_mul(self.frame_bytes() as u32)
    }

    /// Descriptor a live audio device can be opened with.
    ///
    /// Output devices cannot take 64-bit float samples, so previews fall
    /// back to 32-bit float.  Converted files keep the requested encoding.
    ///
    /// ```
    /// use pcm_convert::format::{ChannelLayout, FormatDescriptor, SampleEncoding};
    ///
    /// let f64_fmt = FormatDescriptor::new(48_000, SampleEncoding::F64, ChannelLayout::Mono).unwrap();
    /// assert_eq!(f64_fmt.playback_compatible().encoding(), SampleEncoding::F32);
    /// ```
    pub fn playback_compatible(&self) -> Self {
        let encoding = match self.encoding {
            SampleEncoding::F64 => SampleEncoding::F32,
            other => other,
        };
        Self { encoding, ..*self }
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {}, {} ch",
            self.sample_rate,
            self.encoding,
            self.channels.count()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_widths_match_bit_depths() {
        let expected = [(1, 8), (2, 16), (4, 32), (8, 64), (4, 32), (8, 64)];
        for (enc, (bytes, bits)) in SampleEncoding::ALL.iter().zip(expected) {
            assert_eq!(enc.byte_width(), bytes, "{enc}");
            assert_eq!(enc.bits_per_sample(), bits, "{enc}");
        }
    }

    #[test]
    fn zero_rate_rejected() {
        let err = FormatDescriptor::new(0, SampleEncoding::S16, ChannelLayout::Mono).unwrap_err();
        assert_eq!(err, FormatError::ZeroSampleRate);
    }

    #[test]
    fn frame_bytes_and_byte_rate() {
        let f = FormatDescriptor::new(48_000, SampleEncoding::S32, ChannelLayout::Stereo).unwrap();
        assert_eq!(f.frame_bytes(), 8);
        assert_eq!(f.byte_rate(), 384_000);
    }

    #[test]
    fn byte_rate_wraps_instead_of_overflowing() {
        let f = FormatDescriptor::new(400_000_000, SampleEncoding::F64, ChannelLayout::Stereo)
            .unwrap();
        assert_eq!(f.byte_rate(), 400_000_000_u32.wrapping_mul(16));
    }

    #[test]
    fn channel_layout_from_count() {
        assert_eq!(ChannelLayout::try_from(1).unwrap(), ChannelLayout::Mono);
        assert_eq!(ChannelLayout::try_from(2).unwrap(), ChannelLayout::Stereo);
        assert_eq!(
            ChannelLayout::try_from(6).unwrap_err(),
            FormatError::UnsupportedChannels(6)
        );
    }

    #[test]
    fn encoding_parses_names_and_aliases() {
        assert_eq!("s16".parse::<SampleEncoding>().unwrap(), SampleEncoding::S16);
        assert_eq!("Double".parse::<SampleEncoding>().unwrap(), SampleEncoding::F64);
        assert_eq!("float".parse::<SampleEncoding>().unwrap(), SampleEncoding::F32);
        assert!("s24".parse::<SampleEncoding>().is_err());
    }

    #[test]
    fn encoding_display_round_trips_through_from_str() {
        for enc in SampleEncoding::ALL {
            assert_eq!(enc.to_string().parse::<SampleEncoding>().unwrap(), enc);
        }
    }

    #[test]
    fn container_kind_parsing_is_lenient() {
        assert_eq!("WAV".parse::<ContainerKind>().unwrap(), ContainerKind::Wav);
        assert_eq!("pcm".parse::<ContainerKind>().unwrap(), ContainerKind::Raw);
        assert_eq!("flac".parse::<ContainerKind>().unwrap(), ContainerKind::Unsupported);
        assert_eq!(ContainerKind::Unsupported.extension(), None);
    }

    #[test]
    fn playback_substitutes_only_f64() {
        for enc in SampleEncoding::ALL {
            let f = FormatDescriptor::new(22_050, enc, ChannelLayout::Mono).unwrap();
            let p = f.playback_compatible();
            let want = if enc == SampleEncoding::F64 { SampleEncoding::F32 } else { enc };
            assert_eq!(p.encoding(), want);
            assert_eq!(p.sample_rate(), 22_050);
        }
    }
}
