//! WAV header synthesis and parsing.
//!
//! # Header layout written by [`build_header`]
//!
//! All fields little-endian.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 4 | `"RIFF"` |
//! | 0x04 | 4 | payload length + 44 |
//! | 0x08 | 4 | `"WAVE"` |
//! | 0x0C | 4 | `"fmt "` |
//! | 0x10 | 4 | 16 |
//! | 0x14 | 2 | 1 (PCM) |
//! | 0x16 | 2 | channel count |
//! | 0x18 | 4 | sample rate |
//! | 0x1C | 4 | byte rate |
//! | 0x20 | 2 | block align |
//! | 0x22 | 2 | bits per sample |
//! | 0x24 | 4 | `"data"` |
//! | 0x28 | 4 | payload length |
//!
//! The RIFF size at 0x04 is the payload length plus the full 44-byte header,
//! not the canonical "file size minus 8".  Files produced by earlier
//! releases carry the same value and readers in the field accept it.

use std::ops::Range;

use thiserror::Error;

use crate::format::{ChannelLayout, FormatDescriptor, FormatError, SampleEncoding};

/// Size of the header produced by [`build_header`].
pub const WAV_HEADER_LEN: usize = 44;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// Reasons a WAV source could not be understood.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WavError {
    #[error("missing RIFF/WAVE markers")]
    NotWav,

    #[error("truncated chunk header at byte {0}")]
    Truncated(usize),

    #[error("no 'fmt ' chunk before the 'data' chunk")]
    MissingFmt,

    #[error("no 'data' chunk")]
    MissingData,

    #[error("'fmt ' chunk is {0} bytes, need at least 16")]
    ShortFmt(u32),

    #[error("unsupported WAV format tag {tag} with {bits} bits per sample")]
    UnsupportedEncoding { tag: u16, bits: u16 },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("payload of {0} bytes does not fit a 32-bit WAV header")]
    PayloadTooLarge(usize),
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Build the 44-byte header for `payload_len` bytes of audio in `format`.
///
/// ```
/// use pcm_convert::container::build_header;
/// use pcm_convert::format::{ChannelLayout, FormatDescriptor, SampleEncoding};
///
/// let fmt = FormatDescriptor::new(44_100, SampleEncoding::S16, ChannelLayout::Mono).unwrap();
/// let header = build_header(&fmt, 1_000);
/// assert_eq!(&header[0..4], b"RIFF");
/// assert_eq!(u32::from_le_bytes(header[0x28..0x2C].try_into().unwrap()), 1_000);
/// assert_eq!(u32::from_le_bytes(header[0x04..0x08].try_into().unwrap()), 1_044);
/// ```
pub fn build_header(format: &FormatDescriptor, payload_len: u32) -> [u8; WAV_HEADER_LEN] {
    let channels = format.channels().count();
    let bits = format.encoding().bits_per_sample();
    let block_align = channels * bits / 8;
    let riff_size = payload_len.wrapping_add(WAV_HEADER_LEN as u32);

    let mut h = [0u8; WAV_HEADER_LEN];
    h[0x00..0x04].copy_from_slice(b"RIFF");
    h[0x04..0x08].copy_from_slice(&riff_size.to_le_bytes());
    h[0x08..0x0C].copy_from_slice(b"WAVE");
    h[0x0C..0x10].copy_from_slice(b"fmt ");
    h[0x10..0x14].copy_from_slice(&16u32.to_le_bytes());
    h[0x14..0x16].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    h[0x16..0x18].copy_from_slice(&channels.to_le_bytes());
    h[0x18..0x1C].copy_from_slice(&format.sample_rate().to_le_bytes());
    h[0x1C..0x20].copy_from_slice(&format.byte_rate().to_le_bytes());
    h[0x20..0x22].copy_from_slice(&block_align.to_le_bytes());
    h[0x22..0x24].copy_from_slice(&bits.to_le_bytes());
    h[0x24..0x28].copy_from_slice(b"data");
    h[0x28..0x2C].copy_from_slice(&payload_len.to_le_bytes());
    h
}

/// Checked conversion of a payload length to the 32-bit header field.
pub fn header_payload_len(len: usize) -> Result<u32, WavError> {
    u32::try_from(len)
        .ok()
        .filter(|l| l.checked_add(WAV_HEADER_LEN as u32).is_some())
        .ok_or(WavError::PayloadTooLarge(len))
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Location and format of the audio inside a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavSource {
    /// Format declared by the `fmt ` chunk.
    pub format: FormatDescriptor,
    /// Byte range of the `data` chunk body within the file.
    pub data: Range<usize>,
}

/// Walk the RIFF chunk list of `bytes` and locate the audio payload.
///
/// A `data` chunk whose declared size runs past the end of the file is
/// clamped to the bytes actually present (streamed recordings often leave
/// the size unset).
pub fn read_wav(bytes: &[u8]) -> Result<WavSource, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotWav);
    }

    let mut format = None;
    let mut pos = 12;

    while pos < bytes.len() {
        if pos + 8 > bytes.len() {
            return Err(WavError::Truncated(pos));
        }
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4);
        let body = pos + 8;
        let end = body.saturating_add(size as usize).min(bytes.len());

        match id {
            b"fmt " => format = Some(parse_fmt(&bytes[body..end], size)?),
            b"data" => {
                let format = format.ok_or(WavError::MissingFmt)?;
                return Ok(WavSource {
                    format,
                    data: body..end,
                });
            }
            other => log::debug!(
                "wav: skipping chunk {:?} ({size} bytes)",
                String::from_utf8_lossy(other)
            ),
        }

        // Chunks are word aligned.
        pos = end + (size as usize & 1);
    }

    Err(WavError::MissingData)
}

fn parse_fmt(body: &[u8], declared: u32) -> Result<FormatDescriptor, WavError> {
    if body.len() < 16 {
        return Err(WavError::ShortFmt(declared));
    }
    let tag = read_u16(body, 0);
    let channels = read_u16(body, 2);
    let rate = read_u32(body, 4);
    let bits = read_u16(body, 14);

    let encoding = match (tag, bits) {
        (FORMAT_PCM, 8) => SampleEncoding::U8,
        (FORMAT_PCM, 16) => SampleEncoding::S16,
        (FORMAT_PCM, 32) => SampleEncoding::S32,
        (FORMAT_PCM, 64) => SampleEncoding::S64,
        (FORMAT_IEEE_FLOAT, 32) => SampleEncoding::F32,
        (FORMAT_IEEE_FLOAT, 64) => SampleEncoding::F64,
        (tag, bits) => return Err(WavError::UnsupportedEncoding { tag, bits }),
    };

    let layout = ChannelLayout::try_from(channels)?;
    Ok(FormatDescriptor::new(rate, encoding, layout)?)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
