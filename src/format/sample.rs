//! Little-endian sample codec and channel remixing.
//!
//! Every encoding is mapped into a normalised `f64` where full scale is
//! `[-1.0, 1.0)`:
//!
//! | Encoding | Decode |
//! |----------|--------|
//! | `u8`  | `(x - 128) / 128` |
//! | `sN`  | `x / 2^(N-1)` |
//! | `f32` / `f64` | as-is |
//!
//! Encoding back to an integer type rounds to nearest and saturates.
//! Float outputs are written unclamped so no headroom is lost.

use super::{ChannelLayout, SampleEncoding};

const SCALE_U8: f64 = 128.0;
const SCALE_S16: f64 = 32_768.0;
const SCALE_S32: f64 = 2_147_483_648.0;
const SCALE_S64: f64 = 9_223_372_036_854_775_808.0;

// ---------------------------------------------------------------------------
// Single samples
// ---------------------------------------------------------------------------

/// Decode the sample at the start of `bytes`.
///
/// `bytes` must hold at least `encoding.byte_width()` bytes.
pub fn decode_sample(bytes: &[u8], encoding: SampleEncoding) -> f64 {
    match encoding {
        SampleEncoding::U8 => (bytes[0] as f64 - SCALE_U8) / SCALE_U8,
        SampleEncoding::S16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64 / SCALE_S16,
        SampleEncoding::S32 => i32::from_le_bytes(le4(bytes)) as f64 / SCALE_S32,
        SampleEncoding::S64 => i64::from_le_bytes(le8(bytes)) as f64 / SCALE_S64,
        SampleEncoding::F32 => f32::from_le_bytes(le4(bytes)) as f64,
        SampleEncoding::F64 => f64::from_le_bytes(le8(bytes)),
    }
}

/// Append the encoded form of `value` to `out`.
pub fn encode_sample(value: f64, encoding: SampleEncoding, out: &mut Vec<u8>) {
    match encoding {
        SampleEncoding::U8 => {
            let v = (value * SCALE_U8).round().clamp(-128.0, 127.0) as i16 + 128;
            out.push(v as u8);
        }
        SampleEncoding::S16 => {
            let v = (value * SCALE_S16).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
        SampleEncoding::S32 => {
            let v = (value * SCALE_S32).round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
            out.extend_from_slice(&v.to_le_bytes());
        }
        SampleEncoding::S64 => {
            // `as` saturates at the i64 bounds.
            let v = (value * SCALE_S64).round() as i64;
            out.extend_from_slice(&v.to_le_bytes());
        }
        SampleEncoding::F32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
        SampleEncoding::F64 => out.extend_from_slice(&value.to_le_bytes()),
    }
}

fn le4(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

fn le8(bytes: &[u8]) -> [u8; 8] {
    [
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Decode whole interleaved frames from `bytes` into planar buffers laid out
/// for `target` channels, remixing on the way.
///
/// * mono → stereo duplicates the single channel.
/// * stereo → mono averages left and right.
///
/// `planar` must have `target.count()` channels; each is cleared and refilled.
/// Trailing bytes that do not form a whole frame are ignored.  Returns the
/// number of frames decoded.
pub fn decode_frames(
    bytes: &[u8],
    encoding: SampleEncoding,
    source: ChannelLayout,
    target: ChannelLayout,
    planar: &mut [Vec<f64>],
) -> usize {
    let width = encoding.byte_width();
    let frame_bytes = width * source.count() as usize;

    for channel in planar.iter_mut() {
        channel.clear();
    }

    let mut frames = 0;
    for frame in bytes.chunks_exact(frame_bytes) {
        let first = decode_sample(frame, encoding);
        match (source, target) {
            (ChannelLayout::Mono, ChannelLayout::Mono) => planar[0].push(first),
            (ChannelLayout::Mono, ChannelLayout::Stereo) => {
                planar[0].push(first);
                planar[1].push(first);
            }
            (ChannelLayout::Stereo, ChannelLayout::Mono) => {
                let second = decode_sample(&frame[width..], encoding);
                planar[0].push((first + second) * 0.5);
            }
            (ChannelLayout::Stereo, ChannelLayout::Stereo) => {
                planar[0].push(first);
                planar[1].push(decode_sample(&frame[width..], encoding));
            }
        }
        frames += 1;
    }
    frames
}

/// Interleave `frames` frames starting at `offset` from the planar buffers
/// and append them to `out` in `encoding`.
pub fn encode_frames(
    planar: &[Vec<f64>],
    offset: usize,
    frames: usize,
    encoding: SampleEncoding,
    out: &mut Vec<u8>,
) {
    out.reserve(frames * planar.len() * encoding.byte_width());
    for i in offset..offset + frames {
        for channel in planar {
            encode_sample(channel[i], encoding, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
