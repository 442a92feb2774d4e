//! The chunked conversion loop.
//!
//! # Per-chunk flow
//!
//! ```text
//! payload[offset..offset + chunk] ──decode_frames──▶ planar f64 (target channels)
//!     ──RateConverter──▶ planar f64 @ target rate
//!     ──skip delay / clamp to expected length──▶ encode_frames ──▶ append
//! on_progress(done, total)
//! cancel flag polled ─▶ stop
//! ```
//!
//! After the last chunk of a completed pass the converter is flushed until
//! the output holds exactly `ceil(frames × target_rate / source_rate)`
//! frames.  A cancelled pass is not flushed.

use crate::format::sample::{decode_frames, encode_frames};
use crate::format::FormatDescriptor;

use super::resampler::{build_converter, SincSettings};
use super::{CancellationFlag, EngineError};

/// Source frames fed to the converter per step.
pub const DEFAULT_CHUNK_FRAMES: usize = 1024;

// ---------------------------------------------------------------------------
// Options / output
// ---------------------------------------------------------------------------

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub chunk_frames: usize,
    pub sinc: SincSettings,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            sinc: SincSettings::default(),
        }
    }
}

/// What a conversion pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    /// Converted bytes, in chunk order.
    pub payload: Vec<u8>,
    /// `false` when the pass was stopped through the cancellation flag.
    /// A stopped pass is still a successful one; `payload` holds everything
    /// converted up to the stop.
    pub completed: bool,
    /// Whole source frames consumed.
    pub frames_in: usize,
    /// Frames written to `payload`.
    pub frames_out: usize,
}

// ---------------------------------------------------------------------------
// Sizing helpers
// ---------------------------------------------------------------------------

/// Output capacity for one step: `ceil(input × target / source)` plus the
/// converter's delay.
///
/// ```
/// use pcm_convert::engine::required_output_frames;
///
/// assert_eq!(required_output_frames(1024, 0, 48_000, 44_100), 941);
/// assert_eq!(required_output_frames(1024, 10, 44_100, 48_000), 1125);
/// ```
pub fn required_output_frames(
    input_frames: usize,
    delay: usize,
    source_rate: u32,
    target_rate: u32,
) -> usize {
    ceil_rescale(input_frames, source_rate, target_rate) + delay
}

/// Total output length of a completed pass.
pub fn expected_output_frames(input_frames: usize, source_rate: u32, target_rate: u32) -> usize {
    ceil_rescale(input_frames, source_rate, target_rate)
}

fn ceil_rescale(frames: usize, source_rate: u32, target_rate: u32) -> usize {
    let num = frames as u128 * target_rate as u128;
    let den = source_rate as u128;
    ((num + den - 1) / den) as usize
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

/// Convert `payload` from `source` to `target`.
///
/// `on_progress(done, total)` is called once before the first chunk with
/// `done = 0` and once after every chunk; `done` never decreases and equals
/// `total` (the payload length in bytes) only when the whole payload was
/// consumed.
///
/// The pass stops at the first chunk boundary where `cancel` is no longer
/// armed.  That is not an error: the returned output has
/// `completed == false` and carries what was converted so far.
///
/// # Errors
///
/// * [`EngineError::InvalidChunkSize`]: `options.chunk_frames` is zero.
/// * [`EngineError::ResamplerInit`]: the rate converter could not be built.
/// * [`EngineError::Conversion`]: a conversion step failed; the partial
///   payload is dropped.
pub fn convert<F>(
    payload: &[u8],
    source: &FormatDescriptor,
    target: &FormatDescriptor,
    cancel: &CancellationFlag,
    options: &EngineOptions,
    mut on_progress: F,
) -> Result<ConversionOutput, EngineError>
where
    F: FnMut(u64, u64),
{
    let chunk_frames = options.chunk_frames;
    if chunk_frames == 0 {
        return Err(EngineError::InvalidChunkSize);
    }

    let total = payload.len() as u64;
    let frame_bytes = source.frame_bytes();
    let total_frames = payload.len() / frame_bytes;
    let usable = total_frames * frame_bytes;
    if usable < payload.len() {
        log::warn!(
            "engine: ignoring {} trailing bytes that do not form a whole {}-byte frame",
            payload.len() - usable,
            frame_bytes
        );
    }

    let channels = target.channels().count() as usize;
    let (src_rate, dst_rate) = (source.sample_rate(), target.sample_rate());
    let mut converter =
        build_converter(src_rate, dst_rate, channels, chunk_frames, &options.sinc)?;

    let delay = converter.output_delay();
    let expected = expected_output_frames(total_frames, src_rate, dst_rate);

    let mut capacity = required_output_frames(chunk_frames, delay, src_rate, dst_rate)
        .max(converter.output_frames_next());
    let mut planar_in: Vec<Vec<f64>> = vec![Vec::with_capacity(chunk_frames); channels];
    let mut planar_out: Vec<Vec<f64>> = vec![vec![0.0; capacity]; channels];

    let mut sink = FrameSink {
        out: Vec::with_capacity(expected * target.frame_bytes()),
        skip: delay,
        emitted: 0,
        limit: expected,
        target: *target,
    };

    log::debug!(
        "engine: {source} -> {target}, {total_frames} frames in, {expected} frames expected"
    );

    on_progress(0, total);

    let chunk_bytes = chunk_frames * frame_bytes;
    let mut offset = 0;
    let mut completed = true;

    while offset < usable {
        let end = (offset + chunk_bytes).min(usable);
        let frames = decode_frames(
            &payload[offset..end],
            source.encoding(),
            source.channels(),
            target.channels(),
            &mut planar_in,
        );

        let needed = required_output_frames(frames, converter.output_delay(), src_rate, dst_rate)
            .max(converter.output_frames_next());
        if needed > capacity {
            log::debug!("engine: growing output buffer {capacity} -> {needed} frames");
            for channel in planar_out.iter_mut() {
                channel.resize(needed, 0.0);
            }
            capacity = needed;
        }

        let written = if frames == chunk_frames {
            converter.process(&planar_in, &mut planar_out)?
        } else {
            converter.process_partial(Some(&planar_in), &mut planar_out)?
        };
        sink.push(&planar_out, written);
        log::trace!("engine: chunk @{offset}: {frames} in, {written} out");

        offset = end;
        let done = if offset >= usable { total } else { offset as u64 };
        on_progress(done, total);

        if offset < usable && !cancel.is_armed() {
            log::info!("engine: stopped at byte {offset} of {total}");
            completed = false;
            break;
        }
    }

    if completed && usable == 0 && total > 0 {
        on_progress(total, total);
    }

    if completed {
        // Drain the filter tail.  Each flush feeds one chunk of silence, so
        // the rounds needed follow from the frames still missing at the
        // source rate.  Small chunks may yield zero frames on some rounds.
        let missing = sink.skip + (expected - sink.emitted);
        let max_rounds =
            ceil_rescale(missing, dst_rate, src_rate).div_ceil(chunk_frames) + 4;
        let mut rounds = 0;
        while sink.emitted < expected && rounds < max_rounds {
            let written = converter.process_partial(None, &mut planar_out)?;
            sink.push(&planar_out, written);
            rounds += 1;
        }
        if sink.emitted < expected {
            log::warn!(
                "engine: produced {} of {expected} expected frames",
                sink.emitted
            );
        }
    }

    Ok(ConversionOutput {
        frames_in: offset / frame_bytes,
        frames_out: sink.emitted,
        payload: sink.out,
        completed,
    })
}

/// Accumulates encoded output, dropping the converter's leading delay and
/// anything past the expected length.
struct FrameSink {
    out: Vec<u8>,
    skip: usize,
    emitted: usize,
    limit: usize,
    target: FormatDescriptor,
}

impl FrameSink {
    fn push(&mut self, planar: &[Vec<f64>], written: usize) {
        let skipped = self.skip.min(written);
        self.skip -= skipped;
        let take = (written - skipped).min(self.limit - self.emitted);
        encode_frames(planar, skipped, take, self.target.encoding(), &mut self.out);
        self.emitted += take;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
