//! Stateful sample-rate converters used by the chunk loop.
//!
//! [`RateConverter`] is the seam between the chunk loop in
//! [`convert`](super::convert) and the actual rate conversion.  Two
//! implementations exist:
//!
//! * [`SincConverter`]: band-limited sinc interpolation via `rubato`
//!   (`SincFixedIn` + `BlackmanHarris2` window).  Filter history is carried
//!   from one chunk to the next, so chunk boundaries leave no seams.
//! * [`Passthrough`]: used when only encoding or channel layout changes.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use serde::{Deserialize, Serialize};

use super::EngineError;

// ---------------------------------------------------------------------------
// SincSettings
// ---------------------------------------------------------------------------

/// Tuning for the sinc interpolation filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SincSettings {
    /// Filter length in taps.  Longer = steeper anti-aliasing, more delay.
    pub sinc_len: usize,
    /// Cutoff relative to the lower Nyquist frequency (0.0 – 1.0).
    pub f_cutoff: f32,
    /// Number of intermediate points between sinc samples.
    pub oversampling_factor: usize,
}

impl Default for SincSettings {
    fn default() -> Self {
        Self {
            sinc_len: 128,
            f_cutoff: 0.95,
            oversampling_factor: 128,
        }
    }
}

// ---------------------------------------------------------------------------
// RateConverter
// ---------------------------------------------------------------------------

/// Planar `f64` rate conversion that keeps state between calls.
///
/// Buffers are planar: one `Vec<f64>` per channel.  Output buffers must hold
/// at least [`output_frames_next`](Self::output_frames_next) frames per
/// channel.
pub trait RateConverter: Send {
    /// Frames of leading latency in the output stream.
    fn output_delay(&self) -> usize;

    /// Upper bound on frames the next call can write.
    fn output_frames_next(&self) -> usize;

    /// Convert one full chunk.  Returns the number of frames written.
    fn process(&mut self, input: &[Vec<f64>], output: &mut [Vec<f64>])
        -> Result<usize, EngineError>;

    /// Convert a short final chunk, or flush buffered history when `input`
    /// is `None`.  Returns the number of frames written.
    fn process_partial(
        &mut self,
        input: Option<&[Vec<f64>]>,
        output: &mut [Vec<f64>],
    ) -> Result<usize, EngineError>;
}

/// Build the converter for a `source_rate → target_rate` conversion of
/// `channels` channels fed `chunk_frames` frames at a time.
pub fn build_converter(
    source_rate: u32,
    target_rate: u32,
    channels: usize,
    chunk_frames: usize,
    settings: &SincSettings,
) -> Result<Box<dyn RateConverter>, EngineError> {
    if source_rate == target_rate {
        log::debug!("resampler: rates equal ({source_rate} Hz), using passthrough");
        return Ok(Box::new(Passthrough::new(chunk_frames)));
    }
    Ok(Box::new(SincConverter::new(
        source_rate,
        target_rate,
        channels,
        chunk_frames,
        settings,
    )?))
}

// ---------------------------------------------------------------------------
// SincConverter
// ---------------------------------------------------------------------------

/// `rubato::SincFixedIn` behind [`RateConverter`].
pub struct SincConverter {
    inner: SincFixedIn<f64>,
}

impl SincConverter {
    pub fn new(
        source_rate: u32,
        target_rate: u32,
        channels: usize,
        chunk_frames: usize,
        settings: &SincSettings,
    ) -> Result<Self, EngineError> {
        let params = SincInterpolationParameters {
            sinc_len: settings.sinc_len,
            f_cutoff: settings.f_cutoff,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: settings.oversampling_factor,
            window: WindowFunction::BlackmanHarris2,
        };

        let inner = SincFixedIn::<f64>::new(
            target_rate as f64 / source_rate as f64,
            1.0,
            params,
            chunk_frames,
            channels,
        )
        .map_err(|e| EngineError::ResamplerInit(e.to_string()))?;

        log::debug!(
            "resampler: sinc {source_rate} Hz -> {target_rate} Hz, {channels} ch, chunk {chunk_frames}, delay {} frames",
            inner.output_delay()
        );

        Ok(Self { inner })
    }
}

impl RateConverter for SincConverter {
    fn output_delay(&self) -> usize {
        self.inner.output_delay()
    }

    fn output_frames_next(&self) -> usize {
        self.inner.output_frames_next()
    }

    fn process(
        &mut self,
        input: &[Vec<f64>],
        output: &mut [Vec<f64>],
    ) -> Result<usize, EngineError> {
        let (_, written) = self
            .inner
            .process_into_buffer(input, output, None)
            .map_err(|e| EngineError::Conversion(e.to_string()))?;
        Ok(written)
    }

    fn process_partial(
        &mut self,
        input: Option<&[Vec<f64>]>,
        output: &mut [Vec<f64>],
    ) -> Result<usize, EngineError> {
        let (_, written) = self
            .inner
            .process_partial_into_buffer(input, output, None)
            .map_err(|e| EngineError::Conversion(e.to_string()))?;
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Passthrough
// ---------------------------------------------------------------------------

/// Copies input to output unchanged.  Zero delay.
pub struct Passthrough {
    chunk_frames: usize,
}

impl Passthrough {
    pub fn new(chunk_frames: usize) -> Self {
        Self { chunk_frames }
    }

    fn copy(input: &[Vec<f64>], output: &mut [Vec<f64>]) -> Result<usize, EngineError> {
        let frames = input.first().map_or(0, Vec::len);
        for (src, dst) in input.iter().zip(output.iter_mut()) {
            if dst.len() < src.len() {
                return Err(EngineError::Conversion(format!(
                    "output buffer holds {} frames, need {}",
                    dst.len(),
                    src.len()
                )));
            }
            dst[..src.len()].copy_from_slice(src);
        }
        Ok(frames)
    }
}

impl RateConverter for Passthrough {
    fn output_delay(&self) -> usize {
        0
    }

    fn output_frames_next(&self) -> usize {
        self.chunk_frames
    }

    fn process(
        &mut self,
        input: &[Vec<f64>],
        output: &mut [Vec<f64>],
    ) -> Result<usize, EngineError> {
        Self::copy(input, output)
    }

    fn process_partial(
        &mut self,
        input: Option<&[Vec<f64>]>,
        output: &mut [Vec<f64>],
    ) -> Result<usize, EngineError> {
        match input {
            Some(input) => Self::copy(input, output),
            None => Ok(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frames: usize, rate: f64, freq: f64) -> Vec<f64> {
        (0..frames)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / rate).sin() * 0.5)
            .collect()
    }

    #[test]
    fn equal_rates_use_passthrough() {
        let conv = build_converter(44_100, 44_100, 2, 1024, &SincSettings::default()).unwrap();
        assert_eq!(conv.output_delay(), 0);
        assert_eq!(conv.output_frames_next(), 1024);
    }

    #[test]
    fn passthrough_copies_and_flushes_nothing() {
        let mut conv = Passthrough::new(4);
        let input = vec![vec![0.1, 0.2, 0.3]];
        let mut output = vec![vec![0.0; 4]];
        assert_eq!(conv.process_partial(Some(&input), &mut output).unwrap(), 3);
        assert_eq!(&output[0][..3], &[0.1, 0.2, 0.3]);
        assert_eq!(conv.process_partial(None, &mut output).unwrap(), 0);
    }

    #[test]
    fn passthrough_rejects_small_output() {
        let mut conv = Passthrough::new(4);
        let input = vec![vec![0.0; 4]];
        let mut output = vec![vec![0.0; 2]];
        assert!(matches!(
            conv.process(&input, &mut output),
            Err(EngineError::Conversion(_))
        ));
    }

    #[test]
    fn sinc_reports_delay_and_capacity() {
        let conv = build_converter(48_000, 44_100, 1, 1024, &SincSettings::default()).unwrap();
        assert!(conv.output_delay() > 0);
        // 1024 * 44100 / 48000 = 940.8
        assert!(conv.output_frames_next() >= 941);
    }

    #[test]
    fn sinc_keeps_state_across_chunks() {
        // A 1 kHz tone split in two chunks must come out without a jump at
        // the boundary: compare against a single long run.
        let settings = SincSettings::default();
        let tone = sine(2048, 48_000.0, 1_000.0);

        let mut chunked = SincConverter::new(48_000, 32_000, 1, 1024, &settings).unwrap();
        let mut out_a = vec![vec![0.0; chunked.output_frames_next()]];
        let mut joined = Vec::new();
        for part in tone.chunks(1024) {
            let n = chunked.process(&[part.to_vec()], &mut out_a).unwrap();
            joined.extend_from_slice(&out_a[0][..n]);
        }

        let mut whole = SincConverter::new(48_000, 32_000, 1, 2048, &settings).unwrap();
        let mut out_b = vec![vec![0.0; whole.output_frames_next()]];
        let n = whole.process(&[tone.clone()], &mut out_b).unwrap();

        let common = joined.len().min(n);
        assert!(common > 1000);
        for i in 0..common {
            assert!(
                (joined[i] - out_b[0][i]).abs() < 1e-9,
                "sample {i}: {} vs {}",
                joined[i],
                out_b[0][i]
            );
        }
    }
}
