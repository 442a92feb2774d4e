//! Conversion controller: drives load → convert/copy → write.
//!
//! [`ConversionController`] owns the [`CancellationFlag`] and the
//! [`SharedStatus`] and reports over three one-way channels bundled in
//! [`ConversionEvents`]: progress, diagnostic messages and completion.
//!
//! # Flow
//!
//! ```text
//! ConversionCommand::Start(request)
//!   └─▶ spawn_blocking(execute)
//!         ├─ Loading    read source fresh from disk, strip WAV header
//!         ├─ Converting engine::convert        (formats differ)
//!         │    └─ Stopping                     (ControllerHandle::stop)
//!         ├─ Writing    header (WAV) + payload, deleted again on failure
//!         └─ finished(ConversionOutcome)       → Idle
//! ```
//!
//! Every failure is caught here and turned into `success == false` plus a
//! diagnostic message; the controller is ready for the next request.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{MutexGuard, PoisonError};

use chrono::Local;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::container::{
    build_header, classify_path, header_payload_len, read_wav, SourceClassification, WavError,
};
use crate::engine::{convert, CancellationFlag, EngineError, EngineOptions};
use crate::format::{ContainerKind, FormatDescriptor};

use super::naming::output_path;
use super::state::{new_shared_status, ControllerStatus, ConversionState, SharedStatus};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Everything that can make a conversion fail.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source file could not be opened or read.
    #[error("cannot read source {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The engine failed; any partial output was discarded.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The payload cannot be described by a WAV header.
    #[error(transparent)]
    Header(#[from] WavError),

    /// The output file could not be written completely.  It has been
    /// removed.
    #[error("write file error ({path}): {reason}")]
    Write { path: PathBuf, reason: String },

    /// The destination container is neither WAV nor raw PCM.
    #[error("unsupported destination container; nothing written")]
    UnsupportedDestination,

    /// The conversion worker died.
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Request / events
// ---------------------------------------------------------------------------

/// A source file, classified once when it is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSource {
    path: PathBuf,
    classification: SourceClassification,
}

impl SelectedSource {
    /// Sniff `path` and remember the result.
    pub fn select(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let classification = classify_path(&path);
        Self {
            path,
            classification,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn classification(&self) -> SourceClassification {
        self.classification
    }
}

/// Everything needed to run one conversion.  Immutable once started.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub source: SelectedSource,
    /// Format of raw PCM sources.  WAV sources use their own header.
    pub source_format: FormatDescriptor,
    pub target_format: FormatDescriptor,
    pub target_container: ContainerKind,
}

/// Commands accepted by [`ConversionController::run`].
#[derive(Debug, Clone)]
pub enum ConversionCommand {
    Start(ConversionRequest),
}

/// Source bytes consumed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: u64,
    pub total: u64,
}

/// Completion report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// The output file was written in full.
    pub success: bool,
    /// The engine was stopped early; the written file holds the partial
    /// result.
    pub cancelled: bool,
    /// Path of the written file.
    pub output: Option<PathBuf>,
}

impl ConversionOutcome {
    fn failed() -> Self {
        Self {
            success: false,
            cancelled: false,
            output: None,
        }
    }
}

/// Receiving ends of the controller's channels.
pub struct ConversionEvents {
    pub progress: mpsc::UnboundedReceiver<Progress>,
    pub messages: mpsc::UnboundedReceiver<String>,
    pub finished: mpsc::UnboundedReceiver<ConversionOutcome>,
}

// ---------------------------------------------------------------------------
// ControllerHandle
// ---------------------------------------------------------------------------

/// Cloneable remote control for a controller running elsewhere.
#[derive(Clone)]
pub struct ControllerHandle {
    status: SharedStatus,
    cancel: CancellationFlag,
}

impl ControllerHandle {
    /// Ask the running conversion to stop at its next chunk boundary.  The
    /// partial result is still written.
    pub fn stop(&self) {
        self.cancel.cancel();
        let mut st = lock(&self.status);
        if st.phase == ConversionState::Converting {
            st.phase = ConversionState::Stopping;
        }
        log::info!("pipeline: stop requested ({})", st.phase.label());
    }

    pub fn status(&self) -> ControllerStatus {
        lock(&self.status).clone()
    }
}

// ---------------------------------------------------------------------------
// ConversionController
// ---------------------------------------------------------------------------

/// Runs conversions one at a time.
///
/// ```rust,no_run
/// use pcm_convert::config::AppConfig;
/// use pcm_convert::pipeline::{ConversionCommand, ConversionController};
///
/// # async fn example(request: pcm_convert::pipeline::ConversionRequest) {
/// let (controller, mut events) = ConversionController::from_config(&AppConfig::default());
/// let handle = controller.handle();
///
/// let (tx, rx) = tokio::sync::mpsc::channel(4);
/// tokio::spawn(controller.run(rx));
///
/// tx.send(ConversionCommand::Start(request)).await.unwrap();
/// let outcome = events.finished.recv().await.unwrap();
/// println!("success = {}", outcome.success);
/// # drop(handle);
/// # }
/// ```
#[derive(Clone)]
pub struct ConversionController {
    status: SharedStatus,
    cancel: CancellationFlag,
    options: EngineOptions,
    output_dir: Option<PathBuf>,
    progress_tx: mpsc::UnboundedSender<Progress>,
    message_tx: mpsc::UnboundedSender<String>,
    finished_tx: mpsc::UnboundedSender<ConversionOutcome>,
}

impl ConversionController {
    /// Create a controller writing into `output_dir` (the working directory
    /// when `None`).
    pub fn new(options: EngineOptions, output_dir: Option<PathBuf>) -> (Self, ConversionEvents) {
        let (progress_tx, progress) = mpsc::unbounded_channel();
        let (message_tx, messages) = mpsc::unbounded_channel();
        let (finished_tx, finished) = mpsc::unbounded_channel();

        let controller = Self {
            status: new_shared_status(),
            cancel: CancellationFlag::new(),
            options,
            output_dir,
            progress_tx,
            message_tx,
            finished_tx,
        };
        let events = ConversionEvents {
            progress,
            messages,
            finished,
        };
        (controller, events)
    }

    pub fn from_config(config: &AppConfig) -> (Self, ConversionEvents) {
        Self::new(config.engine.options(), config.output.directory.clone())
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            status: self.status.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Sniff `path` and report what it looks like on the message channel.
    pub fn select_source(&self, path: impl Into<PathBuf>) -> SelectedSource {
        let source = SelectedSource::select(path);
        let name = source
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.message(format!(
            "path: {}, file name: {name}, detected: {}",
            source.path().display(),
            source.classification().label()
        ));
        source
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `command_rx` is closed, executing one request at a time on
    /// the blocking thread pool.
    pub async fn run(self, mut command_rx: mpsc::Receiver<ConversionCommand>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                ConversionCommand::Start(request) => {
                    let worker = self.clone();
                    let joined = tokio::task::spawn_blocking(move || worker.execute(request)).await;
                    if let Err(e) = joined {
                        self.fail(&PipelineError::Internal(e.to_string()));
                        self.set_phase(ConversionState::Idle);
                        let _ = self.finished_tx.send(ConversionOutcome::failed());
                    }
                }
            }
        }

        log::info!("pipeline: command channel closed, controller shutting down");
    }

    /// Run one conversion to completion on the calling thread and report
    /// the outcome on the `finished` channel.
    pub fn execute(&self, request: ConversionRequest) -> ConversionOutcome {
        self.cancel.arm();
        {
            let mut st = self.lock_status();
            st.progress = (0, 0);
            st.last_error = None;
        }

        let outcome = match self.process(&request) {
            Ok(outcome) => {
                self.lock_status().last_output = outcome.output.clone();
                outcome
            }
            Err(e) => {
                self.fail(&e);
                ConversionOutcome::failed()
            }
        };

        self.set_phase(ConversionState::Idle);
        let _ = self.finished_tx.send(outcome.clone());
        outcome
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    fn process(&self, request: &ConversionRequest) -> Result<ConversionOutcome, PipelineError> {
        let extension = request
            .target_container
            .extension()
            .ok_or(PipelineError::UnsupportedDestination)?;

        // ── Loading ──────────────────────────────────────────────────────
        self.set_phase(ConversionState::Loading);
        let source = &request.source;
        let unreadable = |reason: String| PipelineError::SourceUnreadable {
            path: source.path().to_path_buf(),
            reason,
        };
        if source.classification() == SourceClassification::Unreadable {
            return Err(unreadable("file could not be opened when selected".into()));
        }
        let bytes = fs::read(source.path()).map_err(|e| unreadable(e.to_string()))?;
        let (payload, source_format) = self.locate_payload(&bytes, request);

        // ── Converting / copy ────────────────────────────────────────────
        let (converted, cancelled) = if source_format == request.target_format {
            self.message("source and destination formats match, copying".into());
            let total = payload.len() as u64;
            self.report_progress(total, total);
            (payload.to_vec(), false)
        } else {
            self.set_phase(ConversionState::Converting);
            self.message(format!(
                "converting {} bytes: {source_format} -> {}",
                payload.len(),
                request.target_format
            ));
            let out = convert(
                payload,
                &source_format,
                &request.target_format,
                &self.cancel,
                &self.options,
                |done, total| self.report_progress(done, total),
            )?;
            (out.payload, !out.completed)
        };

        if cancelled {
            self.message(format!(
                "conversion stopped, keeping {} converted bytes",
                converted.len()
            ));
        }

        // ── Writing ──────────────────────────────────────────────────────
        self.set_phase(ConversionState::Writing);
        self.message("ready to write to file".into());
        let path = self.write_output(request, extension, &converted)?;
        self.message(format!("write file success: {}", path.display()));

        Ok(ConversionOutcome {
            success: true,
            cancelled,
            output: Some(path),
        })
    }

    /// Audio bytes and their format.  WAV headers are stripped; a WAV that
    /// cannot be parsed is treated as raw PCM.
    fn locate_payload<'a>(
        &self,
        bytes: &'a [u8],
        request: &ConversionRequest,
    ) -> (&'a [u8], FormatDescriptor) {
        if request.source.classification() != SourceClassification::WavContainer {
            return (bytes, request.source_format);
        }
        match read_wav(bytes) {
            Ok(wav) => {
                self.message(format!(
                    "WAV source: {}, {} payload bytes",
                    wav.format,
                    wav.data.len()
                ));
                (&bytes[wav.data], wav.format)
            }
            Err(e) => {
                log::warn!("pipeline: WAV header unusable ({e}), treating as raw PCM");
                self.message(format!("WAV header unusable ({e}), treating file as raw PCM"));
                (bytes, request.source_format)
            }
        }
    }

    fn write_output(
        &self,
        request: &ConversionRequest,
        extension: &str,
        payload: &[u8],
    ) -> Result<PathBuf, PipelineError> {
        let header = match request.target_container {
            ContainerKind::Wav => Some(build_header(
                &request.target_format,
                header_payload_len(payload.len())?,
            )),
            _ => None,
        };

        let dir = self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let path = output_path(
            &dir,
            request.source.path(),
            extension,
            &Local::now().naive_local(),
        );

        match write_file(&path, header.as_ref().map(|h| h.as_slice()), payload) {
            Ok(()) => Ok(path),
            Err(e) => {
                if let Err(rm) = fs::remove_file(&path) {
                    log::debug!("pipeline: cleanup of {} failed: {rm}", path.display());
                }
                Err(PipelineError::Write {
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn lock_status(&self) -> MutexGuard<'_, ControllerStatus> {
        lock(&self.status)
    }

    fn set_phase(&self, phase: ConversionState) {
        let mut st = self.lock_status();
        // A stop that arrived during conversion keeps the Stopping label
        // until the engine hands back.
        if !(st.phase == ConversionState::Stopping && phase == ConversionState::Converting) {
            st.phase = phase;
        }
    }

    fn report_progress(&self, done: u64, total: u64) {
        self.lock_status().progress = (done, total);
        let _ = self.progress_tx.send(Progress { done, total });
    }

    fn message(&self, text: String) {
        log::info!("{text}");
        let _ = self.message_tx.send(text);
    }

    fn fail(&self, error: &PipelineError) {
        log::error!("pipeline error: {error}");
        self.lock_status().last_error = Some(error.to_string());
        let _ = self.message_tx.send(error.to_string());
    }
}

fn lock(status: &SharedStatus) -> MutexGuard<'_, ControllerStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write `header` then `payload` to a new file at `path` and check that the
/// file ends up exactly that long.
fn write_file(path: &Path, header: Option<&[u8]>, payload: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    let header = header.unwrap_or_default();
    file.write_all(header)?;
    file.write_all(payload)?;
    file.flush()?;

    let expected = (header.len() + payload.len()) as u64;
    let written = file.metadata()?.len();
    if written != expected {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("wrote {written} of {expected} bytes"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ChannelLayout, SampleEncoding};
    use tempfile::{tempdir, TempDir};

    fn fmt(rate: u32, enc: SampleEncoding, ch: ChannelLayout) -> FormatDescriptor {
        FormatDescriptor::new(rate, enc, ch).unwrap()
    }

    fn mono_s16(rate: u32) -> FormatDescriptor {
        fmt(rate, SampleEncoding::S16, ChannelLayout::Mono)
    }

    /// `frames` frames of a ramp as s16, `channels` interleaved.
    fn ramp_s16(frames: usize, channels: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(frames * channels * 2);
        for i in 0..frames {
            let v = ((i % 2000) as i16 - 1000) * 10;
            for _ in 0..channels {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    fn controller(dir: &TempDir) -> (ConversionController, ConversionEvents) {
        ConversionController::new(EngineOptions::default(), Some(dir.path().to_path_buf()))
    }

    fn request(
        path: &Path,
        source_format: FormatDescriptor,
        target_format: FormatDescriptor,
        target_container: ContainerKind,
    ) -> ConversionRequest {
        ConversionRequest {
            source: SelectedSource::select(path),
            source_format,
            target_format,
            target_container,
        }
    }

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[test]
    fn identical_formats_copy_bytes_exactly() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let src = input.path().join("clip.raw.pcm");
        let bytes = ramp_s16(5_000, 1);
        fs::write(&src, &bytes).unwrap();

        let (ctl, mut events) = controller(&output);
        let f = mono_s16(48_000);
        let outcome = ctl.execute(request(&src, f, f, ContainerKind::Raw));

        assert!(outcome.success);
        assert!(!outcome.cancelled);
        let out = outcome.output.unwrap();
        assert!(out
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("clip_"));
        assert_eq!(out.extension().unwrap(), "pcm");
        assert_eq!(fs::read(&out).unwrap(), bytes);
        assert_eq!(events.finished.try_recv().unwrap(), ConversionOutcome {
            success: true,
            cancelled: false,
            output: Some(out),
        });
    }

    #[test]
    fn two_seconds_48k_to_44k1_wav() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let src = input.path().join("speech.pcm");
        fs::write(&src, ramp_s16(96_000, 1)).unwrap();

        let (ctl, mut events) = controller(&output);
        let outcome = ctl.execute(request(
            &src,
            mono_s16(48_000),
            mono_s16(44_100),
            ContainerKind::Wav,
        ));

        assert!(outcome.success);
        let file = fs::read(outcome.output.unwrap()).unwrap();
        assert_eq!(file.len(), 44 + 176_400);
        assert_eq!(&file[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(file[0x28..0x2C].try_into().unwrap()), 176_400);
        assert_eq!(u32::from_le_bytes(file[0x04..0x08].try_into().unwrap()), 176_444);
        assert_eq!(u32::from_le_bytes(file[0x18..0x1C].try_into().unwrap()), 44_100);

        let mut last = None;
        while let Ok(p) = events.progress.try_recv() {
            if let Some(Progress { done, .. }) = last {
                assert!(p.done >= done);
            }
            last = Some(p);
        }
        assert_eq!(last, Some(Progress { done: 192_000, total: 192_000 }));
        assert_eq!(ctl.handle().status().phase, ConversionState::Idle);
    }

    #[test]
    fn wav_source_uses_header_and_strips_it() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let src = input.path().join("tone.wav");
        let wav_fmt = fmt(22_050, SampleEncoding::S16, ChannelLayout::Stereo);
        let payload = ramp_s16(3_000, 2);
        let mut file = build_header(&wav_fmt, payload.len() as u32).to_vec();
        file.extend_from_slice(&payload);
        fs::write(&src, &file).unwrap();

        let (ctl, _events) = controller(&output);
        // Wrong raw-PCM format on purpose: the header must win.
        let req = request(&src, mono_s16(8_000), wav_fmt, ContainerKind::Raw);
        assert_eq!(req.source.classification(), SourceClassification::WavContainer);

        let outcome = ctl.execute(req);
        assert!(outcome.success);
        assert_eq!(fs::read(outcome.output.unwrap()).unwrap(), payload);
    }

    #[test]
    fn unreadable_source_fails_without_output() {
        let output = tempdir().unwrap();
        let (ctl, mut events) = controller(&output);
        let missing = output.path().join("missing.pcm");

        let outcome = ctl.execute(request(
            &missing,
            mono_s16(48_000),
            mono_s16(44_100),
            ContainerKind::Wav,
        ));

        assert!(!outcome.success);
        assert!(files_in(output.path()).is_empty());
        assert!(!events.finished.try_recv().unwrap().success);
        let status = ctl.handle().status();
        assert_eq!(status.phase, ConversionState::Idle);
        assert!(status.last_error.unwrap().contains("cannot read source"));
    }

    #[test]
    fn unsupported_container_writes_nothing() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let src = input.path().join("a.pcm");
        fs::write(&src, ramp_s16(100, 1)).unwrap();

        let (ctl, _events) = controller(&output);
        let outcome = ctl.execute(request(
            &src,
            mono_s16(48_000),
            mono_s16(44_100),
            ContainerKind::Unsupported,
        ));

        assert!(!outcome.success);
        assert!(files_in(output.path()).is_empty());
    }

    #[test]
    fn write_failure_reports_error() {
        let input = tempdir().unwrap();
        let src = input.path().join("a.pcm");
        fs::write(&src, ramp_s16(100, 1)).unwrap();
        let missing_dir = input.path().join("no").join("such").join("dir");

        let (ctl, _events) =
            ConversionController::new(EngineOptions::default(), Some(missing_dir.clone()));
        let f = mono_s16(48_000);
        let outcome = ctl.execute(request(&src, f, f, ContainerKind::Wav));

        assert!(!outcome.success);
        assert!(!missing_dir.exists());
        assert!(ctl
            .handle()
            .status()
            .last_error
            .unwrap()
            .contains("write file error"));
    }

    #[test]
    fn extreme_rate_wav_is_written_and_controller_returns_to_idle() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let src = input.path().join("fast.pcm");
        let bytes = vec![0u8; 16 * 8];
        fs::write(&src, &bytes).unwrap();

        let (ctl, _events) = controller(&output);
        let f = fmt(400_000_000, SampleEncoding::F64, ChannelLayout::Stereo);
        let outcome = ctl.execute(request(&src, f, f, ContainerKind::Wav));

        assert!(outcome.success);
        let file = fs::read(outcome.output.unwrap()).unwrap();
        assert_eq!(file.len(), 44 + bytes.len());
        assert_eq!(ctl.handle().status().phase, ConversionState::Idle);
    }

    #[test]
    fn select_source_reports_classification() {
        let input = tempdir().unwrap();
        let src = input.path().join("x.wav");
        fs::write(&src, b"RIFF\0\0\0\0WAVEfmt ").unwrap();

        let (ctl, mut events) = controller(&input);
        let selected = ctl.select_source(&src);

        assert_eq!(selected.classification(), SourceClassification::WavContainer);
        assert!(events.messages.try_recv().unwrap().contains("WAV container"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_writes_partial_result_and_reports_success() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let src = input.path().join("long.pcm");
        // 30 s of stereo: far more chunks than it takes to deliver the stop.
        let frames = 48_000 * 30;
        fs::write(&src, ramp_s16(frames, 2)).unwrap();

        let (ctl, mut events) = controller(&output);
        let handle = ctl.handle();
        let (tx, rx) = mpsc::channel(4);
        let worker = tokio::spawn(ctl.run(rx));

        let stereo = |rate| fmt(rate, SampleEncoding::S16, ChannelLayout::Stereo);
        tx.send(ConversionCommand::Start(request(
            &src,
            stereo(48_000),
            stereo(44_100),
            ContainerKind::Raw,
        )))
        .await
        .unwrap();

        while let Some(p) = events.progress.recv().await {
            if p.done > 0 {
                handle.stop();
                break;
            }
        }

        let outcome = events.finished.recv().await.unwrap();
        assert!(outcome.success);
        assert!(outcome.cancelled);
        let written = fs::metadata(outcome.output.unwrap()).unwrap().len();
        let full = crate::engine::expected_output_frames(frames, 48_000, 44_100) as u64 * 4;
        assert!(written < full, "{written} >= {full}");

        drop(tx);
        worker.await.unwrap();
        assert_eq!(handle.status().phase, ConversionState::Idle);
    }

    #[tokio::test]
    async fn run_processes_requests_in_order() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let a = input.path().join("a.pcm");
        let b = input.path().join("b.pcm");
        fs::write(&a, ramp_s16(2_000, 1)).unwrap();
        fs::write(&b, ramp_s16(2_000, 1)).unwrap();

        let (ctl, mut events) = controller(&output);
        let (tx, rx) = mpsc::channel(4);
        let f = mono_s16(16_000);
        let g = fmt(16_000, SampleEncoding::F32, ChannelLayout::Mono);
        tx.send(ConversionCommand::Start(request(&a, f, g, ContainerKind::Wav)))
            .await
            .unwrap();
        tx.send(ConversionCommand::Start(request(&b, f, g, ContainerKind::Raw)))
            .await
            .unwrap();
        drop(tx);

        ctl.run(rx).await;

        let first = events.finished.recv().await.unwrap();
        let second = events.finished.recv().await.unwrap();
        assert_eq!(first.output.unwrap().extension().unwrap(), "wav");
        let second = second.output.unwrap();
        assert_eq!(second.extension().unwrap(), "pcm");
        assert_eq!(fs::metadata(second).unwrap().len(), 2_000 * 4);
    }
}
