//! Conversion pipeline: one request from source file to written output.
//!
//! # Architecture
//!
//! ```text
//! ConversionCommand (mpsc)
//!        │
//!        ▼
//! ConversionController::run()  ← async tokio task
//!        │
//!        └─ Start(request)
//!              │
//!              └─ spawn_blocking(execute)
//!                    ├─ fs::read + WAV header strip        → Loading
//!                    ├─ engine::convert  (or plain copy)   → Converting
//!                    └─ header + payload to disk           → Writing
//!
//! ConversionEvents ◀── progress / messages / finished (unbounded mpsc)
//! SharedStatus (Arc<Mutex<ControllerStatus>>) ◀── polled by callers
//! ControllerHandle::stop() ──▶ CancellationFlag
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use pcm_convert::config::AppConfig;
//! use pcm_convert::format::ContainerKind;
//! use pcm_convert::pipeline::{ConversionController, ConversionRequest};
//!
//! let config = AppConfig::default();
//! let (controller, _events) = ConversionController::from_config(&config);
//! let source = controller.select_source("speech.pcm");
//!
//! let outcome = controller.execute(ConversionRequest {
//!     source,
//!     source_format: config.source.descriptor().unwrap(),
//!     target_format: config.target.descriptor().unwrap(),
//!     target_container: ContainerKind::Wav,
//! });
//! println!("{outcome:?}");
//! ```

pub mod naming;
pub mod runner;
pub mod state;

pub use naming::{output_file_name, output_path, source_stem};
pub use runner::{
    ControllerHandle, ConversionCommand, ConversionController, ConversionEvents,
    ConversionOutcome, ConversionRequest, PipelineError, Progress, SelectedSource,
};
pub use state::{new_shared_status, ControllerStatus, ConversionState, SharedStatus};
