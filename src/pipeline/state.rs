//! Controller state machine and the status snapshot shared with callers.
//!
//! [`ConversionState`] drives the controller.  Callers (a UI, the CLI)
//! poll it through [`SharedStatus`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// ConversionState
// ---------------------------------------------------------------------------

/// Phases of a conversion.
///
/// ```text
/// Idle ──start──▶ Loading ──formats differ──▶ Converting ──▶ Writing ──▶ Idle
///                    │                            │             ▲
///                    │                          stop            │
///                    │                            ▼             │
///                    │                        Stopping ─────────┤
///                    └──formats equal (copy)────────────────────┘
/// any phase ──error──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionState {
    /// Ready for the next request.
    #[default]
    Idle,
    /// Reading the source file from disk.
    Loading,
    /// The engine is running.
    Converting,
    /// A stop was requested; the engine finishes its current chunk.
    Stopping,
    /// Writing header and payload to the output file.
    Writing,
}

impl ConversionState {
    /// `true` while a request is being processed.
    ///
    /// ```
    /// use pcm_convert::pipeline::ConversionState;
    ///
    /// assert!(!ConversionState::Idle.is_busy());
    /// assert!(ConversionState::Converting.is_busy());
    /// assert!(ConversionState::Stopping.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, ConversionState::Idle)
    }

    /// Short label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            ConversionState::Idle => "Idle",
            ConversionState::Loading => "Loading",
            ConversionState::Converting => "Converting",
            ConversionState::Stopping => "Stopping",
            ConversionState::Writing => "Writing",
        }
    }
}

// ---------------------------------------------------------------------------
// ControllerStatus
// ---------------------------------------------------------------------------

/// Snapshot of what the controller is doing.
#[derive(Debug, Clone, Default)]
pub struct ControllerStatus {
    /// Current phase.
    pub phase: ConversionState,
    /// Last reported `(done, total)` source bytes.
    pub progress: (u64, u64),
    /// File written by the most recent successful conversion.
    pub last_output: Option<PathBuf>,
    /// Error text from the most recent failed conversion.
    pub last_error: Option<String>,
}

/// Thread-safe handle to [`ControllerStatus`].  Do not hold the lock across
/// `.await` points.
pub type SharedStatus = Arc<Mutex<ControllerStatus>>;

pub fn new_shared_status() -> SharedStatus {
    Arc::new(Mutex::new(ControllerStatus::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
