//! Cooperative stop signal shared between the controller and the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "keep running" flag.
///
/// The engine polls [`is_armed`](Self::is_armed) once per chunk and stops at
/// the next chunk boundary after [`cancel`](Self::cancel).  The flag is never
/// re-armed automatically: every conversion must call [`arm`](Self::arm)
/// before it starts.  A freshly created flag is disarmed.
///
/// Cheap to clone; all clones observe the same state.
///
/// ```
/// use pcm_convert::engine::CancellationFlag;
///
/// let flag = CancellationFlag::new();
/// let remote = flag.clone();
/// flag.arm();
/// assert!(flag.is_armed());
/// remote.cancel();
/// assert!(!flag.is_armed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    running: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the next conversion to run.
    pub fn arm(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Ask a running conversion to stop at its next chunk boundary.
    pub fn cancel(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
