//! Cooperative cancellation of blocking motions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A shared flag asking any blocking motion or wait to finish early.
///
/// The flag is checked once per control cycle, so a raised abort takes
/// effect within one control period.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running motion to stop.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so new motions can run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
