//! Deterministic stack walker for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::capture::{Frame, StackWalker};

/// Returns the same frames every time and counts how often it was asked.
pub(crate) struct FixedWalker {
    frames: Vec<Frame>,
    calls: Arc<AtomicUsize>,
}

impl FixedWalker {
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn single(function: &str, file: &str, line: u32) -> Self {
        Self::new(vec![Frame::new(function, file, line)])
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl StackWalker for FixedWalker {
    fn stack(&self, skip: usize) -> Vec<Frame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.frames.iter().skip(skip).cloned().collect()
    }
}
