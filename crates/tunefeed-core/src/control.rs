//! Stop token shared between the launching context and the feeder worker.
//!
//! The worker checks the token between iterations; a set token ends the loop
//! before the next prompt, and a line read after the token was set is
//! discarded rather than forwarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the worker to stop. Idempotent.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
