//! Playback engine seam.
//!
//! The engine is an explicitly owned handle shared between the launching
//! context (which calls [`PlaybackEngine::init`]) and the feeder worker
//! (which calls [`PlaybackEngine::tune`]). Implementations must tolerate
//! being called from either thread.

mod console;
mod error;
mod native;
mod recording;

pub use console::ConsoleEngine;
pub use error::EngineError;
pub use native::NativeEngine;
pub use recording::{EngineCall, RecordingEngine};

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{EngineBackend, EngineConfig};
use crate::locator::Locator;

/// Playback engine entry points as consumed by the feeder.
pub trait PlaybackEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Prepares engine state. Called once per session, before any tune.
    fn init(&self) -> Result<(), EngineError>;

    /// Starts or switches playback. `None` means the input reached end-of-input.
    fn tune(&self, locator: Option<Locator>) -> Result<(), EngineError>;
}

/// Builds the engine selected by `cfg`.
pub fn build_engine(cfg: &EngineConfig) -> Result<Arc<dyn PlaybackEngine>> {
    match cfg.backend {
        EngineBackend::Console => Ok(Arc::new(ConsoleEngine::stdout())),
        EngineBackend::Native => {
            let library = cfg
                .library
                .as_deref()
                .context("engine.backend = \"native\" requires engine.library")?;
            let engine = NativeEngine::load(library, &cfg.init_symbol, &cfg.tune_symbol)?;
            Ok(Arc::new(engine))
        }
    }
}
