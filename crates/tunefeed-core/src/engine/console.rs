//! Engine that reports each tune on a text writer instead of playing it.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{EngineError, PlaybackEngine};
use crate::locator::Locator;

/// Writes `tune: <locator> [<FORMAT>]` for every tune call.
pub struct ConsoleEngine {
    out: Mutex<Box<dyn Write + Send>>,
    initialized: AtomicBool,
}

impl ConsoleEngine {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            initialized: AtomicBool::new(false),
        }
    }

    fn write_line(&self, line: &str) -> Result<(), EngineError> {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "{}", line)
            .and_then(|_| out.flush())
            .map_err(|e| EngineError::TuneFailed {
                reason: format!("console write: {}", e),
            })
    }
}

impl PlaybackEngine for ConsoleEngine {
    fn name(&self) -> &str {
        "console"
    }

    fn init(&self) -> Result<(), EngineError> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            tracing::debug!("console engine already initialized");
        } else {
            tracing::info!("console engine initialized");
        }
        Ok(())
    }

    fn tune(&self, locator: Option<Locator>) -> Result<(), EngineError> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(EngineError::NotInitialized);
        }
        match locator {
            Some(locator) => {
                let format = locator.format();
                tracing::info!(locator = %locator, %format, "tune");
                self.write_line(&format!("tune: {} [{}]", locator, format))
            }
            None => {
                tracing::info!("tune with no locator (end of input)");
                self.write_line("tune: <none>")
            }
        }
    }
}
