//! Interactive locator feeder: the worker that prompts, reads a line, and
//! hands it to the engine's tune entry point, forever.
//!
//! The worker runs on its own OS thread because the read blocks. It talks to
//! the launching context through three one-shot channels: the start-up
//! acknowledgement, the init gate, and a completion signal used as a join
//! point on shutdown.

mod error;
mod gate;
mod worker;

pub use error::FeederError;
pub use gate::{init_gate, InitGate, InitSignal};

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::oneshot;

use crate::config::{EofPolicy, FeederConfig};
use crate::control::StopToken;
use crate::engine::PlaybackEngine;

/// Name of the worker thread (visible in debuggers and panic messages).
pub const WORKER_THREAD_NAME: &str = "locator-feeder";

/// Per-worker settings.
#[derive(Debug, Clone)]
pub struct FeederOptions {
    pub prompt: String,
    pub ack: String,
    pub on_eof: EofPolicy,
}

impl From<&FeederConfig> for FeederOptions {
    fn from(cfg: &FeederConfig) -> Self {
        Self {
            prompt: cfg.prompt.clone(),
            ack: cfg.ack.clone(),
            on_eof: cfg.on_eof,
        }
    }
}

impl Default for FeederOptions {
    fn default() -> Self {
        Self::from(&FeederConfig::default())
    }
}

/// Counters collected by the worker over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeederReport {
    /// Lines read (each forwarded as a locator).
    pub lines: u64,
    /// Reads that hit end-of-input.
    pub eof_reads: u64,
    /// Tune calls made, successful or not.
    pub tunes: u64,
    /// Tune calls the engine reported as failed.
    pub tune_failures: u64,
}

/// Handle to a running worker.
pub struct FeederHandle {
    ack: Option<oneshot::Receiver<String>>,
    done: Option<oneshot::Receiver<()>>,
    thread: JoinHandle<Result<FeederReport, FeederError>>,
}

impl FeederHandle {
    /// Waits for the worker's start-up acknowledgement. `None` if it was
    /// already taken or the worker ended without sending one.
    pub async fn acknowledged(&mut self) -> Option<String> {
        self.ack.take()?.await.ok()
    }

    /// Blocking form of [`FeederHandle::acknowledged`], for use outside a runtime.
    pub fn blocking_ack(&mut self) -> Option<String> {
        self.ack.take()?.blocking_recv().ok()
    }

    /// Resolves once the worker has left its loop. Cancel-safe.
    pub async fn finished(&mut self) {
        if let Some(rx) = self.done.as_mut() {
            let _ = rx.await;
            self.done = None;
        }
    }

    /// Blocks until the worker thread exits and returns its outcome.
    pub fn join(self) -> Result<FeederReport, FeederError> {
        self.thread.join().unwrap_or(Err(FeederError::Panicked))
    }
}

/// Launches the worker thread.
pub fn spawn_feeder<R, W>(
    engine: Arc<dyn PlaybackEngine>,
    input: R,
    output: W,
    options: FeederOptions,
    stop: StopToken,
    gate: InitGate,
) -> Result<FeederHandle, FeederError>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    let (ack_tx, ack_rx) = oneshot::channel();
    let (done_tx, done_rx) = oneshot::channel();

    let worker = worker::Worker {
        engine,
        input,
        output,
        options,
        stop,
        gate,
        ack_tx: Some(ack_tx),
    };

    let thread = std::thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let _done = worker::DoneGuard(Some(done_tx));
            worker.run()
        })
        .map_err(FeederError::Spawn)?;

    Ok(FeederHandle {
        ack: Some(ack_rx),
        done: Some(done_rx),
        thread,
    })
}
