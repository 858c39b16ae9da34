//! The read loop itself.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tokio::sync::oneshot;

use super::{FeederError, FeederOptions, FeederReport, InitGate};
use crate::config::EofPolicy;
use crate::control::StopToken;
use crate::engine::PlaybackEngine;
use crate::locator::Locator;

pub(super) struct Worker<R, W> {
    pub(super) engine: Arc<dyn PlaybackEngine>,
    pub(super) input: R,
    pub(super) output: W,
    pub(super) options: FeederOptions,
    pub(super) stop: StopToken,
    pub(super) gate: InitGate,
    pub(super) ack_tx: Option<oneshot::Sender<String>>,
}

/// Signals completion when the worker thread unwinds or returns.
pub(super) struct DoneGuard(pub(super) Option<oneshot::Sender<()>>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.0.take() {
            let _ = tx.send(());
        }
    }
}

impl<R: BufRead, W: Write> Worker<R, W> {
    pub(super) fn run(mut self) -> Result<FeederReport, FeederError> {
        let mut report = FeederReport::default();

        if let Some(tx) = self.ack_tx.take() {
            // The launching context may have stopped listening; the echo below still happens.
            let _ = tx.send(self.options.ack.clone());
        }
        writeln!(self.output, "{}", self.options.ack).map_err(FeederError::Output)?;
        tracing::debug!(engine = self.engine.name(), "feeder loop started");

        loop {
            if self.stop.is_stopped() {
                tracing::debug!("stop requested; leaving feeder loop");
                break;
            }

            self.prompt().map_err(FeederError::Output)?;
            let mut line = Vec::new();
            let read = self.read_line(&mut line).map_err(FeederError::Input)?;

            if self.stop.is_stopped() {
                tracing::debug!(bytes = read, "stop requested during read; line discarded");
                break;
            }

            let at_eof = read == 0;
            let locator = if at_eof {
                report.eof_reads += 1;
                None
            } else {
                report.lines += 1;
                Some(Locator::from_line(line))
            };

            self.gate.wait()?;

            let shown = locator
                .as_ref()
                .map_or_else(|| "<none>".to_string(), Locator::to_string);
            report.tunes += 1;
            match self.engine.tune(locator) {
                Ok(()) => tracing::debug!(locator = %shown, "tune forwarded"),
                Err(e) => {
                    report.tune_failures += 1;
                    tracing::warn!(locator = %shown, "tune failed: {}", e);
                }
            }

            if at_eof && self.options.on_eof == EofPolicy::Stop {
                tracing::info!("end of input; stopping feeder loop");
                break;
            }
        }

        tracing::debug!(?report, "feeder loop finished");
        Ok(report)
    }

    fn prompt(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", self.options.prompt)?;
        self.output.flush()
    }

    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<usize> {
        loop {
            match self.input.read_until(b'\n', line) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}
