//! One-shot init gate: the worker makes no tune call until init succeeded.

use std::sync::Arc;

use tokio::sync::oneshot;

use super::FeederError;
use crate::engine::EngineError;

type InitOutcome = Result<(), Arc<EngineError>>;

/// Sending half, held by the context that runs engine init.
#[derive(Debug)]
pub struct InitSignal(oneshot::Sender<InitOutcome>);

impl InitSignal {
    pub fn open(self) {
        let _ = self.0.send(Ok(()));
    }

    pub fn fail(self, error: Arc<EngineError>) {
        let _ = self.0.send(Err(error));
    }
}

#[derive(Debug)]
enum GateState {
    Pending(oneshot::Receiver<InitOutcome>),
    Open,
    Failed(Arc<EngineError>),
    Abandoned,
}

/// Receiving half, held by the feeder worker.
#[derive(Debug)]
pub struct InitGate {
    state: GateState,
}

pub fn init_gate() -> (InitSignal, InitGate) {
    let (tx, rx) = oneshot::channel();
    (
        InitSignal(tx),
        InitGate {
            state: GateState::Pending(rx),
        },
    )
}

impl InitGate {
    /// A gate for an engine that is already initialized.
    pub fn opened() -> Self {
        Self {
            state: GateState::Open,
        }
    }

    /// Blocks until the init outcome is known; returns immediately afterwards.
    ///
    /// Must not be called from inside an async runtime context.
    pub fn wait(&mut self) -> Result<(), FeederError> {
        let state = std::mem::replace(&mut self.state, GateState::Abandoned);
        self.state = match state {
            GateState::Pending(rx) => {
                tracing::debug!("waiting for engine init before first tune");
                match rx.blocking_recv() {
                    Ok(Ok(())) => GateState::Open,
                    Ok(Err(error)) => GateState::Failed(error),
                    Err(_) => GateState::Abandoned,
                }
            }
            resolved => resolved,
        };
        match &self.state {
            GateState::Open => Ok(()),
            GateState::Failed(error) => Err(FeederError::InitFailed(Arc::clone(error))),
            GateState::Abandoned => Err(FeederError::InitAbandoned),
            GateState::Pending(_) => unreachable!("pending state is resolved above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opened_gate_passes() {
        let mut gate = InitGate::opened();
        assert!(gate.wait().is_ok());
    }

    #[test]
    fn waits_for_signal_from_other_thread() {
        let (signal, mut gate) = init_gate();
        let t = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            signal.open();
        });
        assert!(gate.wait().is_ok());
        assert!(gate.wait().is_ok());
        t.join().unwrap();
    }

    #[test]
    fn failure_is_sticky_and_keeps_engine_error() {
        let (signal, mut gate) = init_gate();
        signal.fail(Arc::new(EngineError::InitFailed {
            reason: "no decoder".to_string(),
        }));
        for _ in 0..2 {
            match gate.wait() {
                Err(FeederError::InitFailed(error)) => {
                    assert!(matches!(*error, EngineError::InitFailed { .. }));
                    assert_eq!(error.to_string(), "engine initialization failed: no decoder");
                }
                other => panic!("expected InitFailed, got {:?}", other),
            }
        }
    }

    #[test]
    fn dropped_signal_abandons() {
        let (signal, mut gate) = init_gate();
        drop(signal);
        assert!(matches!(gate.wait(), Err(FeederError::InitAbandoned)));
    }
}
