//! Engine that records calls instead of playing anything.

use std::sync::Mutex;

use super::{EngineError, PlaybackEngine};
use crate::locator::Locator;

/// One call received by a [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Init,
    Tune(Option<String>),
}

/// Records every call in arrival order. Can be told to fail init or tunes.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    fail_init: bool,
    fail_tune_containing: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Init records the call and then fails.
    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// Tunes whose locator contains `needle` record the call and then fail.
    pub fn failing_tunes_containing(needle: impl Into<String>) -> Self {
        Self {
            fail_tune_containing: Some(needle.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn init_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Init))
            .count()
    }

    /// Arguments of every tune call, in order.
    pub fn tunes(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Tune(arg) => Some(arg),
                EngineCall::Init => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl PlaybackEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn init(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Init);
        if self.fail_init {
            return Err(EngineError::InitFailed {
                reason: "recording engine configured to fail init".to_string(),
            });
        }
        Ok(())
    }

    fn tune(&self, locator: Option<Locator>) -> Result<(), EngineError> {
        let arg = locator.map(Locator::into_string);
        let fails = match (&self.fail_tune_containing, &arg) {
            (Some(needle), Some(text)) => text.contains(needle.as_str()),
            _ => false,
        };
        self.record(EngineCall::Tune(arg));
        if fails {
            return Err(EngineError::TuneFailed {
                reason: "recording engine configured to fail this locator".to_string(),
            });
        }
        Ok(())
    }
}
