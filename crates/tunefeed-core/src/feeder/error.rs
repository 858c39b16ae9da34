//! Reasons the feeder worker can end early.

use std::io;
use std::sync::Arc;

use crate::engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum FeederError {
    #[error("reading locator input")]
    Input(#[source] io::Error),

    #[error("writing prompt")]
    Output(#[source] io::Error),

    #[error("engine initialization failed")]
    InitFailed(#[source] Arc<EngineError>),

    #[error("engine initialization was abandoned before completing")]
    InitAbandoned,

    #[error("failed to spawn feeder worker")]
    Spawn(#[source] io::Error),

    #[error("feeder worker panicked")]
    Panicked,
}
