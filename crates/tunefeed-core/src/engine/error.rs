//! Engine error type.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("failed to load engine library {}", path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("missing symbol `{symbol}` in {}", path.display())]
    MissingSymbol {
        symbol: String,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("engine not initialized")]
    NotInitialized,

    #[error("locator contains an interior NUL byte at offset {offset}")]
    InvalidLocator { offset: usize },

    #[error("engine initialization failed: {reason}")]
    InitFailed { reason: String },

    #[error("tune failed: {reason}")]
    TuneFailed { reason: String },
}
