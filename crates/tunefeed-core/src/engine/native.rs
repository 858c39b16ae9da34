//! Playback engine living in a shared library, loaded at run time.
//!
//! The library must export two C functions:
//!
//! ```c
//! void engine_init(void);
//! void engine_tune(const char *locator); /* NULL at end of input */
//! ```
//!
//! Symbol names are configurable. Calls are serialized through a mutex, so
//! the library never sees init and tune concurrently.

use std::ffi::{c_char, CString};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use libloading::{Library, Symbol};

use super::{EngineError, PlaybackEngine};
use crate::locator::Locator;

type InitFn = unsafe extern "C" fn();
type TuneFn = unsafe extern "C" fn(*const c_char);

pub struct NativeEngine {
    path: PathBuf,
    init_fn: InitFn,
    tune_fn: TuneFn,
    /// `true` once init has run. Held for the duration of every call.
    initialized: Mutex<bool>,
    // Keeps the code behind `init_fn`/`tune_fn` mapped.
    _library: Library,
}

impl NativeEngine {
    /// Loads `path` and resolves the init and tune symbols.
    pub fn load(path: &Path, init_symbol: &str, tune_symbol: &str) -> Result<Self, EngineError> {
        // SAFETY: loading a foreign library runs its initializers; the operator chose it.
        let library = unsafe { Library::new(path) }.map_err(|source| EngineError::Library {
            path: path.to_path_buf(),
            source,
        })?;

        let init_fn = {
            // SAFETY: the symbol is declared as `void (*)(void)` by contract.
            let sym: Symbol<InitFn> = unsafe { library.get(init_symbol.as_bytes()) }
                .map_err(|source| EngineError::MissingSymbol {
                    symbol: init_symbol.to_string(),
                    path: path.to_path_buf(),
                    source,
                })?;
            *sym
        };
        let tune_fn = {
            // SAFETY: the symbol is declared as `void (*)(const char *)` by contract.
            let sym: Symbol<TuneFn> = unsafe { library.get(tune_symbol.as_bytes()) }
                .map_err(|source| EngineError::MissingSymbol {
                    symbol: tune_symbol.to_string(),
                    path: path.to_path_buf(),
                    source,
                })?;
            *sym
        };

        tracing::debug!(
            path = %path.display(),
            init_symbol,
            tune_symbol,
            "native engine library loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            init_fn,
            tune_fn,
            initialized: Mutex::new(false),
            _library: library,
        })
    }
}

impl PlaybackEngine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    fn init(&self) -> Result<(), EngineError> {
        let mut initialized = self.initialized.lock().unwrap_or_else(|e| e.into_inner());
        if *initialized {
            tracing::debug!(path = %self.path.display(), "native engine already initialized");
            return Ok(());
        }
        // SAFETY: `init_fn` was resolved from `_library`, which is still loaded.
        unsafe { (self.init_fn)() };
        *initialized = true;
        tracing::info!(path = %self.path.display(), "native engine initialized");
        Ok(())
    }

    fn tune(&self, locator: Option<Locator>) -> Result<(), EngineError> {
        let c_locator = match locator {
            Some(locator) => Some(CString::new(locator.into_string()).map_err(|e| {
                EngineError::InvalidLocator {
                    offset: e.nul_position(),
                }
            })?),
            None => None,
        };
        let ptr = c_locator
            .as_ref()
            .map_or(std::ptr::null(), |s| s.as_ptr());

        let initialized = self.initialized.lock().unwrap_or_else(|e| e.into_inner());
        if !*initialized {
            return Err(EngineError::NotInitialized);
        }
        // SAFETY: `tune_fn` is still mapped; `ptr` is null or a NUL-terminated
        // string that outlives the call.
        unsafe { (self.tune_fn)(ptr) };
        Ok(())
    }
}
