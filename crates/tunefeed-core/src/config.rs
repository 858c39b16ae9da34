use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the feeder does when a read hits end-of-input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EofPolicy {
    /// Forward an absent locator to the engine and keep reading.
    #[default]
    Forward,
    /// Forward an absent locator once, then end the loop.
    Stop,
}

/// Which playback engine the session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    /// Prints each tune to stdout; no native library involved.
    #[default]
    Console,
    /// Shared library loaded at run time.
    Native,
}

/// `[engine]` section of config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub backend: EngineBackend,
    /// Path to the engine shared library (required for the native backend).
    #[serde(default)]
    pub library: Option<PathBuf>,
    /// Exported symbol called once to initialize the engine.
    #[serde(default = "default_init_symbol")]
    pub init_symbol: String,
    /// Exported symbol called with each locator (NUL-terminated, or null at end-of-input).
    #[serde(default = "default_tune_symbol")]
    pub tune_symbol: String,
}

fn default_init_symbol() -> String {
    "engine_init".to_string()
}

fn default_tune_symbol() -> String {
    "engine_tune".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: EngineBackend::Console,
            library: None,
            init_symbol: default_init_symbol(),
            tune_symbol: default_tune_symbol(),
        }
    }
}

pub const DEFAULT_PROMPT: &str = "enter DASH or HLS locator";
pub const DEFAULT_BANNER: &str = "tunefeed: interactive locator feeder";
pub const DEFAULT_ACK: &str = "cli";

/// Global configuration loaded from `~/.config/tunefeed/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    /// Prompt written before every read.
    pub prompt: String,
    /// Line written once when the session starts.
    pub banner: String,
    /// Token the worker sends back to the launching context on start-up.
    pub ack: String,
    /// Behavior on end-of-input: "forward" (default) or "stop".
    #[serde(default)]
    pub on_eof: EofPolicy,
    /// How long shutdown waits for a worker blocked on input before detaching it.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_shutdown_grace_ms() -> u64 {
    500
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            ack: DEFAULT_ACK.to_string(),
            on_eof: EofPolicy::Forward,
            shutdown_grace_ms: default_shutdown_grace_ms(),
            engine: EngineConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tunefeed")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FeederConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<FeederConfig> {
    if !path.exists() {
        let default_cfg = FeederConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let cfg: FeederConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FeederConfig::default();
        assert_eq!(cfg.prompt, "enter DASH or HLS locator");
        assert_eq!(cfg.ack, "cli");
        assert_eq!(cfg.on_eof, EofPolicy::Forward);
        assert_eq!(cfg.shutdown_grace_ms, 500);
        assert_eq!(cfg.engine.backend, EngineBackend::Console);
        assert!(cfg.engine.library.is_none());
        assert_eq!(cfg.engine.init_symbol, "engine_init");
        assert_eq!(cfg.engine.tune_symbol, "engine_tune");
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FeederConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FeederConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.prompt, cfg.prompt);
        assert_eq!(parsed.banner, cfg.banner);
        assert_eq!(parsed.on_eof, cfg.on_eof);
        assert_eq!(parsed.engine.backend, cfg.engine.backend);
    }

    #[test]
    fn config_toml_minimal_uses_defaults() {
        let toml = r#"
            prompt = "url?"
            banner = "hi"
            ack = "ready"
        "#;
        let cfg: FeederConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.prompt, "url?");
        assert_eq!(cfg.ack, "ready");
        assert_eq!(cfg.on_eof, EofPolicy::Forward);
        assert_eq!(cfg.shutdown_grace_ms, 500);
        assert_eq!(cfg.engine.backend, EngineBackend::Console);
    }

    #[test]
    fn config_toml_native_engine() {
        let toml = r#"
            prompt = "enter DASH or HLS locator"
            banner = "b"
            ack = "cli"
            on_eof = "stop"
            shutdown_grace_ms = 50

            [engine]
            backend = "native"
            library = "/usr/lib/libplayer.so"
            tune_symbol = "player_tune"
        "#;
        let cfg: FeederConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.on_eof, EofPolicy::Stop);
        assert_eq!(cfg.shutdown_grace_ms, 50);
        assert_eq!(cfg.engine.backend, EngineBackend::Native);
        assert_eq!(
            cfg.engine.library.as_deref(),
            Some(Path::new("/usr/lib/libplayer.so"))
        );
        assert_eq!(cfg.engine.init_symbol, "engine_init");
        assert_eq!(cfg.engine.tune_symbol, "player_tune");
    }

    #[test]
    fn load_or_init_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.prompt, DEFAULT_PROMPT);

        let reloaded = load_or_init_at(&path).unwrap();
        assert_eq!(reloaded.banner, DEFAULT_BANNER);
    }

    #[test]
    fn load_or_init_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "prompt = [").unwrap();
        let err = load_or_init_at(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing"));
    }
}
