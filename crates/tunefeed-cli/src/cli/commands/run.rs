//! `tunefeed run` – the interactive locator session.

use anyhow::Result;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tunefeed_core::config::{self, EngineBackend, EofPolicy, FeederConfig};
use tunefeed_core::engine;
use tunefeed_core::session::{Session, SessionOptions};

/// Command-line values that take precedence over config.toml.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub engine_lib: Option<PathBuf>,
    pub stop_on_eof: bool,
    pub prompt: Option<String>,
}

impl RunOverrides {
    pub fn apply(self, cfg: &mut FeederConfig) {
        if let Some(path) = self.engine_lib {
            cfg.engine.backend = EngineBackend::Native;
            cfg.engine.library = Some(path);
        }
        if self.stop_on_eof {
            cfg.on_eof = EofPolicy::Stop;
        }
        if let Some(prompt) = self.prompt {
            cfg.prompt = prompt;
        }
    }
}

pub async fn run_session(overrides: RunOverrides) -> Result<()> {
    let mut cfg = config::load_or_init()?;
    overrides.apply(&mut cfg);
    tracing::debug!("effective config: {:?}", cfg);

    let engine = engine::build_engine(&cfg.engine)?;
    let session = Session::new(
        engine,
        BufReader::new(io::stdin()),
        io::stdout(),
        SessionOptions::from(&cfg),
    );

    let report = session
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    match report.feeder {
        Some(feeder) => tracing::info!(
            lines = feeder.lines,
            eof_reads = feeder.eof_reads,
            tune_failures = feeder.tune_failures,
            "run completed"
        ),
        None => tracing::info!(detached = report.detached, "run interrupted"),
    }
    Ok(())
}
