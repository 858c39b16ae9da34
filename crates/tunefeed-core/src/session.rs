//! The launching context: starts the feeder worker, initializes the engine,
//! and owns the join point on shutdown.

use std::future::Future;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::FeederConfig;
use crate::control::StopToken;
use crate::engine::{EngineError, PlaybackEngine};
use crate::feeder::{self, FeederOptions, FeederReport};

/// Settings for one interactive session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub banner: String,
    pub feeder: FeederOptions,
    /// How long shutdown waits for a worker blocked on input.
    pub shutdown_grace: Duration,
}

impl From<&FeederConfig> for SessionOptions {
    fn from(cfg: &FeederConfig) -> Self {
        Self {
            banner: cfg.banner.clone(),
            feeder: FeederOptions::from(cfg),
            shutdown_grace: Duration::from_millis(cfg.shutdown_grace_ms),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&FeederConfig::default())
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Worker counters; `None` when the worker was detached.
    pub feeder: Option<FeederReport>,
    /// The worker was still blocked on input when the grace period ran out.
    pub detached: bool,
}

pub struct Session<R, W> {
    engine: Arc<dyn PlaybackEngine>,
    input: R,
    output: W,
    options: SessionOptions,
    stop: StopToken,
}

impl<R, W> Session<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(engine: Arc<dyn PlaybackEngine>, input: R, output: W, options: SessionOptions) -> Self {
        Self {
            engine,
            input,
            output,
            options,
            stop: StopToken::new(),
        }
    }

    /// Token that stops the worker loop; also set by `run` on shutdown.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Runs until the worker ends on its own or `shutdown` resolves.
    ///
    /// Engine init runs on the blocking pool concurrently with the worker's
    /// start-up; the worker makes no tune call before init succeeded.
    pub async fn run<F>(self, shutdown: F) -> Result<SessionReport>
    where
        F: Future<Output = ()>,
    {
        let Session {
            engine,
            input,
            mut output,
            options,
            stop,
        } = self;

        writeln!(output, "{}", options.banner)
            .and_then(|_| output.flush())
            .context("writing banner")?;

        let (signal, gate) = feeder::init_gate();
        let mut worker = feeder::spawn_feeder(
            Arc::clone(&engine),
            input,
            output,
            options.feeder.clone(),
            stop.clone(),
            gate,
        )?;
        tracing::debug!(engine = engine.name(), "feeder worker spawned");

        let init_engine = Arc::clone(&engine);
        let init = tokio::task::spawn_blocking(move || init_engine.init());
        let (init, ack) = tokio::join!(init, worker.acknowledged());

        match ack {
            Some(ack) => tracing::info!(ack = %ack, "feeder worker acknowledged"),
            None => tracing::warn!("feeder worker ended before acknowledging"),
        }

        let init = match init {
            Ok(outcome) => outcome,
            Err(join_err) => {
                signal.fail(Arc::new(EngineError::InitFailed {
                    reason: "engine init task panicked".to_string(),
                }));
                stop.stop();
                return Err(join_err).context("engine init task");
            }
        };
        if let Err(e) = init {
            tracing::error!(engine = engine.name(), "engine init failed: {}", e);
            let e = Arc::new(e);
            signal.fail(Arc::clone(&e));
            stop.stop();
            return Err(e).with_context(|| format!("initializing {} engine", engine.name()));
        }
        tracing::info!(engine = engine.name(), "engine initialized");
        signal.open();

        tokio::pin!(shutdown);
        let shutdown_requested = tokio::select! {
            _ = worker.finished() => false,
            _ = &mut shutdown => true,
        };
        let finished = if shutdown_requested {
            tracing::info!("shutdown requested; stopping feeder worker");
            stop.stop();
            tokio::time::timeout(options.shutdown_grace, worker.finished())
                .await
                .is_ok()
        } else {
            true
        };

        if !finished {
            tracing::warn!(
                grace_ms = options.shutdown_grace.as_millis() as u64,
                "feeder worker still blocked on input; detaching"
            );
            return Ok(SessionReport {
                feeder: None,
                detached: true,
            });
        }

        let report = tokio::task::spawn_blocking(move || worker.join())
            .await
            .context("joining feeder worker")??;
        tracing::info!(
            lines = report.lines,
            tunes = report.tunes,
            tune_failures = report.tune_failures,
            "session finished"
        );
        Ok(SessionReport {
            feeder: Some(report),
            detached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EofPolicy;
    use crate::engine::{EngineCall, RecordingEngine};
    use crate::test_util::SharedBuf;
    use std::io::Cursor;

    fn stop_on_eof() -> SessionOptions {
        let mut options = SessionOptions::default();
        options.feeder.on_eof = EofPolicy::Stop;
        options
    }

    #[tokio::test]
    async fn init_once_then_tunes_in_order() {
        let engine = Arc::new(RecordingEngine::new());
        let out = SharedBuf::default();
        let session = Session::new(
            Arc::clone(&engine) as Arc<dyn PlaybackEngine>,
            Cursor::new(b"http://a/manifest.mpd\nhttp://b/playlist.m3u8\n".to_vec()),
            out.clone(),
            stop_on_eof(),
        );
        let report = session.run(std::future::pending()).await.unwrap();

        assert!(!report.detached);
        assert_eq!(report.feeder.unwrap().tunes, 3);
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Init,
                EngineCall::Tune(Some("http://a/manifest.mpd".to_string())),
                EngineCall::Tune(Some("http://b/playlist.m3u8".to_string())),
                EngineCall::Tune(None),
            ]
        );
        let text = out.text();
        assert!(text.starts_with("tunefeed: interactive locator feeder\ncli\n"));
        assert_eq!(text.matches("enter DASH or HLS locator").count(), 3);
    }

    #[tokio::test]
    async fn init_failure_is_returned_and_nothing_is_tuned() {
        let engine = Arc::new(RecordingEngine::failing_init());
        let session = Session::new(
            Arc::clone(&engine) as Arc<dyn PlaybackEngine>,
            Cursor::new(b"http://a/manifest.mpd\n".to_vec()),
            SharedBuf::default(),
            stop_on_eof(),
        );
        let err = session.run(std::future::pending()).await.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "initializing recording engine: engine initialization failed: \
             recording engine configured to fail init"
        );
        assert!(err.downcast_ref::<Arc<EngineError>>().is_some());
        assert_eq!(engine.init_count(), 1);
        assert!(engine.tunes().is_empty());
    }
}
