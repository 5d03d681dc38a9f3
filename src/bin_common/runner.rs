//! Headless binary runner
//!
//! [`BinaryRunner::execute`] calls `start`, then `step` until it returns
//! `false` or shutdown is requested, logging `status` on every heartbeat,
//! and finally `stop`. `stop` runs even when `step` fails.

use std::time::Duration;

use anyhow::Result;
use coincap::ShutdownManager;
use tracing::{info, warn};

/// How often an idle loop re-checks the shutdown flag
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for running a binary application
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    /// Heartbeat interval in seconds
    pub heartbeat_interval_secs: u64,
}

impl RunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            heartbeat_interval_secs: 60,
        }
    }

    pub fn with_heartbeat(mut self, secs: u64) -> Self {
        self.heartbeat_interval_secs = secs.max(1);
        self
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

/// A long-running headless binary
pub trait BinaryRunner {
    fn config(&self) -> &RunConfig;

    /// Open connections and subscriptions
    async fn start(&mut self) -> Result<()>;

    /// Wait for and handle the next batch of work. `Ok(false)` ends the run.
    ///
    /// Must be cancel safe: the heartbeat and the shutdown poll may drop it
    /// while it waits.
    async fn step(&mut self) -> Result<bool>;

    /// One status line logged on every heartbeat
    fn status(&self) -> String;

    /// Release resources; the returned summary is logged on exit
    async fn stop(&mut self) -> Result<Option<String>>;

    async fn execute(&mut self, shutdown: &ShutdownManager) -> Result<()> {
        let config = self.config().clone();
        info!(
            "[{}] Starting, heartbeat every {}s, press Ctrl+C to stop",
            config.name, config.heartbeat_interval_secs
        );

        self.start().await?;

        let mut heartbeat = tokio::time::interval(config.heartbeat_interval());
        // First tick completes immediately
        heartbeat.tick().await;

        let mut outcome = Ok(());
        while shutdown.is_running() {
            tokio::select! {
                step = self.step() => match step {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        outcome = Err(e);
                        break;
                    }
                },
                _ = heartbeat.tick() => info!("[{}] {}", config.name, self.status()),
                _ = tokio::time::sleep(SHUTDOWN_POLL_INTERVAL) => {}
            }
        }

        match self.stop().await {
            Ok(Some(summary)) => info!("[{}] {}", config.name, summary),
            Ok(None) => {}
            Err(e) => {
                warn!("[{}] Cleanup failed: {}", config.name, e);
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        info!("[{}] Stopped", config.name);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Counts calls and ends after `steps` iterations, or fails on `fail_at`
    struct Countdown {
        config: RunConfig,
        steps: usize,
        fail_at: Option<usize>,
        started: bool,
        stepped: usize,
        stopped: bool,
    }

    impl Countdown {
        fn new(steps: usize) -> Self {
            Self {
                config: RunConfig::new("countdown"),
                steps,
                fail_at: None,
                started: false,
                stepped: 0,
                stopped: false,
            }
        }
    }

    impl BinaryRunner for Countdown {
        fn config(&self) -> &RunConfig {
            &self.config
        }

        async fn start(&mut self) -> Result<()> {
            self.started = true;
            Ok(())
        }

        async fn step(&mut self) -> Result<bool> {
            self.stepped += 1;
            if self.fail_at == Some(self.stepped) {
                bail!("step {} failed", self.stepped);
            }
            Ok(self.stepped < self.steps)
        }

        fn status(&self) -> String {
            format!("stepped={}", self.stepped)
        }

        async fn stop(&mut self) -> Result<Option<String>> {
            self.stopped = true;
            Ok(Some(self.status()))
        }
    }

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new("test-binary").with_heartbeat(120);

        assert_eq!(config.name, "test-binary");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(120));
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::new("default");
        assert_eq!(config.heartbeat_interval_secs, 60);
        assert_eq!(RunConfig::new("x").with_heartbeat(0).heartbeat_interval_secs, 1);
    }

    #[tokio::test]
    async fn test_execute_steps_until_done() {
        let mut runner = Countdown::new(3);
        runner.execute(&ShutdownManager::new()).await.unwrap();

        assert!(runner.started);
        assert_eq!(runner.stepped, 3);
        assert!(runner.stopped);
    }

    #[tokio::test]
    async fn test_execute_stops_after_failed_step() {
        let mut runner = Countdown::new(10);
        runner.fail_at = Some(2);

        let err = runner.execute(&ShutdownManager::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "step 2 failed");
        assert_eq!(runner.stepped, 2);
        assert!(runner.stopped);
    }

    #[tokio::test]
    async fn test_execute_skips_steps_once_shutdown_requested() {
        let shutdown = ShutdownManager::new();
        shutdown.trigger();

        let mut runner = Countdown::new(10);
        runner.execute(&shutdown).await.unwrap();

        assert!(runner.started);
        assert_eq!(runner.stepped, 0);
        assert!(runner.stopped);
    }
}
