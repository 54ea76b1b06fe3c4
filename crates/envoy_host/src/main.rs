//! Envoy console host
//!
//! Runs the envoy lifecycle manager without a game server: the countdown is
//! driven by a wall-clock ticker and every other host event is read from
//! stdin as one JSON object per line, e.g.
//!
//! ```text
//! {"event":"chunk_load","world":"world","chunk":{"x":6,"z":6}}
//! {"event":"tick"}
//! ```

mod cli;
mod config;
mod console;
mod logging;
mod signals;

use anyhow::{anyhow, Result};
use envoy_system::{EnvoyLifecycleManager, JsonEnvoyStorage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use cli::CliArgs;
use config::AppConfig;
use console::ConsoleHost;
use logging::setup_logging;
use signals::wait_for_shutdown;

/// Main application struct
pub struct Application {
    config: AppConfig,
    config_path: PathBuf,
    console: Arc<ConsoleHost>,
    manager: EnvoyLifecycleManager,
}

impl Application {
    /// Loads and validates configuration, applies CLI overrides, sets up
    /// logging and builds the lifecycle manager.
    pub async fn new(args: CliArgs) -> Result<Self> {
        // Load configuration first (before logging setup)
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(data_dir) = args.data_dir {
            config.host.data_dir = data_dir.to_string_lossy().to_string();
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Some(tick_ms) = args.tick_ms {
            config.host.tick_interval_ms = tick_ms;
        }

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        setup_logging(&config.logging)?;

        let console = ConsoleHost::new(config.rewards.pool.clone());
        let storage = JsonEnvoyStorage::in_dir(config.host.data_path());
        let manager = EnvoyLifecycleManager::new(
            config.envoys.clone(),
            console.services(),
            Arc::new(storage),
        )?;

        info!("🚀 Envoy host v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "📂 Config: {} | Data: {}",
            args.config_path.display(),
            config.host.data_dir
        );

        Ok(Self {
            config,
            config_path: args.config_path,
            console,
            manager,
        })
    }

    /// Runs until a shutdown signal arrives, or until stdin closes when no
    /// ticker is configured.
    pub async fn run(self) -> Result<()> {
        let restored = self.manager.enable().await?;
        info!("📦 Restored {} envoys", restored);

        let tick_ms = self.config.host.tick_interval_ms;
        let ticking = tick_ms > 0;
        if ticking {
            info!("⏱️ Countdown tick every {}ms", tick_ms);
        } else {
            info!("⏱️ Ticker disabled, countdown advances only on tick events");
        }

        let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately.
        ticker.tick().await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        let shutdown = wait_for_shutdown();
        tokio::pin!(shutdown);
        let reason;

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    reason = match result {
                        Ok(signal) => format!("{signal} received"),
                        Err(e) => {
                            error!("❌ Signal handling failed: {}", e);
                            "signal handling failed".to_string()
                        }
                    };
                    info!("📡 {}", reason);
                    break;
                }
                _ = ticker.tick(), if ticking => {
                    let report = self.manager.tick();
                    if report.despawned > 0 {
                        info!("⌛ {} envoys despawned", report.despawned);
                    }
                }
                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            if let Err(e) = self.console.handle_line(&self.manager, &line).await {
                                warn!("⚠️ {:#}", e);
                            }
                        }
                        Ok(None) => {
                            info!("📭 Input closed");
                            stdin_open = false;
                        }
                        Err(e) => {
                            error!("❌ Failed to read input: {}", e);
                            stdin_open = false;
                        }
                    }
                    if !stdin_open && !ticking {
                        reason = "input closed".to_string();
                        break;
                    }
                }
            }
        }

        self.shutdown(&reason).await
    }

    /// Final flush; `reason` names what ended the run.
    async fn shutdown(self, reason: &str) -> Result<()> {
        info!("🧹 {}, saving envoys to {}", reason, self.config.host.data_dir);
        let saved = self.manager.disable().await?;
        info!(
            "✅ Envoy host stopped ({} envoys saved, config {})",
            saved,
            self.config_path.display()
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let app = Application::new(args).await?;
    if let Err(e) = app.run().await {
        error!("❌ Envoy host error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
