//! Service wiring and the periodic retention sweep.
//!
//! # Design
//! - Missing external tools degrade the service instead of aborting the
//!   boot: the endpoints that need them return errors, and the full health
//!   report names the missing component.
//! - The retention sweep runs on a fixed interval for the lifetime of the
//!   listener and is aborted on shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use riptide_api::{ApiServer, ApiState};
use riptide_config::AppConfig;
use riptide_extractor::{MediaExtractor, YtDlpExtractor};
use riptide_filestore::FileStore;
use riptide_telemetry::{LoggingConfig, Metrics, init_logging};
use riptide_transcoder::{AudioTranscoder, FfmpegTranscoder};

use crate::error::{AppError, AppResult};

const COMPONENT_EXTRACTOR: &str = "yt-dlp";
const COMPONENT_TRANSCODER: &str = "ffmpeg";

/// Dependencies required to bootstrap the riptide application.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    config: AppConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the
    /// binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let logging = LoggingConfig::default();
        let config =
            riptide_config::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            logging,
            config,
            telemetry,
        })
    }
}

/// Entry point for the riptide application boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or application startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        logging,
        config,
        telemetry,
    } = dependencies;
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!("riptide application bootstrap starting");

    let extractor = build_extractor(&config);
    let transcoder = build_transcoder(&config);
    let extractor_ready = extractor.probe().await;
    let transcoder_ready = transcoder.probe().await;

    let store = FileStore::new(config.download_dir.clone())
        .map_err(|err| AppError::file_store("file_store.new", err))?;

    let addr: SocketAddr = config.socket_addr();
    let state = Arc::new(ApiState::new(
        config.clone(),
        Arc::new(extractor) as Arc<dyn MediaExtractor>,
        Arc::new(transcoder) as Arc<dyn AudioTranscoder>,
        store.clone(),
        telemetry.clone(),
    ));
    if !extractor_ready {
        warn!("yt-dlp is unavailable; media endpoints will fail until it is installed");
        state.add_degraded_component(COMPONENT_EXTRACTOR);
    }
    if !transcoder_ready {
        warn!("ffmpeg is unavailable; audio extraction will fail until it is installed");
        state.add_degraded_component(COMPONENT_TRANSCODER);
    }

    let sweep_task = spawn_sweep_task(store, config.retention, config.sweep_interval, telemetry);

    info!(addr = %addr, "Launching API listener");
    let serve_result = ApiServer::new(state).serve(addr).await;

    if !sweep_task.is_finished() {
        sweep_task.abort();
    }

    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

fn build_extractor(config: &AppConfig) -> YtDlpExtractor {
    YtDlpExtractor::new(config.ytdlp_path.as_deref(), config.tool_timeout).unwrap_or_else(|err| {
        warn!(error = %err, "yt-dlp discovery failed");
        YtDlpExtractor::with_binary(PathBuf::from(COMPONENT_EXTRACTOR), config.tool_timeout)
    })
}

fn build_transcoder(config: &AppConfig) -> FfmpegTranscoder {
    FfmpegTranscoder::new(config.ffmpeg_path.as_deref(), config.tool_timeout).unwrap_or_else(
        |err| {
            warn!(error = %err, "ffmpeg discovery failed");
            FfmpegTranscoder::with_binary(PathBuf::from(COMPONENT_TRANSCODER), config.tool_timeout)
        },
    )
}

fn spawn_sweep_task(
    store: FileStore,
    retention: Duration,
    interval: Duration,
    telemetry: Metrics,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.sweep(retention) {
                Ok(removed) => telemetry.add_sweep_removed(removed),
                Err(err) => warn!(error = %err, "periodic sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn sweep_task_removes_expired_files() {
        let tmp = TempDir::new().expect("tempdir");
        let store = FileStore::new(tmp.path().join("downloads")).expect("store");
        let telemetry = Metrics::new().expect("metrics");

        let stale = store.root().join("stale.mp4");
        std::fs::write(&stale, b"stale").expect("fixture");
        tokio::time::sleep(Duration::from_millis(30)).await;

        let task = spawn_sweep_task(
            store,
            Duration::from_millis(10),
            Duration::from_millis(20),
            telemetry.clone(),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        assert!(!stale.exists());
        assert!(telemetry.snapshot().sweep_removed_total >= 1);
    }

    #[test]
    fn component_names_match_health_reporting() {
        assert_eq!(COMPONENT_EXTRACTOR, "yt-dlp");
        assert_eq!(COMPONENT_TRANSCODER, "ffmpeg");
    }
}
