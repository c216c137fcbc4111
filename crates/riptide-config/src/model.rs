//! Typed configuration model and defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Default listening port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;
/// Default scratch directory for downloaded files.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
/// Default retention window for swept files.
pub const DEFAULT_RETENTION_SECS: u64 = 3600;
/// Default cadence of the periodic retention sweep.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
/// Default timeout applied to external tool invocations.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 600;

/// Application configuration resolved from the environment.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Listening port for the HTTP server.
    pub port: u16,
    /// Bind address for the HTTP server.
    pub bind_addr: IpAddr,
    /// Root scratch directory where downloaded files are stored.
    pub download_dir: PathBuf,
    /// Age beyond which swept files are removed.
    pub retention: Duration,
    /// Interval between periodic retention sweeps.
    pub sweep_interval: Duration,
    /// Timeout applied to each yt-dlp and ffmpeg invocation.
    pub tool_timeout: Duration,
    /// Explicit path to the yt-dlp binary, overriding discovery.
    pub ytdlp_path: Option<PathBuf>,
    /// Explicit path to the ffmpeg binary, overriding discovery.
    pub ffmpeg_path: Option<PathBuf>,
}

impl AppConfig {
    /// Socket address the HTTP server should bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            ytdlp_path: None,
            ffmpeg_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_all_interfaces_on_5000() {
        let config = AppConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.retention, Duration::from_secs(3600));
    }
}
