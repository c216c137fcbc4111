//! Environment parsing for the configuration model.
//!
//! # Design
//! - `from_env` is a thin shim over `from_lookup` so tests can inject a
//!   plain closure instead of mutating process environment.
//! - Unset variables fall back to defaults; set-but-invalid variables are
//!   hard errors rather than silent fallbacks.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a set variable fails to parse or
/// validates to a nonsensical value.
pub fn from_env() -> ConfigResult<AppConfig> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration through the supplied variable lookup.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a present variable fails to parse or
/// validates to a nonsensical value.
pub fn from_lookup<F>(lookup: F) -> ConfigResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::default();

    if let Some(raw) = lookup("PORT") {
        config.port = raw
            .parse()
            .map_err(|_| ConfigError::invalid_field("PORT", &raw, "not a valid port number"))?;
    }
    if let Some(raw) = lookup("RIPTIDE_BIND_ADDR") {
        config.bind_addr = raw
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr { value: raw })?;
    }
    if let Some(raw) = lookup("RIPTIDE_DOWNLOAD_DIR") {
        if raw.trim().is_empty() {
            return Err(ConfigError::invalid_field(
                "RIPTIDE_DOWNLOAD_DIR",
                raw,
                "must not be empty",
            ));
        }
        config.download_dir = PathBuf::from(raw);
    }
    if let Some(secs) = parse_secs(&lookup, "RIPTIDE_RETENTION_SECS")? {
        config.retention = secs;
    }
    if let Some(secs) = parse_secs(&lookup, "RIPTIDE_SWEEP_INTERVAL_SECS")? {
        config.sweep_interval = secs;
    }
    if let Some(secs) = parse_secs(&lookup, "RIPTIDE_TOOL_TIMEOUT_SECS")? {
        config.tool_timeout = secs;
    }
    if let Some(raw) = lookup("RIPTIDE_YTDLP_PATH") {
        config.ytdlp_path = Some(PathBuf::from(raw));
    }
    if let Some(raw) = lookup("RIPTIDE_FFMPEG_PATH") {
        config.ffmpeg_path = Some(PathBuf::from(raw));
    }

    Ok(config)
}

fn parse_secs<F>(lookup: &F, field: &'static str) -> ConfigResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(field) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .parse()
        .map_err(|_| ConfigError::invalid_field(field, &raw, "not a number of seconds"))?;
    if secs == 0 {
        return Err(ConfigError::invalid_field(field, raw, "must be positive"));
    }
    Ok(Some(Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn empty_environment_yields_defaults() -> ConfigResult<()> {
        let config = from_lookup(|_| None)?;
        assert_eq!(config.port, 5000);
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert!(config.ytdlp_path.is_none());
        Ok(())
    }

    #[test]
    fn overrides_are_applied() -> ConfigResult<()> {
        let pairs = [
            ("PORT", "8080"),
            ("RIPTIDE_BIND_ADDR", "127.0.0.1"),
            ("RIPTIDE_RETENTION_SECS", "120"),
            ("RIPTIDE_YTDLP_PATH", "/opt/bin/yt-dlp"),
        ];
        let config = from_lookup(lookup_from(&pairs))?;
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.retention, Duration::from_secs(120));
        assert_eq!(config.ytdlp_path, Some(PathBuf::from("/opt/bin/yt-dlp")));
        Ok(())
    }

    #[test]
    fn invalid_port_is_rejected() {
        let pairs = [("PORT", "not-a-port")];
        let err = from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field: "PORT", .. }));
    }

    #[test]
    fn zero_retention_is_rejected() {
        let pairs = [("RIPTIDE_RETENTION_SECS", "0")];
        let err = from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }
}
