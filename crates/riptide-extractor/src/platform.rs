//! Supported platform table and URL-based detection.

use serde::{Deserialize, Serialize};
use url::Url;

/// Platforms the service accepts URLs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// youtube.com / youtu.be
    Youtube,
    /// instagram.com
    Instagram,
    /// tiktok.com
    Tiktok,
    /// facebook.com / fb.watch
    Facebook,
    /// twitter.com / x.com
    Twitter,
}

const DOMAIN_TABLE: &[(Platform, &[&str])] = &[
    (Platform::Youtube, &["youtube.com", "youtu.be"]),
    (Platform::Instagram, &["instagram.com"]),
    (Platform::Tiktok, &["tiktok.com"]),
    (Platform::Facebook, &["facebook.com", "fb.watch"]),
    (Platform::Twitter, &["twitter.com", "x.com"]),
];

impl Platform {
    /// Detect the platform for an already-parsed URL by host suffix.
    #[must_use]
    pub fn detect(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        DOMAIN_TABLE
            .iter()
            .find(|(_, domains)| {
                domains.iter().any(|domain| {
                    host == *domain || host.ends_with(&format!(".{domain}"))
                })
            })
            .map(|(platform, _)| *platform)
    }

    /// Stable lowercase name used in API payloads and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(url: &str) -> Url {
        Url::parse(url).expect("test url")
    }

    #[test]
    fn detects_known_hosts_and_subdomains() {
        assert_eq!(
            Platform::detect(&parsed("https://www.youtube.com/watch?v=x")),
            Some(Platform::Youtube)
        );
        assert_eq!(
            Platform::detect(&parsed("https://youtu.be/x")),
            Some(Platform::Youtube)
        );
        assert_eq!(
            Platform::detect(&parsed("https://m.tiktok.com/@user/video/1")),
            Some(Platform::Tiktok)
        );
        assert_eq!(
            Platform::detect(&parsed("https://x.com/user/status/1")),
            Some(Platform::Twitter)
        );
    }

    #[test]
    fn rejects_unknown_and_lookalike_hosts() {
        assert_eq!(Platform::detect(&parsed("https://example.com/v/1")), None);
        // Suffix matching must not accept hosts merely containing a domain.
        assert_eq!(
            Platform::detect(&parsed("https://notyoutube.com/watch")),
            None
        );
        assert_eq!(
            Platform::detect(&parsed("https://youtube.com.evil.io/watch")),
            None
        );
    }

    #[test]
    fn serialises_lowercase() {
        let json = serde_json::to_string(&Platform::Facebook).expect("serialise");
        assert_eq!(json, "\"facebook\"");
    }
}
