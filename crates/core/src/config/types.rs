use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::download::DownloadCategory;
use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub searcher: SearcherConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// Download backend (found torrents are only logged when absent)
    #[serde(default)]
    pub download: Option<DownloadConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Monitor document location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/monitor_settings.json")
}

/// Search index configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearcherConfig {
    /// Search endpoint (e.g., "https://apibay.org/q.php")
    #[serde(default = "default_search_url")]
    pub url: String,
    /// Prefix joined with a result id to build its details link
    #[serde(default = "default_details_url_prefix")]
    pub details_url_prefix: String,
    /// Request timeout in seconds (default: 5)
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u32,
    /// Trackers announced in generated magnet links
    #[serde(default = "default_trackers")]
    pub trackers: Vec<String>,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            details_url_prefix: default_details_url_prefix(),
            timeout_secs: default_search_timeout(),
            trackers: default_trackers(),
        }
    }
}

fn default_search_url() -> String {
    "https://apibay.org/q.php".to_string()
}

fn default_details_url_prefix() -> String {
    "https://thepiratebay.org/description.php?id=".to_string()
}

fn default_search_timeout() -> u32 {
    5
}

fn default_trackers() -> Vec<String> {
    [
        "udp://tracker.coppersurfer.tk:6969/announce",
        "udp://tracker.openbittorrent.com:6969/announce",
        "udp://tracker.opentrackr.org:1337",
        "http://p4p.arenabg.com:1337/announce",
        "udp://tracker.torrent.eu.org:451/announce",
        "udp://tracker.tiny-vps.com:6969/announce",
        "udp://open.stealth.si:80/announce",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

/// Transmission RPC configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// RPC endpoint (e.g., "http://localhost:9091/transmission/rpc")
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u32,
    /// Download directory per category
    #[serde(default)]
    pub paths: DownloadPaths,
}

fn default_download_timeout() -> u32 {
    30
}

/// Download directories. A missing entry leaves the choice to the backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadPaths {
    #[serde(default)]
    pub movie: Option<PathBuf>,
    #[serde(default)]
    pub show: Option<PathBuf>,
    #[serde(default)]
    pub video: Option<PathBuf>,
    #[serde(default)]
    pub other: Option<PathBuf>,
}

impl DownloadPaths {
    pub fn for_category(&self, category: DownloadCategory) -> Option<&PathBuf> {
        match category {
            DownloadCategory::Movie => self.movie.as_ref(),
            DownloadCategory::Show => self.show.as_ref(),
            DownloadCategory::Video => self.video.as_ref(),
            DownloadCategory::Other => self.other.as_ref(),
        }
    }
}

/// Status server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8090
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
