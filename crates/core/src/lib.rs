pub mod config;
pub mod dispatch;
pub mod download;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod orchestrator;
pub mod searcher;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DownloadConfig,
    LoggingConfig, SearcherConfig, ServerConfig, StoreConfig,
};
pub use dispatch::{DispatchSummary, ResultDispatcher};
pub use download::{
    AddedDownload, DownloadCategory, DownloadClient, DownloadError, TransmissionClient,
};
pub use monitor::{Monitor, MonitorKind, MonitorRecord, OneShotMonitor, OwnerId, SeriesMonitor};
pub use notify::{LogNotifier, Notifier};
pub use orchestrator::{
    JobResult, MonitorOrchestrator, MonitorScheduler, OrchestratorConfig, OrchestratorError,
};
pub use searcher::{ApibaySearcher, SearchError, SearchProvider, TorrentCandidate, TrustStatus};
pub use store::{JsonMonitorStore, MonitorStore, StoreChange, StoreError};
