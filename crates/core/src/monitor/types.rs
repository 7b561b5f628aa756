//! Monitor definitions and the persisted record wrapping them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::searcher::TrustStatus;

/// Identifier of the user a monitor belongs to.
pub type OwnerId = i64;

/// Kind discriminator, as written to the monitor document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    /// One-shot query, removed after its first result.
    Movie,
    /// Episode-by-episode series monitor.
    Show,
}

impl MonitorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorKind::Movie => "movie",
            MonitorKind::Show => "show",
        }
    }

    /// Parse a document discriminator. Unknown values are rejected by the caller.
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "movie" => Some(MonitorKind::Movie),
            "show" => Some(MonitorKind::Show),
            _ => None,
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free-text query looked up until it yields one result.
#[derive(Debug, Clone, PartialEq)]
pub struct OneShotMonitor {
    pub query: String,
}

impl OneShotMonitor {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// A series followed one episode at a time.
///
/// `next_episode` only moves forward, by one per successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMonitor {
    pub name: String,
    pub season: u32,
    next_episode: u32,
    size_limit_gb: Option<f64>,
    pub vip_only: bool,
}

impl SeriesMonitor {
    /// Create a series monitor that will look for `episode` next.
    pub fn new(name: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            name: name.into(),
            season,
            next_episode: episode,
            size_limit_gb: None,
            vip_only: false,
        }
    }

    /// Set a size ceiling. Zero or negative values mean no ceiling.
    pub fn with_size_limit_gb(mut self, limit: Option<f64>) -> Self {
        self.size_limit_gb = limit.filter(|l| *l > 0.0);
        self
    }

    /// Only accept VIP uploads.
    pub fn with_vip_only(mut self, vip_only: bool) -> Self {
        self.vip_only = vip_only;
        self
    }

    pub fn next_episode(&self) -> u32 {
        self.next_episode
    }

    pub fn size_limit_gb(&self) -> Option<f64> {
        self.size_limit_gb
    }

    /// Trust statuses a candidate must carry to be accepted.
    pub fn accepted_statuses(&self) -> &'static [TrustStatus] {
        if self.vip_only {
            &[TrustStatus::Vip]
        } else {
            &[TrustStatus::Vip, TrustStatus::Trusted]
        }
    }

    /// Query for the episode this monitor is waiting for.
    pub fn episode_query(&self) -> String {
        format!(
            "{} s{:02}e{:02}",
            self.name, self.season, self.next_episode
        )
    }

    /// Move to the following episode. Returns false, leaving the cursor
    /// where it is, when the episode number cannot grow any further.
    pub(super) fn advance(&mut self) -> bool {
        match self.next_episode.checked_add(1) {
            Some(next) => {
                self.next_episode = next;
                true
            }
            None => false,
        }
    }
}

/// A watch definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Monitor {
    OneShot(OneShotMonitor),
    Series(SeriesMonitor),
}

impl Monitor {
    pub fn kind(&self) -> MonitorKind {
        match self {
            Monitor::OneShot(_) => MonitorKind::Movie,
            Monitor::Series(_) => MonitorKind::Show,
        }
    }

    /// The query the next lookup will run.
    pub fn query(&self) -> String {
        match self {
            Monitor::OneShot(m) => m.query.clone(),
            Monitor::Series(m) => m.episode_query(),
        }
    }

    pub fn is_series(&self) -> bool {
        matches!(self, Monitor::Series(_))
    }
}

impl From<OneShotMonitor> for Monitor {
    fn from(monitor: OneShotMonitor) -> Self {
        Monitor::OneShot(monitor)
    }
}

impl From<SeriesMonitor> for Monitor {
    fn from(monitor: SeriesMonitor) -> Self {
        Monitor::Series(monitor)
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Monitor::OneShot(m) => write!(f, "(M) / {}", m.query),
            Monitor::Series(m) => {
                write!(f, "(S) / {}", m.episode_query())?;
                if let Some(limit) = m.size_limit_gb {
                    write!(f, " / <={}Gb", limit)?;
                }
                Ok(())
            }
        }
    }
}

/// The persisted unit: a monitor plus who owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRecord {
    /// Stable opaque id, assigned at creation.
    pub id: String,
    pub owner_id: OwnerId,
    /// Suppress found notifications for this monitor.
    pub silent: bool,
    pub monitor: Monitor,
}

impl MonitorRecord {
    /// Create a record with a fresh id. Records are silent by default.
    pub fn new(owner_id: OwnerId, monitor: impl Into<Monitor>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            silent: true,
            monitor: monitor.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}
