//! On-disk representation of a monitor record.
//!
//! ```json
//! {"owner_id": 1, "silent": true, "monitor_type": "show", "uuid": "...",
//!  "name": "the last of us", "season": 1, "episode": 10, "size_limit": 3}
//! ```

use serde::{Deserialize, Serialize};

use crate::monitor::{Monitor, MonitorKind, MonitorRecord, OneShotMonitor, OwnerId, SeriesMonitor};

use super::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RecordDocument {
    pub owner_id: OwnerId,
    #[serde(default = "default_silent")]
    pub silent: bool,
    pub monitor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub only_vips: bool,
}

fn default_silent() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<&MonitorRecord> for RecordDocument {
    fn from(record: &MonitorRecord) -> Self {
        let base = RecordDocument {
            owner_id: record.owner_id,
            silent: record.silent,
            monitor_type: record.monitor.kind().as_str().to_string(),
            uuid: Some(record.id.clone()),
            name: String::new(),
            season: None,
            episode: None,
            size_limit: None,
            only_vips: false,
        };

        match &record.monitor {
            Monitor::OneShot(m) => RecordDocument {
                name: m.query.clone(),
                ..base
            },
            Monitor::Series(m) => RecordDocument {
                name: m.name.clone(),
                season: Some(m.season),
                episode: Some(m.next_episode()),
                size_limit: m.size_limit_gb(),
                only_vips: m.vip_only,
                ..base
            },
        }
    }
}

impl RecordDocument {
    /// Convert to a record. The flag is true when a missing id was generated.
    pub fn into_record(self) -> Result<(MonitorRecord, bool), StoreError> {
        let kind = MonitorKind::from_wire(&self.monitor_type).ok_or_else(|| {
            StoreError::UnknownMonitorKind {
                kind: self.monitor_type.clone(),
            }
        })?;

        let (id, generated) = match self.uuid.filter(|id| !id.trim().is_empty()) {
            Some(id) => (id, false),
            None => (uuid::Uuid::new_v4().to_string(), true),
        };

        let monitor = match kind {
            MonitorKind::Movie => Monitor::OneShot(OneShotMonitor::new(self.name)),
            MonitorKind::Show => {
                let season = self.season.ok_or_else(|| StoreError::InvalidRecord {
                    id: id.clone(),
                    reason: "show monitor without season".to_string(),
                })?;
                let episode = self.episode.ok_or_else(|| StoreError::InvalidRecord {
                    id: id.clone(),
                    reason: "show monitor without episode".to_string(),
                })?;
                Monitor::Series(
                    SeriesMonitor::new(self.name, season, episode)
                        .with_size_limit_gb(self.size_limit)
                        .with_vip_only(self.only_vips),
                )
            }
        };

        let record = MonitorRecord {
            id,
            owner_id: self.owner_id,
            silent: self.silent,
            monitor,
        };
        Ok((record, generated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RecordDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_show_document() {
        let doc = parse(
            r#"{"owner_id": 1111111, "silent": false, "name": "the last of us",
                "monitor_type": "show", "season": 1, "episode": 10, "size_limit": 0,
                "uuid": "AA45815E-3E20-4132-BCE6-331F6C9C42D3"}"#,
        );
        let (record, generated) = doc.into_record().unwrap();
        assert!(!generated);
        assert_eq!(record.id, "AA45815E-3E20-4132-BCE6-331F6C9C42D3");
        assert_eq!(record.owner_id, 1111111);
        assert!(!record.silent);
        match record.monitor {
            Monitor::Series(s) => {
                assert_eq!(s.name, "the last of us");
                assert_eq!(s.season, 1);
                assert_eq!(s.next_episode(), 10);
                assert_eq!(s.size_limit_gb(), None);
                assert!(!s.vip_only);
            }
            Monitor::OneShot(_) => panic!("expected a series monitor"),
        }
    }

    #[test]
    fn test_movie_document_defaults() {
        let doc = parse(r#"{"owner_id": 5, "name": "the matrix", "monitor_type": "movie"}"#);
        let (record, generated) = doc.into_record().unwrap();
        assert!(generated);
        assert!(!record.id.is_empty());
        assert!(record.silent);
        assert_eq!(record.monitor, Monitor::OneShot(OneShotMonitor::new("the matrix")));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let doc = parse(r#"{"owner_id": 5, "name": "x", "monitor_type": "podcast", "uuid": "u1"}"#);
        let err = doc.into_record().unwrap_err();
        match err {
            StoreError::UnknownMonitorKind { kind } => assert_eq!(kind, "podcast"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_show_without_episode_is_invalid() {
        let doc = parse(r#"{"owner_id": 5, "name": "x", "monitor_type": "show", "season": 1, "uuid": "u2"}"#);
        let err = doc.into_record().unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { ref id, .. } if id == "u2"));
    }

    #[test]
    fn test_series_to_document() {
        let record = MonitorRecord::new(
            7,
            SeriesMonitor::new("chainsaw man", 2, 1)
                .with_size_limit_gb(Some(3.0))
                .with_vip_only(true),
        )
        .with_id("id-1")
        .with_silent(false);

        let json = serde_json::to_value(RecordDocument::from(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "owner_id": 7,
                "silent": false,
                "monitor_type": "show",
                "uuid": "id-1",
                "name": "chainsaw man",
                "season": 2,
                "episode": 1,
                "size_limit": 3.0,
                "only_vips": true
            })
        );
    }

    #[test]
    fn test_movie_to_document_omits_series_fields() {
        let record = MonitorRecord::new(7, OneShotMonitor::new("the matrix")).with_id("id-2");
        let json = serde_json::to_value(RecordDocument::from(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "owner_id": 7,
                "silent": true,
                "monitor_type": "movie",
                "uuid": "id-2",
                "name": "the matrix"
            })
        );
    }
}
