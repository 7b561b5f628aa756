//! Transmission RPC download client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::DownloadConfig;

use super::{AddedDownload, DownloadCategory, DownloadClient, DownloadError};

/// Header carrying Transmission's CSRF token.
const SESSION_HEADER: &str = "X-Transmission-Session-Id";

/// Transmission client implementation.
pub struct TransmissionClient {
    client: Client,
    config: DownloadConfig,
    /// Session id handed out by the daemon (refreshed on 409).
    session: Arc<RwLock<Option<String>>>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: Value,
}

impl TransmissionClient {
    /// Create a new Transmission client.
    pub fn new(config: DownloadConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DownloadError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Send one RPC call, once more if the daemon hands out a new session id.
    async fn call(&self, method: &str, arguments: Value) -> Result<Value, DownloadError> {
        let body = json!({ "method": method, "arguments": arguments });

        let response = self.send(&body).await?;
        let response = if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    DownloadError::ApiError("409 without a session id".to_string())
                })?;
            debug!("Transmission session id refreshed");
            *self.session.write().await = Some(session_id);
            self.send(&body).await?
        } else {
            response
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DownloadError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(DownloadError::ApiError(format!("HTTP {}", status)));
        }

        let rpc: RpcResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::ApiError(format!("Failed to parse response: {}", e)))?;

        if rpc.result != "success" {
            return Err(DownloadError::Rejected(rpc.result));
        }
        Ok(rpc.arguments)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, DownloadError> {
        let mut request = self.client.post(&self.config.url).json(body);
        if let Some(session_id) = self.session.read().await.as_deref() {
            request = request.header(SESSION_HEADER, session_id);
        }
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::Timeout
            } else if e.is_connect() {
                DownloadError::ConnectionFailed(e.to_string())
            } else {
                DownloadError::ApiError(e.to_string())
            }
        })
    }
}

/// Pull the torrent name out of a `torrent-add` reply.
///
/// Transmission answers `torrent-duplicate` instead of `torrent-added` when
/// the torrent is already queued; both count as accepted.
fn added_name(arguments: &Value) -> Option<String> {
    ["torrent-added", "torrent-duplicate"]
        .iter()
        .find_map(|key| arguments.get(*key))
        .and_then(|torrent| torrent.get("name"))
        .and_then(Value::as_str)
        .map(|name| name.trim().to_string())
}

#[async_trait]
impl DownloadClient for TransmissionClient {
    fn name(&self) -> &str {
        "transmission"
    }

    async fn add_magnet(
        &self,
        magnet: &str,
        category: DownloadCategory,
    ) -> Result<AddedDownload, DownloadError> {
        let mut arguments = json!({ "filename": magnet });
        if let Some(dir) = self.config.paths.for_category(category) {
            arguments["download-dir"] = json!(dir.to_string_lossy());
        }

        let reply = self.call("torrent-add", arguments).await?;
        match added_name(&reply) {
            Some(name) => {
                debug!(name = %name, category = category.as_str(), "Torrent added");
                Ok(AddedDownload { name })
            }
            None => {
                warn!(reply = %reply, "Transmission accepted torrent without naming it");
                Err(DownloadError::ApiError(
                    "torrent-add reply has no torrent".to_string(),
                ))
            }
        }
    }
}
