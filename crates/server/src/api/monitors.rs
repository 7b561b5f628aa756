//! Monitor management API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use magnetwatch_core::{
    DispatchSummary, JobResult, Monitor, MonitorKind, MonitorRecord, MonitorStore,
    OneShotMonitor, OwnerId, SeriesMonitor, StoreError, TorrentCandidate,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters selecting one owner's monitors
#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    pub owner_id: Option<OwnerId>,
}

/// Request body for creating a monitor
#[derive(Debug, Deserialize)]
pub struct CreateMonitorBody {
    pub owner_id: OwnerId,
    /// Suppress found notifications. Defaults to true.
    pub silent: Option<bool>,
    #[serde(flatten)]
    pub monitor: MonitorBody,
}

/// Kind-specific part of a create request, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorBody {
    Movie {
        query: String,
    },
    Show {
        name: String,
        season: u32,
        episode: u32,
        /// Size ceiling in GB; zero or negative means none
        size_limit: Option<f64>,
        #[serde(default)]
        only_vips: bool,
    },
}

impl MonitorBody {
    fn into_monitor(self) -> Result<Monitor, String> {
        match self {
            MonitorBody::Movie { query } => {
                let query = query.trim();
                if query.is_empty() {
                    return Err("query must not be empty".to_string());
                }
                Ok(OneShotMonitor::new(query).into())
            }
            MonitorBody::Show {
                name,
                season,
                episode,
                size_limit,
                only_vips,
            } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err("name must not be empty".to_string());
                }
                Ok(SeriesMonitor::new(name, season, episode)
                    .with_size_limit_gb(size_limit)
                    .with_vip_only(only_vips)
                    .into())
            }
        }
    }
}

/// Response for monitor operations
#[derive(Debug, Serialize)]
pub struct MonitorResponse {
    pub id: String,
    pub owner_id: OwnerId,
    pub silent: bool,
    pub kind: MonitorKind,
    /// What the next lookup will search for
    pub query: String,
    pub description: String,
}

impl From<MonitorRecord> for MonitorResponse {
    fn from(record: MonitorRecord) -> Self {
        Self {
            query: record.monitor.query(),
            description: record.monitor.to_string(),
            kind: record.monitor.kind(),
            id: record.id,
            owner_id: record.owner_id,
            silent: record.silent,
        }
    }
}

/// Response for listing monitors
#[derive(Debug, Serialize)]
pub struct ListMonitorsResponse {
    pub monitors: Vec<MonitorResponse>,
    pub total: usize,
}

/// One result of a manual run
#[derive(Debug, Serialize)]
pub struct FoundResponse {
    pub monitor_id: String,
    pub kind: MonitorKind,
    pub torrent: TorrentCandidate,
}

impl From<JobResult> for FoundResponse {
    fn from(result: JobResult) -> Self {
        Self {
            kind: result.kind(),
            monitor_id: result.record.id,
            torrent: result.candidate,
        }
    }
}

/// Response for a manual run
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub found: Vec<FoundResponse>,
    /// Absent when no download backend is configured
    pub dispatch: Option<DispatchSummary>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct MonitorErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<MonitorErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(MonitorErrorResponse {
            error: error.into(),
        }),
    )
}

fn store_error(e: StoreError) -> ApiError {
    let status = match e {
        StoreError::DuplicateId(_) => StatusCode::CONFLICT,
        StoreError::InvalidRecord { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string())
}

/// Run a store call on the blocking pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn MonitorStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(state.store());
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(store_error)
}

// ============================================================================
// Handlers
// ============================================================================

/// List monitors, optionally for one owner
pub async fn list_monitors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OwnerParams>,
) -> Result<Json<ListMonitorsResponse>, ApiError> {
    let records = with_store(&state, move |store| match params.owner_id {
        Some(owner_id) => store.find_by_owner(owner_id),
        None => store.all(),
    })
    .await?;

    let monitors: Vec<MonitorResponse> = records.into_iter().map(MonitorResponse::from).collect();
    Ok(Json(ListMonitorsResponse {
        total: monitors.len(),
        monitors,
    }))
}

/// Create a monitor
pub async fn create_monitor(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateMonitorBody>,
) -> Result<(StatusCode, Json<MonitorResponse>), ApiError> {
    let monitor = body
        .monitor
        .into_monitor()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let record = MonitorRecord::new(body.owner_id, monitor).with_silent(body.silent.unwrap_or(true));

    let stored = record.clone();
    with_store(&state, move |store| store.add(stored)).await?;

    Ok((StatusCode::CREATED, Json(MonitorResponse::from(record))))
}

/// Delete a monitor by ID
pub async fn delete_monitor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MonitorResponse>, ApiError> {
    let lookup = id.clone();
    match with_store(&state, move |store| store.remove(&lookup)).await? {
        Some(record) => Ok(Json(MonitorResponse::from(record))),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Monitor not found: {}", id),
        )),
    }
}

/// Run the search jobs now and dispatch what they find.
///
/// Without `owner_id` the configured owner is used, and without that every
/// monitor runs.
pub async fn run_monitors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OwnerParams>,
) -> Result<Json<RunResponse>, ApiError> {
    let owner_id = params
        .owner_id
        .or(state.orchestrator().config().owner_id);

    let results = state
        .orchestrator()
        .run_search_jobs(owner_id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    info!(owner_id = ?owner_id, found = results.len(), "Manual run finished");

    let dispatch = match state.dispatcher() {
        Some(dispatcher) => Some(dispatcher.dispatch(&results).await),
        None => None,
    };

    Ok(Json(RunResponse {
        found: results.into_iter().map(FoundResponse::from).collect(),
        dispatch,
    }))
}
