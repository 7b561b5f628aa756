//! apibay (The Pirate Bay JSON API) search backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::SearcherConfig;
use crate::metrics;

use super::types::{rank_by_seeders, BYTES_PER_GB};
use super::{SearchError, SearchProvider, TorrentCandidate, TrustStatus};

/// Name apibay uses for its single-element "nothing found" payload.
const NO_RESULTS_SENTINEL: &str = "No results returned";

/// apibay search backend.
pub struct ApibaySearcher {
    client: Client,
    config: SearcherConfig,
}

impl ApibaySearcher {
    /// Create a new searcher with the given configuration.
    pub fn new(config: SearcherConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Query the index and return ranked candidates, keeping the failure reason.
    async fn fetch(&self, query: &str) -> Result<Vec<TorrentCandidate>, SearchError> {
        let response = self
            .client
            .get(&self.config.url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::ConnectionFailed(e.to_string())
                } else {
                    SearchError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        parse_response(&body, &self.config.details_url_prefix)
    }
}

#[async_trait]
impl SearchProvider for ApibaySearcher {
    fn name(&self) -> &str {
        "apibay"
    }

    async fn search(&self, query: &str) -> Vec<TorrentCandidate> {
        let start = Instant::now();
        let result = self.fetch(query).await;
        metrics::SEARCH_DURATION.observe(start.elapsed().as_secs_f64());

        match result {
            Ok(candidates) => {
                let outcome = if candidates.is_empty() { "empty" } else { "hit" };
                metrics::SEARCHES.with_label_values(&[outcome]).inc();
                debug!(query = %query, results = candidates.len(), "Search complete");
                candidates
            }
            Err(e) => {
                metrics::SEARCHES.with_label_values(&[e.outcome()]).inc();
                warn!(query = %query, error = %e, "Search failed, treating as no results");
                Vec::new()
            }
        }
    }
}

/// Parse an apibay response body into ranked candidates.
fn parse_response(body: &str, details_prefix: &str) -> Result<Vec<TorrentCandidate>, SearchError> {
    let results: Vec<ApibayResult> = serde_json::from_str(body)
        .map_err(|e| SearchError::ApiError(format!("Failed to parse response: {}", e)))?;

    if is_no_results(&results) {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<TorrentCandidate> = results
        .into_iter()
        .map(|r| TorrentCandidate {
            link: format!("{}{}", details_prefix, r.id),
            size_gb: r.size as f64 / BYTES_PER_GB,
            seeders: r.seeders.min(u32::MAX as u64) as u32,
            status: TrustStatus::from_wire(&r.status),
            info_hash: r.info_hash,
            name: r.name,
        })
        .collect();

    rank_by_seeders(&mut candidates);
    Ok(candidates)
}

fn is_no_results(results: &[ApibayResult]) -> bool {
    match results {
        [] => true,
        [only] => only.name == NO_RESULTS_SENTINEL || only.id == "0",
        _ => false,
    }
}

// apibay response types. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct ApibayResult {
    #[serde(deserialize_with = "lenient_string")]
    id: String,
    name: String,
    #[serde(default)]
    info_hash: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    seeders: u64,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid unsigned number: {}", n))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://thepiratebay.org/description.php?id=";

    #[test]
    fn test_parse_response_ranks_by_seeders() {
        let body = r#"[
            {"id":"1","name":"Torrent 1","info_hash":"AAA","size":"536870912","seeders":"10","status":"trusted"},
            {"id":"2","name":"Torrent 2","info_hash":"BBB","size":"2147483648","seeders":"5","status":"member"},
            {"id":"3","name":"Torrent 3","info_hash":"CCC","size":"1073741824","seeders":"50","status":"vip"}
        ]"#;

        let candidates = parse_response(body, PREFIX).unwrap();
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Torrent 3", "Torrent 1", "Torrent 2"]);

        assert_eq!(candidates[0].status, TrustStatus::Vip);
        assert_eq!(candidates[0].size_gb, 1.0);
        assert_eq!(candidates[0].link, format!("{}3", PREFIX));
        assert_eq!(candidates[1].size_gb, 0.5);
        assert_eq!(candidates[2].status, TrustStatus::Other);
    }

    #[test]
    fn test_parse_response_accepts_numbers() {
        let body = r#"[{"id":7,"name":"Numeric","info_hash":"H","size":1073741824,"seeders":3,"status":"vip"}]"#;
        let candidates = parse_response(body, PREFIX).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].seeders, 3);
        assert_eq!(candidates[0].link, format!("{}7", PREFIX));
    }

    #[test]
    fn test_parse_response_sentinel() {
        let body = r#"[{"id":"0","name":"No results returned","info_hash":"0000000000000000000000000000000000000000","leechers":"0","seeders":"0","num_files":"0","size":"0","username":"","added":"0","status":"member","category":"0","imdb":""}]"#;
        let candidates = parse_response(body, PREFIX).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_parse_response_empty_array() {
        assert!(parse_response("[]", PREFIX).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_malformed() {
        let result = parse_response("<html>busy</html>", PREFIX);
        assert!(matches!(result, Err(SearchError::ApiError(_))));

        let result = parse_response(r#"[{"id":"1","name":"x","seeders":"many"}]"#, PREFIX);
        assert!(matches!(result, Err(SearchError::ApiError(_))));
    }
}
