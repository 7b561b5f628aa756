use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Search URL is set and the timeout is not 0
/// - Lookup fan-out and poll interval are not 0
/// - Server port is not 0
/// - Download URL is set when the section exists
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.searcher.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "searcher.url cannot be empty".to_string(),
        ));
    }

    if config.searcher.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "searcher.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.max_concurrent_lookups == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_concurrent_lookups cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.max_rounds == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_rounds cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.poll_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(download) = &config.download {
        if download.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "download.url cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
