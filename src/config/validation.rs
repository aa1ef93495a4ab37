//! Configuration validation logic.

use crate::config::run::RunConfig;
use crate::error::{Error, Result};

/// Minimum length for an Imgur client id.
const MIN_CLIENT_ID_LENGTH: usize = 5;

/// Rendition names Redgifs exposes for video.
const KNOWN_RENDITIONS: [&str; 2] = ["hd", "sd"];

/// Validate the entire run configuration.
///
/// The Imgur client id is only required when `needs_imgur` is set, i.e. the
/// input contains Imgur posts.
pub fn validate_config(config: &RunConfig, needs_imgur: bool) -> Result<()> {
    validate_workers(config.workers)?;
    if needs_imgur || !config.imgur.client_id.is_empty() {
        validate_client_id(&config.imgur.client_id)?;
    }
    validate_renditions(&config.redgifs.renditions)?;
    validate_user_agent(&config.user_agent)?;

    Ok(())
}

pub fn validate_workers(workers: usize) -> Result<()> {
    if workers == 0 {
        return Err(Error::ConfigValidation {
            field: "workers".to_string(),
            message: "At least one worker is required".to_string(),
        });
    }

    Ok(())
}

/// Validate the Imgur client id.
pub fn validate_client_id(client_id: &str) -> Result<()> {
    if client_id.is_empty() {
        return Err(Error::MissingConfig("imgur.client_id".to_string()));
    }

    if client_id.len() < MIN_CLIENT_ID_LENGTH {
        return Err(Error::ConfigValidation {
            field: "imgur.client_id".to_string(),
            message: format!(
                "Client id must be at least {} characters (got {})",
                MIN_CLIENT_ID_LENGTH,
                client_id.len()
            ),
        });
    }

    // Check for placeholder values
    let lower = client_id.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_client_id") {
        return Err(Error::ConfigValidation {
            field: "imgur.client_id".to_string(),
            message: "Client id appears to be a placeholder. Register an application at imgur.com."
                .to_string(),
        });
    }

    Ok(())
}

/// Validate the Redgifs rendition order.
pub fn validate_renditions<S: AsRef<str>>(renditions: &[S]) -> Result<()> {
    if renditions.is_empty() {
        return Err(Error::MissingConfig(
            "redgifs.renditions (at least one rendition required)".to_string(),
        ));
    }

    for rendition in renditions {
        let rendition = rendition.as_ref();
        if !KNOWN_RENDITIONS.contains(&rendition) {
            return Err(Error::ConfigValidation {
                field: "redgifs.renditions".to_string(),
                message: format!(
                    "Unknown rendition '{}'. Expected one of: {}",
                    rendition,
                    KNOWN_RENDITIONS.join(", ")
                ),
            });
        }
    }

    Ok(())
}

pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("options.user_agent".to_string()));
    }

    Ok(())
}
