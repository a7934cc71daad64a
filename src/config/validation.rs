use crate::config::types::{
    ClientConfig, Config, CrawlerConfig, OutputConfig, SearchConfig, SessionConfig, SignerConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_client_config(&config.client)?;
    validate_crawler_config(&config.crawler)?;
    validate_search_config(&config.search)?;
    validate_session_config(&config.session)?;
    validate_signer_config(&config.signer)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates transport configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.comment_page_size < 1 || config.comment_page_size > 20 {
        return Err(ConfigError::Validation(format!(
            "comment_page_size must be between 1 and 20, got {}",
            config.comment_page_size
        )));
    }

    if config.max_pages_per_walk == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages_per_walk must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "search must list at least one keyword".to_string(),
        ));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search keywords cannot be blank".to_string(),
        ));
    }

    if config.pages < 1 {
        return Err(ConfigError::Validation(
            "search pages must be >= 1".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "search page_size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    Ok(())
}

fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.cookies_path.is_empty() {
        return Err(ConfigError::Validation(
            "cookies_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_signer_config(config: &SignerConfig) -> Result<(), ConfigError> {
    match config.command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(
            "signer command must name a program".to_string(),
        )),
    }
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.contents_path.is_empty() {
        return Err(ConfigError::Validation(
            "contents_path cannot be empty".to_string(),
        ));
    }

    if config.comments_path.is_empty() {
        return Err(ConfigError::Validation(
            "comments_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
