use crate::config::types::{
    seconds_to_duration, Config, CrawlerConfig, DedupConfig, DedupKind, InputConfig, OutputConfig, RendererConfig,
    ScriptsConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_dedup_config(&config.dedup)?;
    validate_scripts_config(&config.scripts)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_renderer_config(&config.renderer)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_seconds("sleep_success", config.sleep_success)?;
    validate_seconds("sleep_error", config.sleep_error)?;

    if let Some(seconds) = config.sleep_after_load {
        validate_seconds("sleep_after_load", seconds)?;
    }

    if config.report_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "report_interval must be >= 1, got {}",
            config.report_interval
        )));
    }

    if config.max_errors == Some(0) {
        return Err(ConfigError::Validation(
            "max_errors must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates dedup configuration
fn validate_dedup_config(config: &DedupConfig) -> Result<(), ConfigError> {
    if !config.enabled || config.kind != DedupKind::Bloom {
        return Ok(());
    }

    if config.expected_items < 1 {
        return Err(ConfigError::Validation(
            "expected_items must be >= 1".to_string(),
        ));
    }

    let rate = config.false_positive_rate;
    if !(rate > 0.0 && rate < 1.0) {
        return Err(ConfigError::Validation(format!(
            "false_positive_rate must be between 0 and 1 (exclusive), got {}",
            rate
        )));
    }

    Ok(())
}

/// Validates script paths
fn validate_scripts_config(config: &ScriptsConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("load_actions", &config.load_actions),
        ("crawl_actions", &config.crawl_actions),
    ] {
        if matches!(path, Some(p) if p.as_os_str().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} path cannot be empty",
                name
            )));
        }
    }
    Ok(())
}

/// Validates input configuration
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "input path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.page_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "page_timeout must be >= 1 second, got {}",
            config.page_timeout
        )));
    }

    Ok(())
}

/// A duration in seconds must be non-negative, finite and representable
fn validate_seconds(name: &str, seconds: f64) -> Result<(), ConfigError> {
    if seconds_to_duration(seconds).is_none() {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, seconds
        )));
    }
    Ok(())
}
