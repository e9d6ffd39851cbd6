use std::net::IpAddr;

use super::settings::Settings;
use crate::core::errors::ConfigError;

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_host(&settings.server.host)?;
    validate_range("server.max_message_chars", settings.server.max_message_chars, 1, 1_000_000)?;

    validate_range("rag.top_k", settings.rag.top_k, 1, 100)?;
    validate_range("embedding.dimension", settings.embedding.dimension, 1, 65_536)?;
    validate_range("ingest.batch_size", settings.ingest.batch_size, 1, 1_000)?;

    validate_range("llm.timeout_secs", settings.llm.timeout_secs as usize, 1, 86_400)?;
    validate_range(
        "embedding.timeout_secs",
        settings.embedding.timeout_secs as usize,
        1,
        86_400,
    )?;
    validate_range(
        "vector_store.timeout_secs",
        settings.vector_store.timeout_secs as usize,
        1,
        86_400,
    )?;

    if !(0.0..=2.0).contains(&settings.llm.temperature) {
        return Err(invalid(
            "llm.temperature",
            format!("{} is outside 0.0..=2.0", settings.llm.temperature),
        ));
    }

    require_non_empty("llm.model", &settings.llm.model)?;
    require_non_empty("llm.base_url", &settings.llm.base_url)?;
    require_non_empty("embedding.model", &settings.embedding.model)?;
    require_non_empty("embedding.base_url", &settings.embedding.base_url)?;
    require_non_empty("ingest.title_column", &settings.ingest.title_column)?;
    require_non_empty("ingest.review_column", &settings.ingest.review_column)?;

    let collection = settings.vector_store.collection.as_str();
    require_non_empty("vector_store.collection", collection)?;
    if !collection
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(invalid(
            "vector_store.collection",
            format!("{:?} may only contain letters, digits and underscores", collection),
        ));
    }

    Ok(())
}

/// Accepts IP literals and DNS hostnames such as `localhost`.
fn validate_host(host: &str) -> Result<(), ConfigError> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if host.len() <= 253 && host.split('.').all(valid_label) {
        return Ok(());
    }

    Err(invalid(
        "server.host",
        format!("{:?} is neither an IP address nor a hostname", host),
    ))
}

fn validate_range(key: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(invalid(key, format!("{} is outside {}..={}", value, min, max)));
    }
    Ok(())
}

fn require_non_empty(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(key, "must not be empty".to_string()));
    }
    Ok(())
}

fn invalid(key: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { key, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        validate_settings(&Settings::default()).expect("defaults should validate");
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut settings = Settings::default();
        settings.rag.top_k = 0;
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "rag.top_k", .. }));
    }

    #[test]
    fn collection_name_with_dash_is_rejected() {
        let mut settings = Settings::default();
        settings.vector_store.collection = "flip-kart".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "vector_store.collection",
                ..
            }
        ));
    }

    #[test]
    fn unparseable_host_is_rejected() {
        let mut settings = Settings::default();
        settings.server.host = "not a host".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn hostnames_and_ip_literals_are_accepted() {
        for host in ["localhost", "review-rag.internal", "127.0.0.1", "::1", "[::]"] {
            let mut settings = Settings::default();
            settings.server.host = host.to_string();
            assert!(validate_settings(&settings).is_ok(), "{host} should be accepted");
        }
    }

    #[test]
    fn malformed_hostname_is_rejected() {
        for host in ["", "-edge.example", "bad_host", "a..b"] {
            let mut settings = Settings::default();
            settings.server.host = host.to_string();
            let err = validate_settings(&settings).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "server.host", .. }));
        }
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let mut settings = Settings::default();
        settings.llm.temperature = 3.5;
        assert!(validate_settings(&settings).is_err());
    }
}
