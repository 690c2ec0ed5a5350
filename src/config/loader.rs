//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{HandlerConfig, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// `.toml` files are read as TOML, everything else as JSON.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let config = if is_toml {
        parse_toml(&content)?
    } else {
        parse_json(&content)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Top-level keys marking a flat passive handler document.
const FLAT_HANDLER_KEYS: [&str; 4] = ["handlerType", "HandlerType", "hostAddresses", "HostAddresses"];

fn is_flat_handler<'a>(mut keys: impl Iterator<Item = &'a String>) -> bool {
    keys.any(|key| FLAT_HANDLER_KEYS.contains(&key.as_str()))
}

/// Parse JSON, either a full document or a flat passive handler object.
pub fn parse_json(content: &str) -> Result<ProxyConfig, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let flat = value.as_object().is_some_and(|doc| is_flat_handler(doc.keys()));
    if flat {
        let handler: HandlerConfig = serde_json::from_value(value)?;
        return Ok(ProxyConfig::passive(handler));
    }
    Ok(serde_json::from_value(value)?)
}

/// Parse TOML, either a full document or a flat passive handler table.
pub fn parse_toml(content: &str) -> Result<ProxyConfig, ConfigError> {
    let table: toml::Table = toml::from_str(content)?;
    let flat = is_flat_handler(table.keys());
    let value = toml::Value::Table(table);
    if flat {
        let handler: HandlerConfig = value.try_into()?;
        return Ok(ProxyConfig::passive(handler));
    }
    Ok(value.try_into()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_active_json() {
        let config = parse_json(
            r#"{
                "routingAlgorithm": "RoundRobin",
                "requestHandling": { "maxRetries": 2, "timeoutSeconds": 3 },
                "healthCheck": { "path": "/status", "numRequired": 2, "intervalSeconds": 5, "timeoutSeconds": 1 },
                "hosts": ["http://localhost:4001"]
            }"#,
        )
        .unwrap();

        assert!(!config.is_passive());
        assert_eq!(config.request_handling.max_retries, 2);
        assert_eq!(config.health_check.num_required, 2);
        assert_eq!(config.hosts, vec!["http://localhost:4001"]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_parse_passive_json() {
        let config = parse_json(
            r#"{
                "handler": {
                    "handlerType": "RoundRobin",
                    "hostAddresses": ["http://localhost:4001", "http://localhost:4002"],
                    "maxRetries": 1,
                    "timeoutSeconds": 2,
                    "recoverySeconds": 30
                }
            }"#,
        )
        .unwrap();

        let handler = config.handler.unwrap();
        assert_eq!(handler.host_addresses.len(), 2);
        assert_eq!(handler.recovery_seconds, 30);
        assert_eq!(handler.forward_path, "/echojson");
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_toml(
            r#"
            routingAlgorithm = "RoundRobin"

            [listener]
            bindAddress = "127.0.0.1:3100"

            [requestHandling]
            maxRetries = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3100");
        assert_eq!(config.request_handling.max_retries, 4);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let path = std::env::temp_dir().join(format!("host-router-{}.json", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(br#"{ "routingAlgorithm": "Random" }"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: unsupported routing algorithm Random");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/appconfig.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_pascal_case_keys_accepted() {
        let config = parse_json(
            r#"{
                "RoutingAlgorithm": "RoundRobin",
                "RequestHandling": { "MaxRetries": 3, "TimeoutSeconds": 2 },
                "HealthCheck": { "Path": "/health", "NumRequired": 2, "IntervalSeconds": 4, "TimeoutSeconds": 1 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.request_handling.max_retries, 3);
        assert_eq!(config.health_check.path, "/health");
        assert_eq!(config.health_check.num_required, 2);
    }

    #[test]
    fn test_pascal_case_unsupported_algorithm_fails_validation() {
        let config = parse_json(r#"{ "RoutingAlgorithm": "Random", "HealthCheck": { "NumRequired": 0 } }"#).unwrap();
        assert_eq!(config.routing_algorithm, "Random");
        assert_eq!(config.health_check.num_required, 0);
        assert_eq!(validate_config(&config).unwrap_err().len(), 2);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            parse_json(r#"{ "routingAlgoritm": "Random" }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            parse_json(r#"{ "healthCheck": { "numrequired": 3 } }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            parse_toml("[requestHandling]\nmaxRetrys = 2\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_flat_passive_handler_json() {
        let config = parse_json(
            r#"{
                "HandlerType": "RoundRobin",
                "HostAddresses": ["http://localhost:4001", "http://localhost:4002"],
                "MaxRetries": 2,
                "TimeoutSeconds": 3,
                "RecoverySeconds": 15
            }"#,
        )
        .unwrap();

        assert!(config.is_passive());
        let handler = config.handler.unwrap();
        assert_eq!(handler.host_addresses.len(), 2);
        assert_eq!(handler.max_retries, 2);
        assert_eq!(handler.recovery_seconds, 15);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_flat_passive_handler_toml() {
        let config = parse_toml(
            r#"
            handlerType = "RoundRobin"
            hostAddresses = ["http://localhost:4001"]
            recoverySeconds = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.handler.unwrap().recovery_seconds, 5);
    }

    #[test]
    fn test_flat_handler_rejects_unknown_keys() {
        assert!(matches!(
            parse_json(r#"{ "hostAddresses": ["http://localhost:4001"], "recovery": 5 }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_json("{ not json"), Err(ConfigError::Json(_))));
    }
}
