//! Typed settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use asset_indexer_kafka::ConsumerConfig;
use asset_indexer_repository::InventoryConfig;

use crate::IndexingError;

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "asset-indexer";

/// Default retry interval in seconds.
const DEFAULT_RETRY_DURATION_SECS: u64 = 5;

/// Default poll timeout in milliseconds.
const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;

/// Default inventory request timeout in seconds.
const DEFAULT_INVENTORY_TIMEOUT_SECS: u64 = 30;

/// Default annotation key holding an asset's AWS account.
const DEFAULT_AWS_ACCOUNT_ANNOTATION_KEY: &str = "discovery/aws/account";

/// Settings for the asset indexer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kafka: ConsumerConfig,
    pub inventory: InventoryConfig,
    /// Annotation key holding an asset's AWS account.
    pub aws_account_annotation_key: String,
    /// Delay before restarting a failed run. Zero disables retries.
    pub retry_interval: Duration,
    pub poll_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `KAFKA_BOOTSTRAP_SERVERS`: Kafka brokers (required)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: asset-indexer)
    /// - `KAFKA_USERNAME`, `KAFKA_PASSWORD`: SASL credentials, SASL_SSL is used when both are set
    /// - `KAFKA_SASL_MECHANISM`: SASL mechanism (default: SCRAM-SHA-256)
    /// - `KAFKA_SSL_CA_PEM`: Custom CA certificate in PEM format
    /// - `KAFKA_AUTO_COMMIT_INTERVAL_MS`: Commit interval for stored offsets (default: 5000)
    /// - `INVENTORY_ENDPOINT`: Asset inventory base URL (required)
    /// - `INVENTORY_INSECURE_SKIP_VERIFY`: `1` disables TLS verification
    /// - `INVENTORY_TIMEOUT_SECS`: Inventory request timeout (default: 30)
    /// - `AWS_ACCOUNT_ANNOTATION_KEY`: Annotation key of the AWS account (default: discovery/aws/account)
    /// - `RETRY_DURATION_SECS`: Retry interval, 0 disables retries (default: 5)
    /// - `POLL_TIMEOUT_MS`: Kafka poll timeout (default: 100)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| IndexingError::config(format!("{} is required", key)))
        };

        let mut kafka = ConsumerConfig::new(
            required("KAFKA_BOOTSTRAP_SERVERS")?,
            get("KAFKA_GROUP_ID").unwrap_or_else(|| DEFAULT_KAFKA_GROUP_ID.to_string()),
        );
        if let (Some(username), Some(password)) = (get("KAFKA_USERNAME"), get("KAFKA_PASSWORD")) {
            kafka = kafka.with_credentials(username, password);
        }
        if let Some(mechanism) = get("KAFKA_SASL_MECHANISM") {
            kafka.sasl_mechanism = mechanism;
        }
        if let Some(ca_pem) = get("KAFKA_SSL_CA_PEM") {
            kafka = kafka.with_ssl_ca(ca_pem);
        }
        kafka.auto_commit_interval_ms = parse_or(
            "KAFKA_AUTO_COMMIT_INTERVAL_MS",
            get("KAFKA_AUTO_COMMIT_INTERVAL_MS"),
            kafka.auto_commit_interval_ms,
        )?;

        let inventory = InventoryConfig::new(required("INVENTORY_ENDPOINT")?)
            .with_insecure_skip_verify(get("INVENTORY_INSECURE_SKIP_VERIFY").as_deref() == Some("1"))
            .with_request_timeout(Duration::from_secs(parse_or(
                "INVENTORY_TIMEOUT_SECS",
                get("INVENTORY_TIMEOUT_SECS"),
                DEFAULT_INVENTORY_TIMEOUT_SECS,
            )?));

        Ok(Self {
            kafka,
            inventory,
            aws_account_annotation_key: get("AWS_ACCOUNT_ANNOTATION_KEY")
                .unwrap_or_else(|| DEFAULT_AWS_ACCOUNT_ANNOTATION_KEY.to_string()),
            retry_interval: Duration::from_secs(parse_or(
                "RETRY_DURATION_SECS",
                get("RETRY_DURATION_SECS"),
                DEFAULT_RETRY_DURATION_SECS,
            )?),
            poll_timeout: Duration::from_millis(parse_or(
                "POLL_TIMEOUT_MS",
                get("POLL_TIMEOUT_MS"),
                DEFAULT_POLL_TIMEOUT_MS,
            )?),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, IndexingError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| IndexingError::config(format!("{} has an invalid value: {:?}", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("KAFKA_BOOTSTRAP_SERVERS", "localhost:9092"),
        ("INVENTORY_ENDPOINT", "http://localhost:8000"),
    ];

    #[test]
    fn test_defaults() {
        let settings = settings(&REQUIRED).unwrap();

        assert_eq!(settings.kafka.brokers, "localhost:9092");
        assert_eq!(settings.kafka.group_id, "asset-indexer");
        assert!(settings.kafka.username.is_none());
        assert_eq!(settings.inventory.endpoint, "http://localhost:8000");
        assert!(!settings.inventory.insecure_skip_verify);
        assert_eq!(settings.aws_account_annotation_key, "discovery/aws/account");
        assert_eq!(settings.retry_interval, Duration::from_secs(5));
        assert_eq!(settings.poll_timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("KAFKA_GROUP_ID", "graph-vulcan-assets"),
            ("KAFKA_USERNAME", "user"),
            ("KAFKA_PASSWORD", "secret"),
            ("INVENTORY_INSECURE_SKIP_VERIFY", "1"),
            ("RETRY_DURATION_SECS", "0"),
            ("POLL_TIMEOUT_MS", "250"),
            ("AWS_ACCOUNT_ANNOTATION_KEY", "cloud/aws/account"),
        ]);
        let settings = settings(&vars).unwrap();

        assert_eq!(settings.kafka.group_id, "graph-vulcan-assets");
        assert_eq!(settings.kafka.username.as_deref(), Some("user"));
        assert_eq!(settings.kafka.sasl_mechanism, "SCRAM-SHA-256");
        assert!(settings.inventory.insecure_skip_verify);
        assert!(settings.retry_interval.is_zero());
        assert_eq!(settings.poll_timeout, Duration::from_millis(250));
        assert_eq!(settings.aws_account_annotation_key, "cloud/aws/account");
    }

    #[test]
    fn test_missing_required_value() {
        for missing in ["KAFKA_BOOTSTRAP_SERVERS", "INVENTORY_ENDPOINT"] {
            let vars: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = settings(&vars).unwrap_err();
            assert!(err.to_string().contains(missing), "{err}");
        }
    }

    #[test]
    fn test_empty_required_value_is_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[1] = ("INVENTORY_ENDPOINT", "");
        assert!(settings(&vars).is_err());
    }

    #[test]
    fn test_invalid_number() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("RETRY_DURATION_SECS", "5s"));
        let err = settings(&vars).unwrap_err();
        assert!(matches!(err, IndexingError::ConfigError(_)));
    }

    #[test]
    fn test_insecure_flag_requires_one() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("INVENTORY_INSECURE_SKIP_VERIFY", "true"));
        assert!(!settings(&vars).unwrap().inventory.insecure_skip_verify);
    }
}
