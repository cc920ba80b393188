//! Application configuration.
//!
//! The configuration is a YAML file with `kafka`, `scheduler`, `logging` and
//! `payloads` sections. Missing optional values are filled with defaults and
//! the result is validated before use.

pub mod duration;

use anyhow::Context;
use duration::deserialize_duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CLIENT_ID: &str = "kafka-pusher";

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_partition() -> i32 {
    -1
}

fn default_producer_batch_size() -> usize {
    100
}

fn default_worker_pool_size() -> usize {
    1
}

fn default_payload_batch_size() -> usize {
    1
}

/// Kafka connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    #[serde(default)]
    pub brokers: Vec<String>,
    /// Default topic for payloads that do not name their own
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub client_id: String,
    /// Partition to pin every message to; negative lets the partitioner choose
    #[serde(default = "default_partition")]
    pub partition: i32,
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,
    /// Producer-side batching (`batch.num.messages`)
    #[serde(default = "default_producer_batch_size")]
    pub batch_size: usize,
    /// Enqueue messages without waiting for delivery reports
    #[serde(default, rename = "async")]
    pub async_delivery: bool,
}

/// Periodic execution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub interval: Duration,
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: default_interval(),
            worker_pool_size: default_worker_pool_size(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log every generated message at debug level
    #[serde(default)]
    pub verbose: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            verbose: false,
        }
    }
}

/// One stream of generated messages.
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadConfig {
    /// Name used in logs; defaults to the template file stem
    #[serde(default)]
    pub name: String,
    pub template_path: PathBuf,
    /// Messages generated per tick
    #[serde(default = "default_payload_batch_size")]
    pub batch_size: usize,
    /// Destination topic; defaults to `kafka.topic`
    #[serde(default)]
    pub topic: String,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub payloads: Vec<PayloadConfig>,
    /// Single-payload form, folded into `payloads` on load
    #[serde(default)]
    payload: Option<PayloadConfig>,
}

impl Config {
    /// Read, default and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid configuration in {path:?}"))
    }

    /// Parse, default and validate a configuration document.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let mut config: Config =
            serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;
        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// True when messages should be pushed periodically rather than once.
    pub fn scheduler_enabled(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|s| s.enabled)
    }

    /// Fill unset values. An explicit zero counts as unset.
    fn apply_defaults(&mut self) {
        if self.kafka.client_id.is_empty() {
            self.kafka.client_id = DEFAULT_CLIENT_ID.to_string();
        }
        if self.kafka.timeout.is_zero() {
            self.kafka.timeout = default_timeout();
        }
        if self.kafka.batch_size == 0 {
            self.kafka.batch_size = default_producer_batch_size();
        }
        if let Some(scheduler) = self.scheduler.as_mut().filter(|s| s.enabled) {
            if scheduler.interval.is_zero() {
                scheduler.interval = default_interval();
            }
            if scheduler.worker_pool_size == 0 {
                scheduler.worker_pool_size = default_worker_pool_size();
            }
        }

        if let Some(payload) = self.payload.take() {
            self.payloads.insert(0, payload);
        }

        for (index, payload) in self.payloads.iter_mut().enumerate() {
            if payload.name.is_empty() {
                payload.name = payload
                    .template_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("payload-{index}"));
            }
            if payload.topic.is_empty() {
                payload.topic = self.kafka.topic.clone();
            }
            if payload.batch_size == 0 {
                payload.batch_size = default_payload_batch_size();
            }
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.kafka.brokers.is_empty() {
            anyhow::bail!("kafka.brokers is required");
        }
        if self.kafka.brokers.iter().any(|broker| broker.trim().is_empty()) {
            anyhow::bail!("kafka.brokers must not contain empty entries");
        }

        if self.payloads.is_empty() {
            anyhow::bail!("at least one payload is required (payloads or payload)");
        }
        for payload in &self.payloads {
            if payload.template_path.as_os_str().is_empty() {
                anyhow::bail!("payload '{}': template_path is required", payload.name);
            }
            if payload.topic.is_empty() {
                anyhow::bail!(
                    "payload '{}': topic is required (set payload topic or kafka.topic)",
                    payload.name
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
kafka:
  brokers:
    - localhost:9092
  topic: minimal-topic

payload:
  template_path: ./payload.yaml
"#;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.kafka.client_id, "kafka-pusher");
        assert_eq!(config.kafka.timeout, Duration::from_secs(10));
        assert_eq!(config.kafka.batch_size, 100);
        assert_eq!(config.kafka.partition, -1);
        assert!(!config.kafka.async_delivery);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(!config.scheduler_enabled());

        assert_eq!(config.payloads.len(), 1);
        let payload = &config.payloads[0];
        assert_eq!(payload.name, "payload");
        assert_eq!(payload.batch_size, 1);
        assert_eq!(payload.topic, "minimal-topic");
    }

    #[test]
    fn test_scheduler_section() {
        let yaml = format!(
            "{MINIMAL}\nscheduler:\n  enabled: true\n  interval: 30s\n  worker_pool_size: 4\n"
        );
        let config = Config::from_yaml(&yaml).unwrap();
        let scheduler = config.scheduler.as_ref().unwrap();

        assert!(config.scheduler_enabled());
        assert_eq!(scheduler.interval, Duration::from_secs(30));
        assert_eq!(scheduler.worker_pool_size, 4);
    }

    #[test]
    fn test_scheduler_defaults() {
        let yaml = format!("{MINIMAL}\nscheduler:\n  enabled: true\n");
        let config = Config::from_yaml(&yaml).unwrap();
        let scheduler = config.scheduler.unwrap();

        assert_eq!(scheduler.interval, Duration::from_secs(5));
        assert_eq!(scheduler.worker_pool_size, 1);
    }

    #[test]
    fn test_multiple_payloads() {
        let config = Config::from_yaml(
            r#"
kafka:
  brokers: ["a:9092", "b:9092"]
  topic: fallback
  async: true
  timeout: 1500ms
logging:
  level: debug
  format: json
  verbose: true
payloads:
  - name: orders
    template_path: orders.json
    batch_size: 10
    topic: orders
  - template_path: templates/users.yaml
"#,
        )
        .unwrap();

        assert!(config.kafka.async_delivery);
        assert_eq!(config.kafka.timeout, Duration::from_millis(1500));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.verbose);

        assert_eq!(config.payloads[0].name, "orders");
        assert_eq!(config.payloads[0].batch_size, 10);
        assert_eq!(config.payloads[1].name, "users");
        assert_eq!(config.payloads[1].topic, "fallback");
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            (
                "kafka:\n  brokers: []\n  topic: t\npayload:\n  template_path: p.yaml\n",
                "kafka.brokers is required",
            ),
            (
                "kafka:\n  brokers: [\"b:9092\"]\n",
                "at least one payload is required",
            ),
            (
                "kafka:\n  brokers: [\"b:9092\"]\npayload:\n  template_path: p.yaml\n",
                "topic is required",
            ),
            (
                "kafka:\n  brokers: [\"b:9092\", \" \"]\n  topic: t\npayload:\n  template_path: p.yaml\n",
                "kafka.brokers must not contain empty entries",
            ),
        ];

        for (yaml, expected) in cases {
            let err = Config::from_yaml(yaml).unwrap_err();
            assert!(
                format!("{err:#}").contains(expected),
                "expected {expected:?}, got {err:#}"
            );
        }
    }

    #[test]
    fn test_zero_values_take_defaults() {
        let config = Config::from_yaml(
            r#"
kafka:
  brokers: ["localhost:9092"]
  topic: t
  timeout: 0
  batch_size: 0
scheduler:
  enabled: true
  interval: 0s
  worker_pool_size: 0
payload:
  template_path: p.yaml
  batch_size: 0
"#,
        )
        .unwrap();

        assert_eq!(config.kafka.timeout, Duration::from_secs(10));
        assert_eq!(config.kafka.batch_size, 100);
        let scheduler = config.scheduler.as_ref().unwrap();
        assert_eq!(scheduler.interval, Duration::from_secs(5));
        assert_eq!(scheduler.worker_pool_size, 1);
        assert_eq!(config.payloads[0].batch_size, 1);
    }

    #[test]
    fn test_disabled_scheduler_keeps_zero_values() {
        let yaml = format!("{MINIMAL}\nscheduler:\n  enabled: false\n  interval: 0\n");
        let config = Config::from_yaml(&yaml).unwrap();
        assert!(config.scheduler.unwrap().interval.is_zero());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/no/such/config.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }
}
