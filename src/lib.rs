//! Kafka Pusher Library
//!
//! Generates synthetic JSON messages from declarative templates and publishes
//! them to Kafka, once or on a fixed interval.
//!
//! # Features
//!
//! - Templates in YAML or JSON, rendered by the `payload_template` crate
//! - Several payload streams, each with its own template, topic and batch size
//! - Periodic execution with a bounded worker pool
//! - Dry-run mode that prints messages instead of sending them
//!
//! # CLI Usage
//!
//! ```bash
//! # Push once using ./config.yaml
//! kafka-pusher --once
//!
//! # Run the scheduler with an explicit config
//! kafka-pusher --config /etc/kafka-pusher/config.yaml
//!
//! # Print generated messages without a broker
//! kafka-pusher --config config.yaml --dry-run
//! ```

pub mod config;
pub mod logging;
pub mod producer;
pub mod pusher;
pub mod scheduler;

pub use config::Config;
pub use producer::{KafkaSink, MessageSink, ProducerError, StdoutSink};
pub use pusher::{PayloadStream, PushTask};
pub use scheduler::{Scheduler, SchedulerStats, Task};
