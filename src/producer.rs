//! Message delivery.
//!
//! [`MessageSink`] is the seam between message generation and transport.
//! [`KafkaSink`] publishes to Kafka through an rdkafka `FutureProducer`;
//! [`StdoutSink`] prints messages for dry runs.

use crate::config::KafkaConfig;
use async_trait::async_trait;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::io::Write;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that can occur while delivering messages.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Failed to deliver {failed} of {total} messages to '{topic}': {source}")]
    Delivery {
        topic: String,
        failed: usize,
        total: usize,
        #[source]
        source: KafkaError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for generated messages.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver a batch of messages to `topic`.
    async fn send_batch(&self, topic: &str, messages: Vec<Vec<u8>>) -> Result<(), ProducerError>;

    /// Wait for outstanding deliveries.
    async fn flush(&self) -> Result<(), ProducerError> {
        Ok(())
    }
}

/// Kafka producer wrapper.
pub struct KafkaSink {
    producer: FutureProducer,
    partition: Option<i32>,
    timeout: Duration,
    async_delivery: bool,
}

impl KafkaSink {
    /// Create a producer from the Kafka configuration.
    pub fn new(config: &KafkaConfig) -> Result<Self, ProducerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", config.timeout.as_millis().to_string())
            .set("request.required.acks", "1")
            .set("compression.type", "snappy")
            .set("linger.ms", "10")
            .set("batch.num.messages", config.batch_size.to_string())
            .create()?;

        info!(
            "Kafka producer initialized: brokers={:?}, client_id={}",
            config.brokers, config.client_id
        );

        Ok(Self {
            producer,
            partition: (config.partition >= 0).then_some(config.partition),
            timeout: config.timeout,
            async_delivery: config.async_delivery,
        })
    }

    fn record<'a>(&self, topic: &'a str, payload: &'a [u8]) -> FutureRecord<'a, (), [u8]> {
        let record = FutureRecord::to(topic).payload(payload);
        match self.partition {
            Some(partition) => record.partition(partition),
            None => record,
        }
    }

    /// Enqueue without waiting for delivery reports.
    fn enqueue_batch(&self, topic: &str, messages: &[Vec<u8>]) -> Result<(), ProducerError> {
        for payload in messages {
            // Dropping the delivery future does not cancel the delivery.
            self.producer
                .send_result(self.record(topic, payload))
                .map_err(|(err, _)| err)?;
        }
        Ok(())
    }

    async fn deliver_batch(&self, topic: &str, messages: &[Vec<u8>]) -> Result<(), ProducerError> {
        let deliveries = messages
            .iter()
            .map(|payload| self.producer.send(self.record(topic, payload), self.timeout));
        let results = futures::future::join_all(deliveries).await;

        let mut failures = results.into_iter().filter_map(|result| result.err());
        if let Some((first, _)) = failures.next() {
            return Err(ProducerError::Delivery {
                topic: topic.to_string(),
                failed: 1 + failures.count(),
                total: messages.len(),
                source: first,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSink for KafkaSink {
    async fn send_batch(&self, topic: &str, messages: Vec<Vec<u8>>) -> Result<(), ProducerError> {
        if messages.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let result = if self.async_delivery {
            self.enqueue_batch(topic, &messages)
        } else {
            self.deliver_batch(topic, &messages).await
        };
        let duration = start.elapsed();

        match &result {
            Ok(()) => info!(
                "Batch sent successfully: topic={}, count={}, duration={:?}",
                topic,
                messages.len(),
                duration
            ),
            Err(e) => error!(
                "Failed to send batch: topic={}, count={}, duration={:?}: {}",
                topic,
                messages.len(),
                duration,
                e
            ),
        }
        result
    }

    async fn flush(&self) -> Result<(), ProducerError> {
        info!("Flushing Kafka producer");
        self.producer.flush(self.timeout)?;
        Ok(())
    }
}

/// Writes each message as one line on standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSink for StdoutSink {
    async fn send_batch(&self, topic: &str, messages: Vec<Vec<u8>>) -> Result<(), ProducerError> {
        let mut stdout = std::io::stdout().lock();
        for message in &messages {
            stdout.write_all(message)?;
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        debug!("Dry run: printed {} messages for topic '{}'", messages.len(), topic);
        Ok(())
    }
}
