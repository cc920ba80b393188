//! Glue between template generators and the message sink.

use crate::config::Config;
use crate::producer::MessageSink;
use crate::scheduler::Task;
use anyhow::Context;
use async_trait::async_trait;
use payload_template::Generator;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// A configured payload with its loaded generator.
#[derive(Clone)]
pub struct PayloadStream {
    pub name: String,
    pub topic: String,
    pub batch_size: usize,
    pub generator: Arc<Generator>,
}

impl PayloadStream {
    /// Generate one batch. Stops at the first failing message.
    pub fn generate_batch(&self, verbose: bool) -> anyhow::Result<Vec<Vec<u8>>> {
        let mut messages = Vec::with_capacity(self.batch_size);
        for (i, message) in self.generator.messages(self.batch_size).enumerate() {
            let message = message
                .with_context(|| format!("Failed to generate message {i} for '{}'", self.name))?;
            if verbose {
                debug!(
                    "Generated message for '{}': {}",
                    self.name,
                    String::from_utf8_lossy(&message)
                );
            }
            messages.push(message);
        }
        Ok(messages)
    }
}

/// Generates and sends one batch per payload on every run.
pub struct PushTask {
    streams: Vec<PayloadStream>,
    sink: Arc<dyn MessageSink>,
    verbose: bool,
}

impl PushTask {
    pub fn new(streams: Vec<PayloadStream>, sink: Arc<dyn MessageSink>, verbose: bool) -> Self {
        Self {
            streams,
            sink,
            verbose,
        }
    }

    /// Load a generator for every configured payload.
    pub fn from_config(config: &Config, sink: Arc<dyn MessageSink>) -> anyhow::Result<Self> {
        let streams = config
            .payloads
            .iter()
            .map(|payload| {
                let generator = Generator::from_path(&payload.template_path).with_context(|| {
                    format!(
                        "Failed to load template for payload '{}' from {:?}",
                        payload.name, payload.template_path
                    )
                })?;
                info!(
                    "Template generator initialized: payload={}, template={:?}, topic={}",
                    payload.name, payload.template_path, payload.topic
                );
                Ok(PayloadStream {
                    name: payload.name.clone(),
                    topic: payload.topic.clone(),
                    batch_size: payload.batch_size,
                    generator: Arc::new(generator),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self::new(streams, sink, config.logging.verbose))
    }

    pub fn streams(&self) -> &[PayloadStream] {
        &self.streams
    }

    /// Generate and send one batch for every payload concurrently.
    ///
    /// Waits for all payloads and returns the first error.
    pub async fn push(&self) -> anyhow::Result<()> {
        let start = Instant::now();
        let mut tasks = JoinSet::new();

        for stream in &self.streams {
            let stream = stream.clone();
            let sink = Arc::clone(&self.sink);
            let verbose = self.verbose;
            tasks.spawn(async move {
                let generating = stream.clone();
                let messages =
                    tokio::task::spawn_blocking(move || generating.generate_batch(verbose))
                        .await
                        .context("Message generation task failed")??;
                let count = messages.len();
                sink.send_batch(&stream.topic, messages)
                    .await
                    .with_context(|| {
                        format!("Failed to send batch for '{}' to '{}'", stream.name, stream.topic)
                    })?;
                debug!("Pushed {} messages for '{}'", count, stream.name);
                Ok::<usize, anyhow::Error>(count)
            });
        }

        let mut first_error = None;
        let mut total = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined.context("Push task failed").and_then(|result| result) {
                Ok(count) => total += count,
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        info!(
            "Push completed: payloads={}, messages={}, duration={:?}",
            self.streams.len(),
            total,
            start.elapsed()
        );
        Ok(())
    }
}

#[async_trait]
impl Task for PushTask {
    async fn run(&self) -> anyhow::Result<()> {
        self.push().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::ProducerError;
    use payload_template::Format;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        sent: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    }

    #[async_trait]
    impl MessageSink for MemorySink {
        async fn send_batch(
            &self,
            topic: &str,
            messages: Vec<Vec<u8>>,
        ) -> Result<(), ProducerError> {
            self.sent
                .lock()
                .unwrap()
                .entry(topic.to_string())
                .or_default()
                .extend(messages);
            Ok(())
        }
    }

    fn stream(name: &str, topic: &str, batch_size: usize, template: &str) -> PayloadStream {
        PayloadStream {
            name: name.to_string(),
            topic: topic.to_string(),
            batch_size,
            generator: Arc::new(Generator::from_slice(template.as_bytes(), Format::Json).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_push_sends_each_payload_to_its_topic() {
        let sink = Arc::new(MemorySink::default());
        let task = PushTask::new(
            vec![
                stream(
                    "orders",
                    "orders-topic",
                    3,
                    r#"{"substitution":{"id":"{{@rnd|4}}"},"template":{"order":"{{.id}}"}}"#,
                ),
                stream(
                    "users",
                    "users-topic",
                    2,
                    r#"{"substitution":{"n":"bob"},"template":{"user":"{{.n}}"}}"#,
                ),
            ],
            sink.clone(),
            true,
        );

        task.push().await.unwrap();

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent["orders-topic"].len(), 3);
        for message in &sent["orders-topic"] {
            let value: serde_json::Value = serde_json::from_slice(message).unwrap();
            assert_eq!(value["order"].as_str().unwrap().len(), 4);
        }
        assert_eq!(sent["users-topic"], vec![br#"{"user":"bob"}"#.to_vec(); 2]);
    }

    #[tokio::test]
    async fn test_push_reports_generation_error() {
        let sink = Arc::new(MemorySink::default());
        let task = PushTask::new(
            vec![stream(
                "broken",
                "t",
                1,
                r#"{"substitution":{},"template":{"x":"{{.missing}}"}}"#,
            )],
            sink.clone(),
            false,
        );

        let err = task.push().await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to generate message 0 for 'broken'"));
        assert!(sink.sent.lock().unwrap().is_empty());
    }
}
