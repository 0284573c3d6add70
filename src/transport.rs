//! Kafka transport: the publisher side hands JSON payloads to the topic, the
//! pipeline side consumes them back as opaque bytes.
//!
//! Delivery guarantees, ordering and redelivery all belong to the broker and
//! its client library; this module only wires the clients up.

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::info;

use crate::config::KafkaSettings;
use crate::error::{Error, ErrorKind, Result};

/// Publishes purchase payloads to the configured topic, keyed by event id.
#[derive(Clone)]
pub struct EventPublisher {
    producer: FutureProducer,
    topic: String,
}

impl EventPublisher {
    pub fn new(settings: &KafkaSettings) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| Error::TransportError(ErrorKind::ConnectionError(e.to_string())))?;

        Ok(Self {
            producer,
            topic: settings.topic.clone(),
        })
    }

    pub async fn publish(&self, key: &str, payload: &str) -> Result<()> {
        let record = FutureRecord::to(&self.topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                info!(
                    topic = %self.topic,
                    partition = delivery.partition,
                    offset = delivery.offset,
                    key,
                    "published purchase event"
                );
                Ok(())
            }
            Err((e, _msg)) => Err(Error::TransportError(ErrorKind::PublishError(e.to_string()))),
        }
    }
}

/// Consumes raw purchase payloads from the subscribed topic.
pub struct EventSubscriber {
    consumer: StreamConsumer,
}

impl EventSubscriber {
    pub fn new(settings: &KafkaSettings) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("group.id", &settings.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| Error::TransportError(ErrorKind::ConnectionError(e.to_string())))?;

        consumer
            .subscribe(&[settings.topic.as_str()])
            .map_err(|e| Error::TransportError(ErrorKind::ConsumeError(e.to_string())))?;

        Ok(Self { consumer })
    }

    /// Waits for the next message and hands back its payload bytes verbatim.
    /// A message without a payload yields empty bytes, which the normalizer
    /// then drops as malformed.
    pub async fn recv(&self) -> Result<Vec<u8>> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| Error::TransportError(ErrorKind::ConsumeError(e.to_string())))?;

        Ok(message.payload().unwrap_or_default().to_vec())
    }
}
