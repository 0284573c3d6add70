//! The publisher loop: sample a customer and a product, synthesize a
//! purchase, publish it, sleep, repeat.

use std::time::Duration;
use tracing::info;

use crate::config::ProducerSettings;
use crate::error::{Error, ErrorKind, Result};
use crate::event::generate_purchase_event;
use crate::lookup::LookupStore;
use crate::transport::EventPublisher;

/// Publishes a fixed batch of simulated purchases, one every interval.
///
/// Lookup and publish failures are fatal for the run; there is nothing to
/// drop here, only records we failed to create in the first place.
pub async fn run_publisher(
    settings: &ProducerSettings,
    store: &LookupStore,
    publisher: &EventPublisher,
) -> Result<()> {
    info!(
        count = settings.message_count,
        interval_ms = settings.publish_interval_ms,
        "publishing simulated purchases"
    );

    for _ in 0..settings.message_count {
        let customer = store.random_customer().await?;
        let product = store.random_product().await?;
        let event = generate_purchase_event(&customer, &product);

        let payload = serde_json::to_string(&event)
            .map_err(|e| Error::ProducerError(ErrorKind::SerializationError(e.to_string())))?;
        publisher.publish(&event.event_id, &payload).await?;

        tokio::time::sleep(Duration::from_millis(settings.publish_interval_ms)).await;
    }

    info!("done publishing");
    Ok(())
}
