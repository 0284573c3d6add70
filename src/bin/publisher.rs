use purchase_stream::config::Settings;
use purchase_stream::lookup::LookupStore;
use purchase_stream::producer::run_publisher;
use purchase_stream::transport::EventPublisher;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "purchase_stream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;

    let store = LookupStore::connect(&settings.lookup.url).await?;
    let publisher = EventPublisher::new(&settings.kafka)?;

    run_publisher(&settings.producer, &store, &publisher).await?;
    Ok(())
}
