use carrot_relay::amqp::configuration::Settings;
use carrot_relay::amqp::{AmqpConnector, ExchangeKind};
use carrot_relay::events::{EventBuilder, EventRelay, MessageContent, MessageMetadata};
use carrot_relay::pool::ChannelPool;
use carrot_relay::publishers::{with_exchange, Publisher};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // The out-of-the-box parameters for the default RabbitMq Docker image,
    // unless a configuration file is passed as first argument.
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    // Nothing is dialed yet: the first connection is opened when the first channel is requested.
    // Once `channels_per_connection` channels have been opened on it, the pool dials another one.
    let connector = AmqpConnector::new_from_config(&settings.amqp)?;
    let channel_pool = ChannelPool::builder(connector)
        .channels_per_connection(settings.amqp.channels_per_connection)
        .build()?;

    let mut builder = Publisher::builder(channel_pool.clone());
    if let Some(timeout) = settings.amqp.publish_timeout() {
        builder = builder.publish_timeout(timeout);
    }
    let publisher = Arc::new(builder.build()?);

    // Any serializable payload can be published to a queue...
    if let Err(e) = publisher
        .publish("hello", &serde_json::json!({"greeting": "Hello world!"}), &[])
        .await
    {
        tracing::error!(error = ?e, "Failed to publish to the `hello` queue");
    }

    // ...routed through a specific exchange...
    if let Err(e) = publisher
        .publish("hello", &"Hello again!", &[with_exchange("amq.direct")])
        .await
    {
        tracing::error!(error = ?e, "Failed to publish through `amq.direct`");
    }

    // ...or broadcast through an exchange of your choice.
    if let Err(e) = publisher
        .exchange_publish("broadcast", ExchangeKind::Fanout, &[1, 2, 3], &[])
        .await
    {
        tracing::error!(error = ?e, "Failed to publish to the `broadcast` exchange");
    }

    // Chat events are routed to the queue matching their kind.
    let relay = EventRelay::new(Arc::clone(&publisher), settings.queues.clone());
    let events = EventBuilder::new("6281234567890@s.whatsapp.net");
    for event in [
        events.connected(),
        events.message(
            "6289876543210@s.whatsapp.net",
            MessageContent::Text {
                content: "Hello from carrot-relay".into(),
            },
            MessageMetadata::default(),
        ),
        events.receipt(vec!["3EB0C767D71D".into()], "6289876543210@s.whatsapp.net", 1_700_000_000),
    ] {
        if let Err(e) = relay.relay(&event).await {
            tracing::error!(error = ?e, event_type = event.data.event_type(), "Failed to relay event");
        }
    }

    tracing::info!(
        connections = channel_pool.connection_count().await,
        channels = channel_pool.channel_count().await,
        "Done publishing"
    );
    channel_pool.close().await?;

    Ok(())
}
