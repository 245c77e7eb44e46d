//! Provides pooling of channels and connections to a RabbitMq broker.
//!
//! This module provides three key guarantees:
//! - Reusing connection objects across channels, up to a configurable number of channels per connection.
//! - Growing the number of connections on demand.
//! - Tearing down every channel and connection exactly once.
//!
//! ```rust
//! use carrot_relay::amqp::AmqpConnector;
//! use carrot_relay::amqp::configuration::AmqpSettings;
//! use carrot_relay::pool::ChannelPool;
//!
//! // Function for asyncness.
//! async fn example() -> anyhow::Result<()> {
//!     // initialize rabbitmq connection details and config.
//!     let settings = AmqpSettings::default();
//!
//!     let pool = ChannelPool::builder(AmqpConnector::new_from_config(&settings)?)
//!         .channels_per_connection(settings.channels_per_connection)
//!         .build()?;
//!
//!     // get a new Channel from the pool.
//!     let channel = pool.channel().await?;
//!     channel.close().await?;
//!
//!     pool.close().await?;
//!     Ok(())
//! }
//! ```

mod channel;
mod connection;
mod error;

pub use channel::{ChannelPool, ChannelPoolBuilder};
pub use error::Error;
