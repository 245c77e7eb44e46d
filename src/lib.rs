//! `carrot-relay` publishes chat-protocol events to RabbitMq, built on top of [`lapin`].
//!
//! The heavy lifting happens in [`ChannelPool`](crate::pool::ChannelPool), which multiplexes
//! channels over a growing set of connections, and [`Publisher`](crate::publishers::Publisher),
//! which turns any serializable payload into a JSON message on a declared queue or exchange.
//! They are the best starting points to learn more about what `carrot-relay` provides.
//!
//! ## Examples
//!
//! Check the `demos` directory to see the library in action.

pub mod amqp;
pub mod events;
pub mod pool;
pub mod publishers;
pub mod registry;
