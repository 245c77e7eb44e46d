//! Facilities to publish JSON messages to RabbitMq queues and exchanges.
//! Check out [`Publisher`] as a starting point.
mod options;
mod publisher;

pub use options::{
    with_exchange, with_immediate, with_mandatory, with_publishing, DeliveryMode, PublishOption,
    PublisherOptions, Publishing,
};
pub use publisher::{Publisher, PublisherBuilder, PublisherError};
