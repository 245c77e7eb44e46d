//! The events relayed from chat-protocol clients to RabbitMq.
//!
//! [`EventBuilder`] stamps events for an account, [`EventRelay`] publishes them to the
//! queue their kind is routed to.
mod builder;
mod queue_event;
mod relay;

pub use builder::EventBuilder;
pub use queue_event::{
    CallOfferEvent, ConnectionEvent, EventData, MediaRetryErrorEvent, MessageContent,
    MessageEvent, MessageMetadata, PairSuccessEvent, PresenceEvent, QrEvent, QueueEvent,
    ReceiptEvent,
};
pub use relay::EventRelay;
