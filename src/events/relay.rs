use super::{EventData, QueueEvent};
use crate::amqp::configuration::QueueSettings;
use crate::publishers::{Publisher, PublisherError};
use std::sync::Arc;

/// Routes [`QueueEvent`]s to their queue and publishes them.
///
/// - messages go to `messages_event_queue`;
/// - receipts go to `receipt_event_queue`;
/// - QR codes go to `qr_handler_queue`;
/// - everything else goes to `event_handler_queue`.
///
/// Failures are handed back to the caller as they are: the relay does not retry.
#[derive(Clone)]
pub struct EventRelay {
    publisher: Arc<Publisher>,
    queues: QueueSettings,
}

impl EventRelay {
    pub fn new(publisher: Arc<Publisher>, queues: QueueSettings) -> Self {
        Self { publisher, queues }
    }

    /// The queue `data` is published to.
    pub fn queue_for(&self, data: &EventData) -> &str {
        match data {
            EventData::Message(_) => &self.queues.messages_event_queue,
            EventData::Receipt(_) => &self.queues.receipt_event_queue,
            EventData::Qr(_) => &self.queues.qr_handler_queue,
            EventData::Connected(_)
            | EventData::Disconnected(_)
            | EventData::LoggedOut(_)
            | EventData::PairSuccess(_)
            | EventData::Presence(_)
            | EventData::CallOffer(_)
            | EventData::MediaRetryError(_) => &self.queues.event_handler_queue,
        }
    }

    #[tracing::instrument(
        name = "relay_event",
        skip(self, event),
        fields(event_id = %event.event_id, event_type = event.data.event_type())
    )]
    pub async fn relay(&self, event: &QueueEvent) -> Result<(), PublisherError> {
        let queue = self.queue_for(&event.data);
        self.publisher.publish(queue, event, &[]).await
    }
}
