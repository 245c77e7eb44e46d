use super::queue_event::{
    CallOfferEvent, ConnectionEvent, EventData, MediaRetryErrorEvent, MessageContent,
    MessageEvent, MessageMetadata, PairSuccessEvent, PresenceEvent, QrEvent, QueueEvent,
    ReceiptEvent,
};
use chrono::Utc;
use uuid::Uuid;

/// Stamps events for a single account with a fresh id and the current time.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    sender_jid: String,
}

impl EventBuilder {
    pub fn new(sender_jid: impl Into<String>) -> Self {
        Self {
            sender_jid: sender_jid.into(),
        }
    }

    pub fn sender_jid(&self) -> &str {
        &self.sender_jid
    }

    pub fn build(&self, data: EventData) -> QueueEvent {
        self.build_for(self.sender_jid.clone(), data)
    }

    fn build_for(&self, sender_jid: String, data: EventData) -> QueueEvent {
        QueueEvent {
            event_id: Uuid::new_v4(),
            sender_jid,
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn connected(&self) -> QueueEvent {
        self.build(EventData::Connected(ConnectionEvent {
            status: "connected".into(),
            reason: None,
        }))
    }

    pub fn disconnected(&self, reason: Option<String>) -> QueueEvent {
        self.build(EventData::Disconnected(ConnectionEvent {
            status: "disconnected".into(),
            reason,
        }))
    }

    pub fn logged_out(&self) -> QueueEvent {
        self.build(EventData::LoggedOut(ConnectionEvent {
            status: "logged_out".into(),
            reason: None,
        }))
    }

    /// A device finished pairing.
    ///
    /// The event is attributed to the newly paired `device_jid`; the builder's account is
    /// reported as `account_jid`.
    pub fn pair_success(
        &self,
        device_jid: impl Into<String>,
        phone_number: Option<String>,
        device_info: Option<serde_json::Value>,
    ) -> QueueEvent {
        self.build_for(
            device_jid.into(),
            EventData::PairSuccess(PairSuccessEvent {
                account_jid: self.sender_jid.clone(),
                phone_number,
                device_info,
            }),
        )
    }

    pub fn qr(&self, code: impl Into<String>) -> QueueEvent {
        self.build(EventData::Qr(QrEvent { code: code.into() }))
    }

    pub fn message(
        &self,
        sender: impl Into<String>,
        content: MessageContent,
        metadata: MessageMetadata,
    ) -> QueueEvent {
        self.build(EventData::Message(MessageEvent {
            sender: sender.into(),
            content,
            metadata,
        }))
    }

    pub fn receipt(
        &self,
        message_ids: Vec<String>,
        sender: impl Into<String>,
        timestamp: i64,
    ) -> QueueEvent {
        self.build(EventData::Receipt(ReceiptEvent {
            message_ids,
            sender: sender.into(),
            timestamp,
        }))
    }

    pub fn presence(
        &self,
        from: impl Into<String>,
        status: impl Into<String>,
        timestamp: i64,
    ) -> QueueEvent {
        self.build(EventData::Presence(PresenceEvent {
            from: from.into(),
            status: status.into(),
            timestamp,
        }))
    }

    pub fn call_offer(
        &self,
        from: impl Into<String>,
        call_id: Option<String>,
        timestamp: i64,
    ) -> QueueEvent {
        self.build(EventData::CallOffer(CallOfferEvent {
            from: from.into(),
            call_id,
            timestamp,
        }))
    }

    pub fn media_retry_error(&self, message_id: Option<String>, error: Option<String>) -> QueueEvent {
        self.build(EventData::MediaRetryError(MediaRetryErrorEvent { message_id, error }))
    }
}
