use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The envelope of every event published to RabbitMq.
///
/// Serialized as `{"event_id", "sender_jid", "event_type", "timestamp", "data"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEvent {
    pub event_id: Uuid,
    /// The account the event belongs to.
    pub sender_jid: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub data: EventData,
}

/// Every kind of event relayed from the chat protocol client, with its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum EventData {
    Connected(ConnectionEvent),
    Disconnected(ConnectionEvent),
    LoggedOut(ConnectionEvent),
    PairSuccess(PairSuccessEvent),
    Message(MessageEvent),
    Qr(QrEvent),
    Receipt(ReceiptEvent),
    Presence(PresenceEvent),
    CallOffer(CallOfferEvent),
    MediaRetryError(MediaRetryErrorEvent),
}

impl EventData {
    /// The `event_type` tag this event is serialized with.
    pub fn event_type(&self) -> &'static str {
        match self {
            EventData::Connected(_) => "connected",
            EventData::Disconnected(_) => "disconnected",
            EventData::LoggedOut(_) => "logged_out",
            EventData::PairSuccess(_) => "pair_success",
            EventData::Message(_) => "message",
            EventData::Qr(_) => "qr",
            EventData::Receipt(_) => "receipt",
            EventData::Presence(_) => "presence",
            EventData::CallOffer(_) => "call_offer",
            EventData::MediaRetryError(_) => "media_retry_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEvent {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSuccessEvent {
    pub account_jid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrEvent {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptEvent {
    pub message_ids: Vec<String>,
    pub sender: String,
    /// Unix timestamp, in seconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceEvent {
    pub from: String,
    /// `available`, `unavailable`, `composing`, ...
    pub status: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallOfferEvent {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRetryErrorEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEvent {
    pub sender: String,
    #[serde(flatten)]
    pub content: MessageContent,
    pub metadata: MessageMetadata,
}

/// Where a message comes from. Every field is optional and omitted when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_me: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<String>,
}

/// The content of a chat message, tagged by `message_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        content: String,
    },
    Image {
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_url: Option<String>,
    },
    Audio {
        /// In seconds.
        #[serde(skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_url: Option<String>,
    },
    Video {
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_url: Option<String>,
    },
    Document {
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_url: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<String>,
    },
    Reaction {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_key: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_sender: Option<String>,
    },
    ButtonResponse {
        selected_button_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        display_text: Option<String>,
    },
    ListResponse {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        selected_row_id: Option<String>,
    },
}
