use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One conversation entry in the persisted wire shape: ids are unique within
/// a conversation and timestamps are non-decreasing in append order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::stamped(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::stamped(Sender::Bot, text)
    }

    fn stamped(sender: Sender, text: impl Into<String>) -> Self {
        Self { id: MessageId::generate(), text: text.into(), sender, timestamp: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Message, MessageId, Sender};

    #[test]
    fn serializes_to_the_persisted_wire_shape() {
        let message = Message {
            id: MessageId("m-1".to_string()),
            text: "Hello".to_string(),
            sender: Sender::User,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        };

        let json = serde_json::to_value(&message).expect("serialize message");
        assert_eq!(json["id"], "m-1");
        assert_eq!(json["sender"], "user");
        assert_eq!(json["text"], "Hello");
        assert!(json["timestamp"].as_str().expect("timestamp string").starts_with("2026-03-14T"));
    }

    #[test]
    fn round_trips_millisecond_timestamps() {
        let message = Message::bot("Welcome");
        let encoded = serde_json::to_string(&message).expect("encode");
        let decoded: Message = serde_json::from_str(&encoded).expect("decode");

        assert_eq!(decoded, message);
        assert_eq!(decoded.timestamp.timestamp_millis(), message.timestamp.timestamp_millis());
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = Message::user("a");
        let second = Message::user("a");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn rejects_unknown_sender_values() {
        let raw = r#"{"id":"m-1","text":"hi","sender":"system","timestamp":"2026-03-14T09:26:53Z"}"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }
}
