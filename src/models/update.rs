use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One inbound update delivered by the chat platform in webhook mode.
///
/// Only the fields this service reads are modeled; unknown fields are
/// ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<Sender>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// The requester. `id` is the opaque identity key used for rate limiting
/// and logging.
#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
}

/// Reply payload returned in the webhook HTTP response, the platform's
/// answer-inline delivery mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundReply {
    /// Always "sendMessage".
    pub method: &'static str,
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl OutboundReply {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            method: "sendMessage",
            chat_id,
            text: text.into(),
            reply_to_message_id: None,
        }
    }

    pub fn in_reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

/// Bot commands recognized by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Help,
    Check,
}

impl Command {
    /// Parse a message text into a command and its arguments.
    ///
    /// Returns `None` for non-command text and unknown commands. A trailing
    /// bot mention (`/check@SomeBot`) is stripped before matching.
    pub fn parse(text: &str) -> Option<(Command, Vec<&str>)> {
        let mut words = text.split_whitespace();
        let mut keyword = words.next()?.strip_prefix('/')?;
        if let Some((name, _bot)) = keyword.split_once('@') {
            keyword = name;
        }
        let command = keyword.parse().ok()?;
        Some((command, words.collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_with_argument() {
        assert_eq!(
            Command::parse("/check SBA1234M"),
            Some((Command::Check, vec!["SBA1234M"]))
        );
    }

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(Command::parse("/start"), Some((Command::Start, vec![])));
        assert_eq!(Command::parse("/help"), Some((Command::Help, vec![])));
        assert_eq!(Command::parse("/check"), Some((Command::Check, vec![])));
    }

    #[test]
    fn test_parse_strips_bot_mention() {
        assert_eq!(
            Command::parse("/check@VehicleCheckBot SBA1234M"),
            Some((Command::Check, vec!["SBA1234M"]))
        );
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/frobnicate"), None);
        assert_eq!(Command::parse("check SBA1234M"), None);
    }

    #[test]
    fn test_update_deserializes() {
        let json = r#"{
            "update_id": 88123,
            "message": {
                "message_id": 42,
                "chat": {"id": 555001, "type": "private"},
                "from": {"id": 555001, "username": "jay", "is_bot": false},
                "text": "/check SBA1234M"
            }
        }"#;
        let update: InboundUpdate = serde_json::from_str(json).expect("valid update");
        let message = update.message.expect("message present");
        assert_eq!(message.chat.id, 555001);
        assert_eq!(message.from.expect("sender present").id, 555001);
        assert_eq!(message.text.as_deref(), Some("/check SBA1234M"));
    }

    #[test]
    fn test_reply_serialization() {
        let reply = OutboundReply::new(7, "hi").in_reply_to(42);
        let json = serde_json::to_value(&reply).expect("serializes");
        assert_eq!(json["method"], "sendMessage");
        assert_eq!(json["chat_id"], 7);
        assert_eq!(json["reply_to_message_id"], 42);

        let no_reply_to = serde_json::to_value(OutboundReply::new(7, "hi")).expect("serializes");
        assert!(no_reply_to.get("reply_to_message_id").is_none());
    }
}
