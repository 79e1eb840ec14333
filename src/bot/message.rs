//! Inbound message representation.

use teloxide::types::Message;

/// An attached file, referenced by its Telegram file id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// The parts of a Telegram message the router looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub message_id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: Option<String>,
    pub document: Option<DocumentRef>,
}

impl Incoming {
    pub fn from_telegram(msg: &Message) -> Self {
        let user = msg.from.as_ref();
        // Channel posts have no sender; key their session on the chat
        let user_id = user.map(|u| u.id.0 as i64).unwrap_or(msg.chat.id.0);
        let username = user
            .and_then(|u| u.username.as_deref())
            .unwrap_or_else(|| user.map(|u| u.first_name.as_str()).unwrap_or("unknown"))
            .to_string();

        let document = msg.document().map(|doc| DocumentRef {
            file_id: doc.file.id.0.clone(),
            file_name: doc.file_name.clone(),
            mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
        });

        Self {
            message_id: msg.id.0 as i64,
            chat_id: msg.chat.id.0,
            user_id,
            username,
            text: msg.text().map(str::to_string),
            document,
        }
    }

    /// Text message shorthand, mostly for tests.
    pub fn text(chat_id: i64, user_id: i64, message_id: i64, text: &str) -> Self {
        Self {
            message_id,
            chat_id,
            user_id,
            username: "unknown".to_string(),
            text: Some(text.to_string()),
            document: None,
        }
    }
}
