//! Outbound Telegram transport.

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    ChatAction, FileId, ForceReply, InputFile, KeyboardButton, KeyboardMarkup, MessageId, ParseMode,
    ReplyParameters,
};
use tracing::{info, warn};

/// Buttons per reply keyboard row.
const ROW_WIDTH: usize = 2;

/// Reply markup attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Resizable reply keyboard, laid out in rows.
    Menu(Vec<Vec<&'static str>>),
    /// Ask the client to open a reply to this message.
    ForceReply,
}

impl Keyboard {
    pub fn menu(buttons: impl IntoIterator<Item = &'static str>) -> Self {
        let buttons: Vec<&'static str> = buttons.into_iter().collect();
        Keyboard::Menu(buttons.chunks(ROW_WIDTH).map(|row| row.to_vec()).collect())
    }
}

/// A text message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub text: String,
    /// Parse `text` as Telegram HTML.
    pub html: bool,
    pub keyboard: Option<Keyboard>,
    pub reply_to: Option<i64>,
}

impl Outgoing {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
            keyboard: None,
            reply_to: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::plain(text)
        }
    }

    pub fn keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Everything the router needs from the chat transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Returns the sent message's id.
    async fn send(&self, chat_id: i64, message: Outgoing) -> Result<i64, String>;

    async fn send_document(
        &self,
        chat_id: i64,
        data: Vec<u8>,
        file_name: &str,
        caption: Option<&str>,
    ) -> Result<i64, String>;

    async fn send_typing(&self, chat_id: i64) -> Result<(), String>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), String>;

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, String>;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn reply_markup(keyboard: &Keyboard) -> teloxide::types::ReplyMarkup {
    match keyboard {
        Keyboard::Menu(rows) => {
            let rows: Vec<Vec<KeyboardButton>> = rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect())
                .collect();
            KeyboardMarkup::new(rows).resize_keyboard().into()
        }
        Keyboard::ForceReply => ForceReply::new().selective().into(),
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, chat_id: i64, message: Outgoing) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), message.text);

        if message.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(ref keyboard) = message.keyboard {
            request = request.reply_markup(reply_markup(keyboard));
        }
        if let Some(msg_id) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(msg_id as i32)));
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    async fn send_document(
        &self,
        chat_id: i64,
        data: Vec<u8>,
        file_name: &str,
        caption: Option<&str>,
    ) -> Result<i64, String> {
        info!("📄 Sending document {} to chat {} ({} bytes)", file_name, chat_id, data.len());

        let input_file = InputFile::memory(data).file_name(file_name.to_string());
        let mut request = self.bot.send_document(ChatId(chat_id), input_file);

        if let Some(cap) = caption {
            request = request.caption(cap);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send document: {e}");
            warn!("{}", msg);
            msg
        })
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), String> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to send chat action: {e}"))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), String> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id as i32))
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to delete message: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        info!("📥 Downloaded file ({} bytes)", data.len());
        Ok(data)
    }
}
