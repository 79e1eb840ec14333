//! Routes each inbound message to one handler.
//!
//! A pending session mode takes precedence: the next text message from that
//! user answers it. Otherwise the text is looked up in the menu table.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::chunk::{self, escape_html, split_text};
use super::documents::{self, DocumentKind};
use super::docx;
use super::menu::{self, WritingKind};
use super::message::{DocumentRef, Incoming};
use super::security;
use super::session::{Mode, SessionStore};
use super::telegram::{Keyboard, Messenger, Outgoing};
use super::writing::{self, Composer};
use crate::providers::ProviderSelector;

const ANY_PROVIDER: &str = "أفضل محرك متاح";

pub struct RouterConfig {
    /// Maximum characters per outbound message.
    pub chunk_chars: usize,
    /// Characters of document text quoted in a summary.
    pub summary_chars: usize,
    /// Upper bound on the decompressed text of an uploaded DOCX.
    pub max_document_bytes: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            chunk_chars: chunk::DEFAULT_CHUNK_CHARS,
            summary_chars: 1000,
            max_document_bytes: 10 * 1024 * 1024,
        }
    }
}

pub struct Router {
    config: RouterConfig,
    messenger: Arc<dyn Messenger>,
    sessions: SessionStore,
    providers: ProviderSelector,
    composer: Arc<dyn Composer>,
}

impl Router {
    pub fn new(
        config: RouterConfig,
        messenger: Arc<dyn Messenger>,
        sessions: SessionStore,
        providers: ProviderSelector,
        composer: Arc<dyn Composer>,
    ) -> Self {
        Self {
            config,
            messenger,
            sessions,
            providers,
            composer,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn providers(&self) -> &ProviderSelector {
        &self.providers
    }

    pub async fn handle(&self, msg: Incoming) {
        if let Some(ref doc) = msg.document {
            info!("📎 Document from {} ({}): {:?}", msg.username, msg.user_id, doc.file_name);
            self.handle_document(&msg, doc).await;
            return;
        }

        let Some(text) = msg.text.as_deref() else {
            return;
        };
        let preview: String = text.chars().take(50).collect();
        info!("📨 Message from {} ({}): \"{}\"", msg.username, msg.user_id, preview);

        if matches!(command(text), Some("start" | "help")) {
            self.sessions.clear(msg.user_id);
            self.send(msg.chat_id, Outgoing::html(menu::WELCOME).keyboard(menu::main_menu()))
                .await;
            return;
        }

        if text == menu::BACK {
            self.sessions.clear(msg.user_id);
            self.send(msg.chat_id, Outgoing::html(menu::BACK_TO_MAIN).keyboard(menu::main_menu()))
                .await;
            return;
        }

        let mode = Mode::parse(&self.sessions.get(msg.user_id));
        if mode.is_pending() {
            // One-shot: the answer consumes the pending step
            self.sessions.clear(msg.user_id);
            self.resume(mode, &msg, text).await;
            return;
        }

        self.route_menu(&msg, text).await;
    }

    async fn route_menu(&self, msg: &Incoming, text: &str) {
        let chat_id = msg.chat_id;
        match text {
            menu::WRITING_SECTION => {
                self.send(chat_id, Outgoing::html(menu::WRITING_MENU_PROMPT).keyboard(menu::writing_menu()))
                    .await;
            }
            menu::SECURITY_SECTION => {
                self.sessions.set(msg.user_id, Mode::SecurityTarget.tag());
                self.send(chat_id, Outgoing::html(menu::SECURITY_PROMPT)).await;
            }
            menu::RESEARCH_SECTION => {
                self.send(chat_id, Outgoing::html(menu::RESEARCH_MENU_PROMPT).keyboard(menu::research_menu()))
                    .await;
            }
            menu::THINKING_SECTION | menu::AI_SECTION => {
                self.sessions.set(msg.user_id, Mode::Research(None).tag());
                let prompt = if text == menu::THINKING_SECTION {
                    menu::THINKING_PROMPT
                } else {
                    menu::AI_PROMPT
                };
                self.send(chat_id, Outgoing::html(prompt).keyboard(Keyboard::ForceReply))
                    .await;
            }
            _ => {
                if let Some(kind) = WritingKind::from_button(text) {
                    self.sessions.set(msg.user_id, Mode::Writing(kind).tag());
                    let ask = format!("✍️ <b>بدء تأليف {}</b>\n\nأدخل موضوع العمل:", kind.label());
                    self.send(chat_id, Outgoing::html(ask)).await;
                } else if let Some(engine) = menu::research_choice(text) {
                    self.sessions
                        .set(msg.user_id, Mode::Research(engine.map(str::to_string)).tag());
                    let ask = match engine {
                        Some(name) => format!("أدخل موضوع البحث (سيستخدم {name}):"),
                        None => "أدخل موضوع البحث:".to_string(),
                    };
                    self.send(chat_id, Outgoing::plain(ask).keyboard(Keyboard::ForceReply))
                        .await;
                } else {
                    debug!("No route for text from {}", msg.user_id);
                }
            }
        }
    }

    async fn resume(&self, mode: Mode, msg: &Incoming, text: &str) {
        match mode {
            Mode::Writing(kind) => self.write(msg, text, kind).await,
            Mode::Research(engine) => self.research(msg, text, engine.as_deref()).await,
            Mode::SecurityTarget => {
                info!("🔐 Security report for {}", text);
                self.send(msg.chat_id, Outgoing::html(security::report(text))).await;
            }
            Mode::Idle => {}
        }
    }

    async fn write(&self, msg: &Incoming, topic: &str, kind: WritingKind) {
        if let Err(e) = self.messenger.send_typing(msg.chat_id).await {
            debug!("{e}");
        }
        if let Err(e) = self.compose_and_deliver(msg.chat_id, topic, kind).await {
            warn!("Writing {} failed: {e}", kind.label());
            self.send(msg.chat_id, Outgoing::plain(format!("⚠️ حدث خطأ أثناء التأليف: {e}")))
                .await;
        }
    }

    async fn compose_and_deliver(&self, chat_id: i64, topic: &str, kind: WritingKind) -> Result<(), String> {
        let progress = format!(
            "⏳ <i>جاري تأليف {} حول '{}'... قد يستغرق هذا بعض الوقت</i>",
            kind.label(),
            escape_html(topic)
        );
        self.messenger.send(chat_id, Outgoing::html(progress)).await?;

        let content = self
            .composer
            .compose(&writing::academic_prompt(topic, kind))
            .await
            .map_err(|e| e.to_string())?;
        info!("✍️ Composed {} ({} chars)", kind.label(), content.chars().count());

        self.send_chunked(chat_id, &content).await?;

        let document = docx::build(kind.label(), &content)?;
        let caption = writing::document_caption(kind);
        self.messenger
            .send_document(chat_id, document, &writing::document_file_name(kind), Some(&caption))
            .await?;
        Ok(())
    }

    async fn research(&self, msg: &Incoming, query: &str, engine: Option<&str>) {
        if let Err(e) = self.messenger.send_typing(msg.chat_id).await {
            debug!("{e}");
        }
        if let Err(e) = self.search_and_deliver(msg, query, engine).await {
            self.send(
                msg.chat_id,
                Outgoing::plain(format!("⚠️ حدث خطأ أثناء البحث: {e}")).reply_to(msg.message_id),
            )
            .await;
        }
    }

    async fn search_and_deliver(&self, msg: &Incoming, query: &str, engine: Option<&str>) -> Result<(), String> {
        let waiting = format!("⏳ جاري البحث باستخدام {}...", engine.unwrap_or(ANY_PROVIDER));
        let wait_id = self
            .messenger
            .send(msg.chat_id, Outgoing::plain(waiting).reply_to(msg.message_id))
            .await?;

        let result = self.providers.search(query, engine).await;

        if let Err(e) = self.messenger.delete_message(msg.chat_id, wait_id).await {
            warn!("Could not remove wait message {wait_id}: {e}");
        }
        self.send_chunked(msg.chat_id, &result).await
    }

    async fn handle_document(&self, msg: &Incoming, doc: &DocumentRef) {
        let Some(kind) = DocumentKind::detect(doc.mime_type.as_deref(), doc.file_name.as_deref()) else {
            info!("Ignoring unsupported document type {:?}", doc.mime_type);
            return;
        };

        match self.summarize(kind, doc).await {
            Ok(summary) => {
                if let Err(e) = self.send_chunked(msg.chat_id, &summary).await {
                    warn!("Failed to deliver summary: {e}");
                }
            }
            Err(e) => {
                warn!("Document processing failed: {e}");
                self.send(msg.chat_id, Outgoing::plain(format!("⚠️ حدث خطأ أثناء معالجة الملف: {e}")))
                    .await;
            }
        }
    }

    async fn summarize(&self, kind: DocumentKind, doc: &DocumentRef) -> Result<String, String> {
        let data = self.messenger.download_file(&doc.file_id).await?;
        // PDF parsing is CPU-bound and may panic on hostile input
        let max_bytes = self.config.max_document_bytes;
        let text = tokio::task::spawn_blocking(move || documents::extract_text(kind, &data, max_bytes))
            .await
            .map_err(|e| format!("Extraction failed: {e}"))??;
        Ok(format!(
            "📄 ملخص الوثيقة:\n\n{}...",
            chunk::head(&text, self.config.summary_chars)
        ))
    }

    /// Send `text` as consecutive plain messages of at most `chunk_chars` characters.
    async fn send_chunked(&self, chat_id: i64, text: &str) -> Result<(), String> {
        for piece in split_text(text, self.config.chunk_chars) {
            self.messenger.send(chat_id, Outgoing::plain(piece)).await?;
        }
        Ok(())
    }

    /// Fire-and-forget send; the transport already logs failures.
    async fn send(&self, chat_id: i64, message: Outgoing) {
        let _ = self.messenger.send(chat_id, message).await;
    }
}

/// Bot command name without the slash or `@botname` suffix.
fn command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    Some(name.split('@').next().unwrap_or(name))
}
