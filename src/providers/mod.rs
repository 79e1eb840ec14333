//! Upstream AI text providers and the rotating selector in front of them.

pub mod gemini;
pub mod hackergpt;
pub mod openai;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

pub use gemini::GeminiClient;
pub use hackergpt::HackerGptClient;
pub use openai::OpenAiClient;

/// One upstream service that can answer a free-form query.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Tag used in session modes and explicit selection (e.g. `openai`).
    fn name(&self) -> &'static str;

    /// Human-facing label used in replies (e.g. `OpenAI`).
    fn label(&self) -> &'static str;

    async fn answer(&self, query: &str) -> Result<String, ProviderError>;
}

#[derive(Debug)]
pub enum ProviderError {
    /// No API key configured for this provider.
    MissingKey(&'static str),
    Http(String),
    /// Upstream answered with a status it does not accept, body ignored.
    Status(u16),
    /// Upstream answered with a non-success status.
    Api(String),
    Parse(String),
    Empty,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::MissingKey(var) => write!(f, "{var} is not configured"),
            ProviderError::Http(e) => write!(f, "HTTP error: {e}"),
            ProviderError::Status(code) => write!(f, "HTTP error {code}"),
            ProviderError::Api(e) => write!(f, "API error: {e}"),
            ProviderError::Parse(e) => write!(f, "Parse error: {e}"),
            ProviderError::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for ProviderError {}

pub(crate) fn http_client(timeout_secs: Option<u64>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    builder.build()
}

/// Ordered provider list with a rotation cursor.
///
/// Unqualified searches advance the cursor first, so the provider after the
/// current one answers. The cursor is atomic: concurrent searches each get a
/// distinct step, though which user lands on which provider is unspecified.
pub struct ProviderSelector {
    providers: Vec<Arc<dyn Provider>>,
    cursor: AtomicUsize,
}

impl ProviderSelector {
    /// Returns `None` for an empty list, which has nothing to rotate over.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Option<Self> {
        if providers.is_empty() {
            return None;
        }
        Some(Self {
            providers,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn current(&self) -> &dyn Provider {
        let idx = self.cursor.load(Ordering::Acquire) % self.providers.len();
        self.providers[idx].as_ref()
    }

    /// Advance the cursor and return the provider it now points at.
    pub fn rotate(&self) -> &dyn Provider {
        let len = self.providers.len();
        let prev = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(prev) | Err(prev) => prev,
        };
        self.providers[(prev + 1) % len].as_ref()
    }

    pub fn find(&self, name: &str) -> Option<&dyn Provider> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Answer `query` with the named provider, or the next one in rotation.
    ///
    /// Never fails: upstream errors come back as reply text naming the provider.
    pub async fn search(&self, query: &str, provider: Option<&str>) -> String {
        let provider = match provider {
            Some(name) => match self.find(name) {
                Some(p) => p,
                None => {
                    warn!("Search requested unknown provider {name}");
                    return failure_text(name, "unknown provider");
                }
            },
            None => self.rotate(),
        };

        let preview: String = query.chars().take(50).collect();
        info!("🔍 Searching with {}: \"{}\"", provider.name(), preview);

        match provider.answer(query).await {
            Ok(answer) => {
                info!("✅ {} answered ({} chars)", provider.name(), answer.chars().count());
                format!("🔍 {} يقول:\n\n{}", provider.label(), answer)
            }
            Err(e) => {
                warn!("{} failed: {e}", provider.name());
                failure_text(provider.name(), &e.to_string())
            }
        }
    }
}

fn failure_text(name: &str, error: &str) -> String {
    format!("⚠️ فشل البحث باستخدام {name}: {error}")
}
