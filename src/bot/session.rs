//! Per-user session modes.
//!
//! A mode is a free-form tag string. The router interprets the tags it knows
//! through [`Mode`]; anything else is stored verbatim and reads as idle.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::menu::WritingKind;

pub const DEFAULT_MODE: &str = "default";

const WRITING_PREFIX: &str = "writing_";
const RESEARCH_PREFIX: &str = "research_";
const RESEARCH_RANDOM: &str = "research_random";
const SECURITY_TARGET: &str = "security_target";

struct Entry {
    mode: String,
    written: Instant,
    /// Key into `Sessions::order`.
    seq: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<i64, Entry>,
    /// Write sequence -> user id, oldest first.
    order: BTreeMap<u64, i64>,
    next_seq: u64,
}

impl Sessions {
    fn remove(&mut self, user_id: i64) {
        if let Some(entry) = self.entries.remove(&user_id) {
            self.order.remove(&entry.seq);
        }
    }
}

/// Bounded user id -> mode map.
///
/// Writes past `capacity` evict the least recently written entry in
/// logarithmic time. With a TTL set, entries older than the TTL read as
/// [`DEFAULT_MODE`].
pub struct SessionStore {
    inner: Mutex<Sessions>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, user_id: i64, mode: impl Into<String>) {
        let mut sessions = self.lock();
        sessions.remove(user_id);

        let seq = sessions.next_seq;
        sessions.next_seq += 1;
        sessions.order.insert(seq, user_id);
        sessions.entries.insert(
            user_id,
            Entry {
                mode: mode.into(),
                written: Instant::now(),
                seq,
            },
        );

        while sessions.entries.len() > self.capacity {
            let Some((_, oldest)) = sessions.order.pop_first() else {
                break;
            };
            sessions.entries.remove(&oldest);
        }
    }

    pub fn get(&self, user_id: i64) -> String {
        let mut sessions = self.lock();
        let expired = match (sessions.entries.get(&user_id), self.ttl) {
            (None, _) => return DEFAULT_MODE.to_string(),
            (Some(entry), Some(ttl)) => entry.written.elapsed() >= ttl,
            (Some(_), None) => false,
        };
        if expired {
            sessions.remove(user_id);
            return DEFAULT_MODE.to_string();
        }
        sessions
            .entries
            .get(&user_id)
            .map(|e| e.mode.clone())
            .unwrap_or_else(|| DEFAULT_MODE.to_string())
    }

    pub fn clear(&self, user_id: i64) {
        self.lock().remove(user_id);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What the next text message from a user answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Idle,
    /// Awaiting a topic for this writing type.
    Writing(WritingKind),
    /// Awaiting a query; `None` means the next provider in rotation.
    Research(Option<String>),
    /// Awaiting an IP address or URL to "scan".
    SecurityTarget,
}

impl Mode {
    /// Interpret a stored tag. Unrecognised tags are idle.
    pub fn parse(tag: &str) -> Self {
        if tag == SECURITY_TARGET {
            return Mode::SecurityTarget;
        }
        if tag == RESEARCH_RANDOM {
            return Mode::Research(None);
        }
        if let Some(engine) = tag.strip_prefix(RESEARCH_PREFIX) {
            if !engine.is_empty() {
                return Mode::Research(Some(engine.to_string()));
            }
        }
        if let Some(label) = tag.strip_prefix(WRITING_PREFIX) {
            if let Some(kind) = WritingKind::from_label(label) {
                return Mode::Writing(kind);
            }
        }
        Mode::Idle
    }

    pub fn tag(&self) -> String {
        match self {
            Mode::Idle => DEFAULT_MODE.to_string(),
            Mode::Writing(kind) => format!("{WRITING_PREFIX}{}", kind.label()),
            Mode::Research(Some(engine)) => format!("{RESEARCH_PREFIX}{engine}"),
            Mode::Research(None) => RESEARCH_RANDOM.to_string(),
            Mode::SecurityTarget => SECURITY_TARGET.to_string(),
        }
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self, Mode::Idle)
    }
}
