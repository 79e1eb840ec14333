//! Menu-driven bot: session modes, routing, flows and the Telegram transport.

pub mod chunk;
pub mod documents;
pub mod docx;
pub mod menu;
pub mod message;
pub mod router;
pub mod security;
pub mod session;
pub mod telegram;
pub mod writing;


pub use message::{DocumentRef, Incoming};
pub use router::{Router, RouterConfig};
pub use session::{Mode, SessionStore};
pub use telegram::{Keyboard, Messenger, Outgoing, TelegramClient};
pub use writing::Composer;
