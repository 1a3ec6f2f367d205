pub mod action;
pub mod backend;
pub mod conversation;
pub mod error;
pub mod event;
pub mod message;
pub mod notice;

pub use action::Action;
pub use backend::*;
pub use conversation::{Conversation, ConversationFile};
pub use error::*;
pub use event::{ArcEventTx, Event, EventTx};
pub use message::{Message, Speaker};
pub use notice::*;
