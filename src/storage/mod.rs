pub mod file;
pub mod store;

pub use file::{export_conversation, import_conversation, safe_file_stem};
pub use store::{ConversationStore, ImportMode};
