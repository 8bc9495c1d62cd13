mod message;

pub use message::{InboxRow, Message, NewMessage, UnreadSnapshot};
