pub mod manager;

pub use manager::{HistoryId, HistoryItem, SessionStore, IMAGE_ONLY_LABEL};
