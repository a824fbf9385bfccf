use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::ai::AIResponse;
use crate::capture::{ImagePayload, PendingInput};
use crate::subject::Subject;

pub type HistoryId = u64;

/// One completed request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: HistoryId,
    pub subject: Subject,
    pub timestamp: DateTime<Utc>,
    pub input: String,
    /// Data URL of the attached photo.
    pub image: Option<String>,
    pub response: AIResponse,
}

/// Shown for photo-only questions, which have no typed input.
pub const IMAGE_ONLY_LABEL: &str = "Phân tích ảnh";

impl HistoryItem {
    /// Text for the history list entry.
    pub fn label(&self) -> &str {
        if self.input.trim().is_empty() {
            IMAGE_ONLY_LABEL
        } else {
            &self.input
        }
    }
}

/// In-memory study session: the selected subject, what is on screen, what
/// has been typed, and every answer received so far (newest first).
#[derive(Debug, Default)]
pub struct SessionStore {
    active_subject: Subject,
    active_result: Option<AIResponse>,
    history: VecDeque<HistoryItem>,
    pending: PendingInput,
    next_id: HistoryId,
    history_limit: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps history at `limit` items, dropping the oldest first.
    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            history_limit: limit,
            ..Self::default()
        }
    }

    pub fn active_subject(&self) -> Subject {
        self.active_subject
    }

    pub fn active_result(&self) -> Option<&AIResponse> {
        self.active_result.as_ref()
    }

    /// Newest first.
    pub fn history(&self) -> &VecDeque<HistoryItem> {
        &self.history
    }

    pub fn history_item(&self, id: HistoryId) -> Option<&HistoryItem> {
        self.history.iter().find(|item| item.id == id)
    }

    pub fn pending(&self) -> &PendingInput {
        &self.pending
    }

    /// Switching subject abandons whatever was in progress.
    pub fn select_subject(&mut self, subject: Subject) {
        self.active_subject = subject;
        self.reset();
    }

    pub fn record_completion(
        &mut self,
        subject: Subject,
        input: String,
        image: Option<String>,
        response: AIResponse,
    ) -> &HistoryItem {
        self.next_id += 1;
        let item = HistoryItem {
            id: self.next_id,
            subject,
            timestamp: Utc::now(),
            input,
            image,
            response: response.clone(),
        };

        self.history.push_front(item);
        if let Some(limit) = self.history_limit {
            self.history.truncate(limit.max(1));
        }
        self.active_result = Some(response);

        log::debug!(
            "Recorded history item {} ({} items)",
            self.next_id,
            self.history.len()
        );
        &self.history[0]
    }

    /// Re-displays a past answer. Unknown ids leave the session as it was.
    pub fn select_history_item(&mut self, id: HistoryId) -> Option<&AIResponse> {
        let response = self.history_item(id)?.response.clone();
        self.active_result = Some(response);
        self.active_result.as_ref()
    }

    pub fn reset(&mut self) {
        self.active_result = None;
        self.pending.clear();
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.pending.text = text.into();
    }

    pub fn append_transcript(&mut self, transcript: &str) {
        self.pending.append_transcript(transcript);
    }

    pub fn attach_image(&mut self, image: ImagePayload) {
        self.pending.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.pending.image = None;
    }
}
