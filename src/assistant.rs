use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ai::{self, AIResponse, GeminiClient, GenerativeBackend};
use crate::capture::ImagePayload;
use crate::config::AppConfig;
use crate::error::{AiError, UserNotice};
use crate::session::{HistoryId, HistoryItem, SessionStore};
use crate::subject::Subject;

/// Front door for the interactive layer: owns the session and the provider,
/// and turns every failure into a [`UserNotice`].
pub struct StudyAssistant {
    backend: Arc<dyn GenerativeBackend>,
    session: Mutex<SessionStore>,
    processing: AtomicBool,
}

/// Clears the processing flag on every exit path of a submission.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StudyAssistant {
    pub fn new(backend: Arc<dyn GenerativeBackend>, session: SessionStore) -> Self {
        Self {
            backend,
            session: Mutex::new(session),
            processing: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AiError> {
        let client = GeminiClient::from_config(config)?;
        Ok(Self::new(
            Arc::new(client),
            SessionStore::with_history_limit(config.max_history),
        ))
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    fn begin_processing(&self) -> Option<ProcessingGuard<'_>> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProcessingGuard(&self.processing))
    }

    /// Sends the pending input for the active subject.
    ///
    /// On success the answer becomes the active result and is added to
    /// history. On failure the session is left exactly as it was so the
    /// student can try again.
    pub async fn submit(&self) -> Result<AIResponse, UserNotice> {
        let (subject, input) = {
            let session = self.session.lock();
            (session.active_subject(), session.pending().clone())
        };

        if !input.has_content() {
            return Err(UserNotice::Input);
        }

        let _guard = self.begin_processing().ok_or_else(|| {
            log::warn!("Submission ignored: a request is already in flight");
            UserNotice::Busy
        })?;

        match ai::submit(
            self.backend.as_ref(),
            subject,
            &input.text,
            input.image.as_ref(),
        )
        .await
        {
            Ok(response) => {
                let image = input.image.as_ref().map(|img| img.data_url().to_string());
                let mut session = self.session.lock();
                let item = session.record_completion(subject, input.text, image, response.clone());
                log::info!("{} answer stored as history item {}", subject, item.id);
                Ok(response)
            }
            Err(e) => {
                log::error!("Study request failed ({:?}): {}", e.kind(), e);
                Err(UserNotice::from(&e))
            }
        }
    }

    pub fn select_subject(&self, subject: Subject) {
        self.session.lock().select_subject(subject);
    }

    pub fn select_history_item(&self, id: HistoryId) -> Option<AIResponse> {
        self.session.lock().select_history_item(id).cloned()
    }

    pub fn reset(&self) {
        self.session.lock().reset();
    }

    pub fn set_input_text(&self, text: impl Into<String>) {
        self.session.lock().set_input_text(text);
    }

    pub fn append_transcript(&self, transcript: &str) {
        self.session.lock().append_transcript(transcript);
    }

    /// Attaches a camera frame or uploaded file.
    pub fn attach_image_data_url(&self, data_url: &str) -> Result<(), AiError> {
        let image = ImagePayload::from_data_url(data_url)?;
        self.session.lock().attach_image(image);
        Ok(())
    }

    pub fn clear_image(&self) {
        self.session.lock().clear_image();
    }

    pub fn active_subject(&self) -> Subject {
        self.session.lock().active_subject()
    }

    pub fn active_result(&self) -> Option<AIResponse> {
        self.session.lock().active_result().cloned()
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.session.lock().history().iter().cloned().collect()
    }

    pub fn with_session<R>(&self, f: impl FnOnce(&SessionStore) -> R) -> R {
        f(&*self.session.lock())
    }
}
