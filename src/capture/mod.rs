pub mod photo;

pub use photo::ImagePayload;

/// Input the student has entered but not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInput {
    pub text: String,
    pub image: Option<ImagePayload>,
}

impl PendingInput {
    /// Speech results are appended to whatever was already typed.
    pub fn append_transcript(&mut self, transcript: &str) {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return;
        }
        if self.text.is_empty() {
            self.text.push_str(transcript);
        } else {
            self.text.push(' ');
            self.text.push_str(transcript);
        }
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || self.image.is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.image = None;
    }
}
