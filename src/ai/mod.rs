pub mod gemini;
pub mod llm;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::subject::Subject;

pub use gemini::{GeminiClient, GenerateContentRequest};
pub use llm::{build_system_instruction, decode_response, response_schema, submit, IMAGE_ONLY_PROMPT};

/// The five-part answer. Every field is required; see [`decode_response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AIResponse {
    /// Step-by-step guided explanation.
    pub socratic: String,
    /// Theoretical foundation: definitions, theorems.
    #[serde(rename = "notebookLM")]
    pub notebook_lm: String,
    /// Applied and extended analysis.
    pub perplexity: String,
    /// Calculator walkthrough, legal citation or historical source, by subject.
    pub specialized: String,
    /// Mermaid or plain-text outline of the material.
    pub diagram: String,
}

impl AIResponse {
    /// `(title, content)` pairs in the order the result cards are laid out.
    pub fn sections(&self, subject: Subject) -> [(&'static str, &str); 5] {
        [
            ("Socratic (Từng Bước)", self.socratic.as_str()),
            ("NotebookLM (Lý Thuyết)", self.notebook_lm.as_str()),
            ("Perplexity (Mở Rộng)", self.perplexity.as_str()),
            (subject.specialized_title(), self.specialized.as_str()),
            ("Sơ Đồ Tư Duy", self.diagram.as_str()),
        ]
    }
}

/// Anything that can run a `generateContent` call and hand back its raw text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    fn model(&self) -> &str;

    /// `Ok(None)` means the call succeeded but carried no text.
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Option<String>, AiError>;
}
