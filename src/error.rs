use thiserror::Error;

/// The only failure text ever shown to the student.
pub const GENERIC_FAILURE_NOTICE: &str = "Có lỗi xảy ra khi xử lý.";

/// Errors raised while building, sending or decoding a study request.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("nothing to submit: enter a question or attach an image")]
    EmptyInput,

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Gemini request failed: {0}")]
    Transport(String),

    #[error("Gemini API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("empty response")]
    EmptyResponse,

    /// `reason` is kept for the log line; the display text stays fixed.
    #[error("malformed response")]
    MalformedResponse { reason: String },
}

/// Coarse grouping of [`AiError`], matching how failures are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Provider,
    Transport,
}

impl AiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::EmptyInput | AiError::InvalidImage(_) => ErrorKind::Input,
            AiError::EmptyResponse | AiError::MalformedResponse { .. } => ErrorKind::Provider,
            AiError::MissingApiKey | AiError::Transport(_) | AiError::Status { .. } => {
                ErrorKind::Transport
            }
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Transport(e.to_string())
    }
}

/// What the interactive layer gets back from a failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNotice {
    #[error("Nhập câu hỏi hoặc chọn ảnh trước khi gửi.")]
    Input,

    #[error("Đang xử lý yêu cầu trước, vui lòng đợi.")]
    Busy,

    #[error("{}", GENERIC_FAILURE_NOTICE)]
    Failed,
}

impl From<&AiError> for UserNotice {
    fn from(e: &AiError) -> Self {
        match e.kind() {
            ErrorKind::Input => UserNotice::Input,
            ErrorKind::Provider | ErrorKind::Transport => UserNotice::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_hides_reason() {
        let err = AiError::MalformedResponse {
            reason: "missing field `diagram`".to_string(),
        };
        assert_eq!(err.to_string(), "malformed response");
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[test]
    fn provider_and_transport_collapse_to_one_notice() {
        let errors = [
            AiError::EmptyResponse,
            AiError::MalformedResponse { reason: String::new() },
            AiError::MissingApiKey,
            AiError::Transport("connection refused".to_string()),
            AiError::Status { status: 503, body: "overloaded".to_string() },
        ];
        for err in &errors {
            let notice = UserNotice::from(err);
            assert_eq!(notice, UserNotice::Failed);
            assert_eq!(notice.to_string(), GENERIC_FAILURE_NOTICE);
        }
    }

    #[test]
    fn empty_input_is_an_input_notice() {
        assert_eq!(UserNotice::from(&AiError::EmptyInput), UserNotice::Input);
    }
}
