use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    #[default]
    Math,
    EconLaw,
    History,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::EconLaw, Subject::History];

    /// Label shown on the subject selector and interpolated into the system instruction.
    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Toán Học",
            Subject::EconLaw => "GDKTPL",
            Subject::History => "Lịch Sử",
        }
    }

    /// Title of the card that renders the `specialized` field.
    pub fn specialized_title(self) -> &'static str {
        match self {
            Subject::Math => "Casio 580 (Tính Toán)",
            Subject::EconLaw => "Văn Bản Luật (Trích Dẫn)",
            Subject::History => "Tư Liệu (Lịch Sử)",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
