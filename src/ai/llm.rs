use serde_json::json;

use super::gemini::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part};
use super::{AIResponse, GenerativeBackend};
use crate::capture::photo::JPEG_MIME;
use crate::capture::ImagePayload;
use crate::error::AiError;
use crate::subject::Subject;

/// Sent in place of the question when the student only attached a photo.
pub const IMAGE_ONLY_PROMPT: &str = "Phân tích nội dung trong ảnh";

const RESPONSE_FIELDS: [&str; 5] = ["socratic", "notebookLM", "perplexity", "specialized", "diagram"];

fn specialized_guidance(subject: Subject) -> &'static str {
    match subject {
        Subject::Math => {
            "Trình bày như máy tính Casio 580 (công thức, kết quả số, phím bấm)."
        }
        Subject::EconLaw => "Trích dẫn văn bản pháp luật chính xác.",
        Subject::History => "Trích dẫn tư liệu lịch sử, nguồn chính thống.",
    }
}

pub fn build_system_instruction(subject: Subject) -> String {
    let mut prompt = String::from(
        "Bạn là một \"Copilot\" điều phối hệ thống AI Cộng sinh dành cho học sinh Việt Nam \
         theo CTGDPT 2018.\n",
    );

    prompt.push_str(&format!(
        "Nhiệm vụ của bạn là phân tích yêu cầu của người dùng về môn {} và trả về kết quả \
         dưới dạng JSON có cấu trúc 5 phần:\n",
        subject.label()
    ));
    prompt.push_str("1. socratic: Giải thích từng bước, gợi mở tư duy (phong cách Socratic).\n");
    prompt.push_str("2. notebookLM: Trình bày cơ sở lý thuyết, định nghĩa, định lý cốt lõi.\n");
    prompt.push_str(
        "3. perplexity: Phân tích thực tiễn, mở rộng kiến thức, liên hệ bài toán nâng cao.\n",
    );
    prompt.push_str("4. specialized: ");
    prompt.push_str(specialized_guidance(subject));
    prompt.push('\n');
    prompt.push_str(
        "5. diagram: Một sơ đồ Mermaid.js hoặc cấu trúc text rõ ràng để hệ thống hóa kiến thức.\n\n",
    );
    prompt.push_str("Phản hồi PHẢI là JSON nguyên bản, không kèm markdown code blocks.");

    prompt
}

/// Structured-output constraint: an object with the five answer fields, all required strings.
pub fn response_schema() -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = RESPONSE_FIELDS
        .iter()
        .map(|field| (field.to_string(), json!({ "type": "STRING" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": RESPONSE_FIELDS,
    })
}

/// Image part (if any) first, then the text part.
pub fn build_request(
    subject: Subject,
    prompt_text: &str,
    image: Option<&ImagePayload>,
) -> Result<GenerateContentRequest, AiError> {
    let prompt_text = prompt_text.trim();
    let text = match (prompt_text.is_empty(), image) {
        (true, None) => return Err(AiError::EmptyInput),
        (true, Some(_)) => IMAGE_ONLY_PROMPT,
        (false, _) => prompt_text,
    };

    let mut parts = Vec::with_capacity(2);
    if let Some(img) = image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: JPEG_MIME.to_string(),
                data: img.to_base64(),
            },
        });
    }
    parts.push(Part::Text {
        text: text.to_string(),
    });

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: build_system_instruction(subject),
            }],
        },
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    })
}

/// Strict decode: all five fields must be present strings, nothing else is accepted.
///
/// Only an absent or zero-length payload is empty; whitespace goes to the parser.
pub fn decode_response(raw: Option<&str>) -> Result<AIResponse, AiError> {
    let raw = match raw {
        Some(text) if !text.is_empty() => text,
        _ => return Err(AiError::EmptyResponse),
    };

    serde_json::from_str::<AIResponse>(raw).map_err(|e| {
        log::error!("Failed to parse AI response: {}. Raw text: {}", e, raw);
        AiError::MalformedResponse {
            reason: e.to_string(),
        }
    })
}

/// One study request: build, send, decode. Does not touch session state.
pub async fn submit(
    backend: &dyn GenerativeBackend,
    subject: Subject,
    prompt_text: &str,
    image: Option<&ImagePayload>,
) -> Result<AIResponse, AiError> {
    let request = build_request(subject, prompt_text, image)?;

    log::info!(
        "Sending {} request to {} (image: {})",
        subject,
        backend.model(),
        image.is_some()
    );

    let raw = backend.generate(&request).await?;
    let response = decode_response(raw.as_deref())?;

    log::debug!("Decoded {} response from {}", subject, backend.model());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(part: &Part) -> &str {
        match part {
            Part::Text { text } => text,
            Part::InlineData { .. } => panic!("expected a text part"),
        }
    }

    #[test]
    fn instruction_names_subject_and_its_specialized_style() {
        let math = build_system_instruction(Subject::Math);
        assert!(math.contains("môn Toán Học"));
        assert!(math.contains("Casio 580"));
        assert!(!math.contains("văn bản pháp luật"));

        let law = build_system_instruction(Subject::EconLaw);
        assert!(law.contains("môn GDKTPL"));
        assert!(law.contains("văn bản pháp luật"));

        let history = build_system_instruction(Subject::History);
        assert!(history.contains("nguồn chính thống"));
        for field in RESPONSE_FIELDS {
            assert!(history.contains(field), "instruction should mention {field}");
        }
    }

    #[test]
    fn schema_requires_all_five_string_fields() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(RESPONSE_FIELDS));
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 5);
        assert!(props.values().all(|p| p["type"] == "STRING"));
    }

    #[test]
    fn blank_text_with_image_uses_fallback_prompt() {
        let image = ImagePayload::from_bytes(crate::capture::photo::tests::encode(
            image::ImageFormat::Jpeg,
        ))
        .unwrap();

        let request = build_request(Subject::History, "  ", Some(&image)).unwrap();
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], Part::InlineData { inline_data } if inline_data.mime_type == "image/jpeg"));
        assert_eq!(text_of(&parts[1]), IMAGE_ONLY_PROMPT);
    }

    #[test]
    fn text_only_request_has_single_part() {
        let request = build_request(Subject::Math, "giải phương trình", None).unwrap();
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 1);
        assert_eq!(text_of(&parts[0]), "giải phương trình");
        assert_eq!(
            text_of(&request.system_instruction.parts[0]),
            build_system_instruction(Subject::Math)
        );
    }

    #[test]
    fn empty_text_without_image_is_rejected() {
        assert!(matches!(
            build_request(Subject::Math, "", None),
            Err(AiError::EmptyInput)
        ));
    }

    #[test]
    fn decode_accepts_exact_shape() {
        let raw = r#"{"socratic":"a","notebookLM":"b","perplexity":"c","specialized":"d","diagram":"e"}"#;
        let response = decode_response(Some(raw)).unwrap();
        assert_eq!(response.notebook_lm, "b");
        assert_eq!(response.diagram, "e");
    }

    #[test]
    fn decode_rejects_missing_fields_instead_of_defaulting() {
        let err = decode_response(Some(r#"{"socratic":"x"}"#)).unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse { ref reason } if reason.contains("missing field")));
        assert_eq!(err.to_string(), "malformed response");
    }

    #[test]
    fn decode_rejects_wrong_types_extra_fields_and_fenced_json() {
        let wrong_type = r#"{"socratic":1,"notebookLM":"b","perplexity":"c","specialized":"d","diagram":"e"}"#;
        let extra = r#"{"socratic":"a","notebookLM":"b","perplexity":"c","specialized":"d","diagram":"e","extra":"f"}"#;
        let fenced = "```json\n{\"socratic\":\"a\"}\n```";
        for raw in [wrong_type, extra, fenced] {
            assert!(matches!(
                decode_response(Some(raw)),
                Err(AiError::MalformedResponse { .. })
            ));
        }
    }

    #[test]
    fn decode_treats_missing_or_zero_length_text_as_empty() {
        assert!(matches!(decode_response(None), Err(AiError::EmptyResponse)));
        assert!(matches!(decode_response(Some("")), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn decode_sends_whitespace_payload_to_the_parser() {
        assert!(matches!(
            decode_response(Some("  \n")),
            Err(AiError::MalformedResponse { .. })
        ));
    }
}
