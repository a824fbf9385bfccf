use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::Cursor;

use crate::error::AiError;

pub const JPEG_MIME: &str = "image/jpeg";

/// A question photo, normalized to JPEG.
///
/// Camera frames usually arrive as JPEG already; uploads may be PNG (or any
/// other format the `image` crate reads) and are re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    jpeg: Vec<u8>,
    data_url: String,
}

impl ImagePayload {
    /// Accepts `data:<mime>;base64,<payload>` as produced by a canvas or file reader.
    pub fn from_data_url(data_url: &str) -> Result<Self, AiError> {
        let rest = data_url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| AiError::InvalidImage("not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AiError::InvalidImage("data URL has no payload".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(AiError::InvalidImage(
                "data URL is not base64-encoded".to_string(),
            ));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| AiError::InvalidImage(format!("bad base64: {}", e)))?;

        let image = Self::from_bytes(bytes)?;
        if header == format!("{};base64", JPEG_MIME) {
            // Keep the caller's string so history shows exactly what was attached
            return Ok(Self {
                jpeg: image.jpeg,
                data_url: data_url.trim().to_string(),
            });
        }
        Ok(image)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AiError> {
        let format = image::guess_format(&bytes)
            .map_err(|e| AiError::InvalidImage(format!("unrecognized image: {}", e)))?;

        let jpeg = if format == image::ImageFormat::Jpeg {
            bytes
        } else {
            log::debug!("Transcoding {:?} image to JPEG", format);
            let decoded = image::load_from_memory_with_format(&bytes, format)
                .map_err(|e| AiError::InvalidImage(format!("failed to decode image: {}", e)))?;

            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
            let mut buffer = Cursor::new(Vec::new());
            rgb.write_to(&mut buffer, image::ImageFormat::Jpeg)
                .map_err(|e| AiError::InvalidImage(format!("failed to encode image: {}", e)))?;
            buffer.into_inner()
        };

        let data_url = format!("data:{};base64,{}", JPEG_MIME, STANDARD.encode(&jpeg));
        Ok(Self { jpeg, data_url })
    }

    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.jpeg)
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn encode(format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn jpeg_data_url_is_kept_verbatim() {
        let jpeg = encode(image::ImageFormat::Jpeg);
        let url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg));

        let payload = ImagePayload::from_data_url(&url).unwrap();
        assert_eq!(payload.jpeg_bytes(), jpeg.as_slice());
        assert_eq!(payload.data_url(), url);
        assert_eq!(payload.to_base64(), STANDARD.encode(&jpeg));
    }

    #[test]
    fn png_upload_is_transcoded_to_jpeg() {
        let png = encode(image::ImageFormat::Png);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let payload = ImagePayload::from_data_url(&url).unwrap();
        assert_eq!(&payload.jpeg_bytes()[..2], &[0xFF, 0xD8]);
        assert!(payload.data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn rejects_non_images_and_malformed_urls() {
        assert!(matches!(
            ImagePayload::from_data_url("hello"),
            Err(AiError::InvalidImage(_))
        ));
        assert!(matches!(
            ImagePayload::from_data_url("data:image/png,rawtext"),
            Err(AiError::InvalidImage(_))
        ));
        let garbage = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"not an image"));
        assert!(matches!(
            ImagePayload::from_data_url(&garbage),
            Err(AiError::InvalidImage(_))
        ));
    }
}
