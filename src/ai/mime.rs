use base64::Engine as _;

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Base64 image data plus the MIME type it will be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Accept either a `data:<mime>;base64,<data>` URI or bare base64.
    ///
    /// Bare input is assumed to be JPEG.
    pub fn from_encoded(encoded: &str) -> Self {
        let encoded = encoded.trim();

        if let Some((mime, data)) = encoded
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
        {
            // Drop parameters such as `;charset=...`.
            let mime = mime.split(';').next().unwrap_or_default().trim();
            if !mime.is_empty() {
                return Self {
                    mime_type: mime.to_ascii_lowercase(),
                    data: data.to_string(),
                };
            }
        }

        Self {
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
            data: encoded.to_string(),
        }
    }
}

/// Encode raw image bytes as a data URI with a sniffed MIME type.
pub fn encode_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        detect_image_mime(bytes),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                DEFAULT_IMAGE_MIME
            );
            DEFAULT_IMAGE_MIME
        }
    }
}
