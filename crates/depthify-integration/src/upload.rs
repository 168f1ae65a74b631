//! Client-side upload job and the image check run before it leaves the client

use image::ImageFormat;

use crate::error::IntegrationError;
use crate::types::{ObjectType, UserId};

/// Largest upload the backend accepts
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Image formats the backend converts
const ACCEPTED_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

/// A file selected for conversion, with the form fields sent alongside it
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub project_name: String,
    pub object_type: ObjectType,
    pub owner_id: UserId,
}

impl UploadJob {
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        project_name: impl Into<String>,
        object_type: ObjectType,
        owner_id: UserId,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            project_name: project_name.into(),
            object_type,
            owner_id,
        }
    }

    /// Check the file is an accepted image. Returns its MIME type.
    pub fn validate(&self) -> Result<&'static str, IntegrationError> {
        validate_image(&self.bytes)
    }

    /// Project name to send; derived from the file name when left blank
    pub fn effective_project_name(&self) -> String {
        let trimmed = self.project_name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => self.file_name.clone(),
        }
    }
}

/// Sniff the content and accept only images the backend converts.
/// Returns the MIME type to declare in the multipart part.
pub fn validate_image(bytes: &[u8]) -> Result<&'static str, IntegrationError> {
    if bytes.is_empty() {
        return Err(IntegrationError::Validation("The selected file is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(IntegrationError::Validation("File is too large (max 16 MB)".into()));
    }
    match image::guess_format(bytes) {
        Ok(format) if ACCEPTED_FORMATS.contains(&format) => Ok(format.to_mime_type()),
        _ => Err(IntegrationError::Validation(
            "Please select an image file (PNG, JPEG, GIF, BMP or WebP)".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];
    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn job(bytes: Vec<u8>) -> UploadJob {
        UploadJob::new("apple.jpg", bytes, "", ObjectType::Fruit, UserId::new("1"))
    }

    #[test]
    fn test_jpeg_is_accepted() {
        let mut bytes = JPEG_HEADER.to_vec();
        bytes.resize(2 * 1024 * 1024, 0);
        assert_eq!(job(bytes).validate(), Ok("image/jpeg"));
    }

    #[test]
    fn test_png_is_accepted() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.extend_from_slice(&[0; 32]);
        assert_eq!(validate_image(&bytes), Ok("image/png"));
    }

    #[test]
    fn test_text_file_is_rejected() {
        let err = validate_image(b"name,value\napple,3\n").unwrap_err();
        assert!(matches!(err, IntegrationError::Validation(_)));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(matches!(validate_image(&[]), Err(IntegrationError::Validation(_))));
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let mut bytes = JPEG_HEADER.to_vec();
        bytes.resize(MAX_UPLOAD_BYTES + 1, 0);
        assert!(matches!(validate_image(&bytes), Err(IntegrationError::Validation(m)) if m.contains("16 MB")));
    }

    #[test]
    fn test_project_name_defaults_to_file_stem() {
        assert_eq!(job(vec![]).effective_project_name(), "apple");

        let mut named = job(vec![]);
        named.project_name = "  Green apple ".into();
        assert_eq!(named.effective_project_name(), "Green apple");
    }
}
