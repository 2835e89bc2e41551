//! Link preview metadata.

use sha2::{Digest, Sha256};

/// Best-effort metadata scraped from an entry's target page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
    /// Always set when `image_bytes` is set
    pub image_mime_type: Option<String>,
    /// Absolute image reference, kept even when the download failed
    pub image_url: Option<String>,
}

impl LinkPreview {
    /// Whether a link card can be built from this preview.
    pub fn has_card(&self) -> bool {
        self.title.is_some() || self.description.is_some()
    }

    /// Whether downloaded image data is available for upload.
    pub fn has_image(&self) -> bool {
        self.image_bytes.is_some() && self.image_mime_type.is_some()
    }

    /// Hex SHA-256 of the image content.
    pub fn fingerprint(&self) -> Option<String> {
        self.image_bytes
            .as_ref()
            .map(|bytes| hex::encode(Sha256::digest(bytes)))
    }
}
