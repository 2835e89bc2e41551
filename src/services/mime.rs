// src/services/mime.rs

//! Image content type detection for preview thumbnails.
//!
//! Detection is a chain of independent steps tried in order; the first step
//! that yields an image type wins, and the configured default applies when
//! none does.

/// Magic bytes identifying an image format.
#[derive(Debug, Clone, Copy)]
pub struct ImageSignature {
    pub offset: usize,
    pub magic: &'static [u8],
    pub mime: &'static str,
}

/// Known signatures, in priority order.
pub const IMAGE_SIGNATURES: &[ImageSignature] = &[
    ImageSignature {
        offset: 0,
        magic: b"\x89PNG\r\n\x1a\n",
        mime: "image/png",
    },
    ImageSignature {
        offset: 0,
        magic: b"\xff\xd8\xff",
        mime: "image/jpeg",
    },
    ImageSignature {
        offset: 0,
        magic: b"GIF87a",
        mime: "image/gif",
    },
    ImageSignature {
        offset: 0,
        magic: b"GIF89a",
        mime: "image/gif",
    },
    // RIFF container with a WEBP form type at byte 8
    ImageSignature {
        offset: 8,
        magic: b"WEBP",
        mime: "image/webp",
    },
];

/// What is known about a downloaded image.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeProbe<'a> {
    /// Content-Type from the HEAD probe, if it succeeded
    pub head_content_type: Option<&'a str>,
    /// Content-Type from the GET response
    pub get_content_type: Option<&'a str>,
    /// Downloaded bytes
    pub bytes: &'a [u8],
}

/// Which step produced the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeSource {
    HeadHeader,
    ResponseHeader,
    Signature,
    Default,
}

type MimeStep = fn(&MimeProbe<'_>) -> Option<String>;

const STEPS: &[(MimeSource, MimeStep)] = &[
    (MimeSource::HeadHeader, |p| p.head_content_type.and_then(declared_image_type)),
    (MimeSource::ResponseHeader, |p| p.get_content_type.and_then(declared_image_type)),
    (MimeSource::Signature, |p| sniff(p.bytes).map(String::from)),
];

/// Determine the MIME type, falling back to `default` when nothing matches.
pub fn determine(probe: &MimeProbe<'_>, default: &str) -> (String, MimeSource) {
    STEPS
        .iter()
        .find_map(|(source, step)| step(probe).map(|mime| (mime, *source)))
        .unwrap_or_else(|| (default.to_string(), MimeSource::Default))
}

/// Normalized declared type, only when it names an image family.
pub fn declared_image_type(content_type: &str) -> Option<String> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    (essence.starts_with("image/") && essence.len() > "image/".len()).then_some(essence)
}

/// Match leading bytes against the known signatures.
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    IMAGE_SIGNATURES
        .iter()
        .find(|sig| {
            let is_riff = sig.offset == 0 || bytes.starts_with(b"RIFF");
            is_riff
                && bytes
                    .get(sig.offset..sig.offset + sig.magic.len())
                    .is_some_and(|window| window == sig.magic)
        })
        .map(|sig| sig.mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    #[test]
    fn test_sniff_signatures() {
        assert_eq!(sniff(PNG), Some("image/png"));
        assert_eq!(sniff(b"\xff\xd8\xff\xe0\0\x10JFIF"), Some("image/jpeg"));
        assert_eq!(sniff(b"GIF89a\x01\0"), Some("image/gif"));
        assert_eq!(sniff(b"GIF87a\x01\0"), Some("image/gif"));
        assert_eq!(sniff(WEBP), Some("image/webp"));
        assert_eq!(sniff(b"<html>"), None);
        assert_eq!(sniff(b""), None);
    }

    #[test]
    fn test_sniff_requires_riff_for_webp() {
        assert_eq!(sniff(b"XXXX\0\0\0\0WEBP"), None);
    }

    #[test]
    fn test_declared_image_type() {
        assert_eq!(
            declared_image_type("image/PNG; charset=binary"),
            Some("image/png".to_string())
        );
        assert_eq!(declared_image_type("text/html; charset=utf-8"), None);
        assert_eq!(declared_image_type("image/"), None);
    }

    #[test]
    fn test_head_header_wins() {
        let probe = MimeProbe {
            head_content_type: Some("image/webp"),
            get_content_type: Some("image/png"),
            bytes: PNG,
        };
        assert_eq!(
            determine(&probe, "image/jpeg"),
            ("image/webp".to_string(), MimeSource::HeadHeader)
        );
    }

    #[test]
    fn test_non_image_header_falls_through_to_signature() {
        let probe = MimeProbe {
            head_content_type: None,
            get_content_type: Some("application/octet-stream"),
            bytes: PNG,
        };
        assert_eq!(
            determine(&probe, "image/jpeg"),
            ("image/png".to_string(), MimeSource::Signature)
        );
    }

    #[test]
    fn test_default_when_unknown() {
        let probe = MimeProbe {
            bytes: b"not an image",
            ..MimeProbe::default()
        };
        assert_eq!(
            determine(&probe, "image/jpeg"),
            ("image/jpeg".to_string(), MimeSource::Default)
        );
    }
}
