// src/services/preview.rs

//! Link preview card resolution.
//!
//! Reads Open Graph (and Twitter card) metadata from the linked page and
//! downloads the preview image. Every failure degrades to absent fields and a
//! warning; resolution itself never fails.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::models::{Config, LinkPreview};
use crate::services::mime::{self, MimeProbe};
use crate::utils;
use crate::utils::http::Fetcher;

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("meta selector is valid"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

const TITLE_KEYS: &[&str] = &["og:title", "twitter:title"];
const DESCRIPTION_KEYS: &[&str] = &["og:description", "twitter:description", "description"];
const IMAGE_KEYS: &[&str] = &["og:image", "twitter:image"];

/// Card metadata found in a page, image reference unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl PageMetadata {
    /// Extract card metadata from an HTML document.
    ///
    /// Meta keys match `property` or `name` exactly, so `og:image:alt` never
    /// stands in for `og:image`.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = first_meta(&document, TITLE_KEYS).or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .and_then(|el| non_empty(&el.text().collect::<String>()))
        });

        Self {
            title,
            description: first_meta(&document, DESCRIPTION_KEYS),
            image: first_meta(&document, IMAGE_KEYS),
        }
    }
}

/// First non-empty content for the keys, in key priority order.
fn first_meta(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        document
            .select(&META_SELECTOR)
            .filter(|el| meta_key_matches(el, key))
            .find_map(|el| el.value().attr("content").and_then(non_empty))
    })
}

fn meta_key_matches(element: &ElementRef<'_>, key: &str) -> bool {
    let value = element.value();
    value.attr("property") == Some(key) || value.attr("name") == Some(key)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Resolves preview cards for entry links.
pub struct LinkPreviewResolver {
    fetcher: Arc<dyn Fetcher>,
    page_timeout: Duration,
    image_timeout: Duration,
    default_mime: String,
}

impl LinkPreviewResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &Config) -> Self {
        Self {
            fetcher,
            page_timeout: Duration::from_secs(config.http.page_timeout_secs),
            image_timeout: Duration::from_secs(config.http.image_timeout_secs),
            default_mime: config.preview.default_image_mime.clone(),
        }
    }

    /// Resolve the preview for `url`.
    pub async fn resolve(&self, url: &str) -> LinkPreview {
        let page = match self.fetcher.get(url, self.page_timeout).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                log::warn!(
                    "Could not fetch preview page {}: HTTP {}",
                    url,
                    page.status
                );
                return LinkPreview::default();
            }
            Err(e) => {
                log::warn!("Could not fetch preview page {}: {}", url, e);
                return LinkPreview::default();
            }
        };

        let metadata = PageMetadata::parse(&page.text());
        let mut preview = LinkPreview {
            title: metadata.title,
            description: metadata.description,
            ..LinkPreview::default()
        };

        let Some(image_ref) = metadata.image else {
            log::debug!("No preview image declared by {}", url);
            return preview;
        };

        let image_url = utils::resolve(&page.final_url, &image_ref);
        match self.fetch_image(&image_url).await {
            Some((bytes, mime_type)) => {
                preview.image_bytes = Some(bytes);
                preview.image_mime_type = Some(mime_type);
            }
            None => log::warn!("og:image URL not accessible: {}", image_url),
        }
        preview.image_url = Some(image_url);

        if let Some(fingerprint) = preview.fingerprint() {
            log::debug!("Preview image for {}: sha256 {}", url, fingerprint);
        }
        preview
    }

    /// Download image bytes and settle their MIME type.
    async fn fetch_image(&self, image_url: &str) -> Option<(Vec<u8>, String)> {
        let head_content_type = match self.fetcher.head(image_url, self.image_timeout).await {
            Ok(head) if head.is_success() => head.content_type,
            Ok(head) => {
                log::debug!("HEAD {} returned HTTP {}", image_url, head.status);
                None
            }
            Err(e) => {
                log::debug!("HEAD {} failed: {}", image_url, e);
                None
            }
        };

        let image = match self.fetcher.get(image_url, self.image_timeout).await {
            Ok(image) if image.is_success() && !image.body.is_empty() => image,
            Ok(image) => {
                log::debug!("GET {} returned HTTP {}", image_url, image.status);
                return None;
            }
            Err(e) => {
                log::debug!("GET {} failed: {}", image_url, e);
                return None;
            }
        };

        let probe = MimeProbe {
            head_content_type: head_content_type.as_deref(),
            get_content_type: image.content_type.as_deref(),
            bytes: &image.body,
        };
        let (mime_type, source) = mime::determine(&probe, &self.default_mime);
        log::debug!("Image type for {}: {} ({:?})", image_url, mime_type, source);

        Some((image.body, mime_type))
    }
}
