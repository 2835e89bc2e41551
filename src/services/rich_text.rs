// src/services/rich_text.rs

//! Hashtag-aware segmentation of post text.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Segment;

static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("hashtag pattern is a valid regex"));

/// Split annotated text into plain and hashtag segments, in order.
///
/// No segment is empty.
pub fn build(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for tag in HASHTAG_PATTERN.find_iter(text) {
        if tag.start() > last {
            segments.push(Segment::plain(&text[last..tag.start()]));
        }
        segments.push(Segment::hashtag(tag.as_str()));
        last = tag.end();
    }
    if last < text.len() {
        segments.push(Segment::plain(&text[last..]));
    }

    segments
}

/// Styling attached to a byte range of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetFeature {
    Link { uri: String },
    Tag { tag: String },
}

/// A styled byte range, offsets in UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub byte_start: usize,
    pub byte_end: usize,
    pub feature: FacetFeature,
}

/// Plain text plus the facets that style it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedText {
    pub text: String,
    pub facets: Vec<Facet>,
}

/// Concatenate segments and record a facet for each styled one.
pub fn render(segments: &[Segment]) -> RenderedText {
    let mut rendered = RenderedText::default();

    for segment in segments {
        let byte_start = rendered.text.len();
        rendered.text.push_str(segment.text());
        let byte_end = rendered.text.len();

        let feature = match segment {
            Segment::Plain { .. } => None,
            Segment::Hashtag { tag, .. } => Some(FacetFeature::Tag { tag: tag.clone() }),
            Segment::Link { target, .. } => Some(FacetFeature::Link {
                uri: target.clone(),
            }),
        };
        if let Some(feature) = feature {
            rendered.facets.push(Facet {
                byte_start,
                byte_end,
                feature,
            });
        }
    }

    rendered
}
