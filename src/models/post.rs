//! Composed post and styled segment structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::LinkPreview;

/// Supported publishing platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Short-form plain text with an inline trailing link
    Twitter,
    /// Rich text with facets and an external link card
    Bluesky,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Bluesky => "Bluesky",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of a styled text segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Hashtag,
    Link,
}

/// A styled sub-range of post text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Plain { text: String },
    /// `text` keeps the leading `#`, `tag` does not
    Hashtag { text: String, tag: String },
    Link { text: String, target: String },
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn hashtag(text: impl Into<String>) -> Self {
        let text = text.into();
        let tag = text.trim_start_matches('#').to_string();
        Self::Hashtag { text, tag }
    }

    pub fn link(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            target: target.into(),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Plain { .. } => SegmentKind::Plain,
            Segment::Hashtag { .. } => SegmentKind::Hashtag,
            Segment::Link { .. } => SegmentKind::Link,
        }
    }

    /// Displayed text of the segment.
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Hashtag { text, .. } | Segment::Link { text, .. } => {
                text
            }
        }
    }
}

/// Length Twitter counts for any link, whatever its actual length.
pub const TWITTER_LINK_WEIGHT: usize = 23;

/// A platform-ready post.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPost {
    pub platform: Platform,

    /// Final text. For Twitter this ends with the link line.
    pub body: String,

    /// Styled segments, rendered text equals `body` (Bluesky only)
    pub segments: Option<Vec<Segment>>,

    /// Link card metadata, attached once resolved (Bluesky only)
    pub preview: Option<LinkPreview>,

    /// Entry link, carried in full
    pub url: String,
}

impl ComposedPost {
    /// Number of characters of `body`.
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }

    /// Length as the platform counts it.
    ///
    /// Twitter weighs the trailing link at [`TWITTER_LINK_WEIGHT`]; Bluesky
    /// counts the body as is, the link living in a facet and the card.
    pub fn weighted_len(&self) -> usize {
        match self.platform {
            Platform::Twitter if self.body.ends_with(&self.url) => {
                self.char_len() - self.url.chars().count() + TWITTER_LINK_WEIGHT
            }
            _ => self.char_len(),
        }
    }

    /// Attach a resolved preview when it is able to produce a card.
    pub fn with_preview(mut self, preview: LinkPreview) -> Self {
        self.preview = preview.has_card().then_some(preview);
        self
    }
}
