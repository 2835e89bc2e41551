//! Service layer for the announcer.
//!
//! This module contains the business logic for:
//! - Entry extraction from commit diffs (`EntryExtractor`)
//! - Section lookup in the catalog (`section::resolve`)
//! - Hashtag annotation (`HashtagAnnotator`)
//! - Post composition per platform (`PostComposer`)
//! - Link preview resolution (`LinkPreviewResolver`)
//! - Catalog URL discovery for link checks (`links`)

pub mod composer;
pub mod extractor;
pub mod hashtags;
pub mod links;
pub mod mime;
pub mod preview;
pub mod rich_text;
pub mod section;

pub use composer::PostComposer;
pub use extractor::EntryExtractor;
pub use hashtags::HashtagAnnotator;
pub use preview::{LinkPreviewResolver, PageMetadata};
