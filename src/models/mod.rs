// src/models/mod.rs

//! Domain models for the announcer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entry;
mod post;
mod preview;

// Re-export all public types
pub use config::{
    BlueskyConfig, CatalogConfig, Config, HashtagRule, HttpConfig, LinksConfig, PlatformLimits,
    PostConfig, PreviewConfig, TwitterConfig,
};
pub use entry::ListEntry;
pub use post::{ComposedPost, Platform, Segment, SegmentKind};
pub use preview::LinkPreview;
