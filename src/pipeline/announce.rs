// src/pipeline/announce.rs

//! Announcement pipeline for catalog additions.
//!
//! Entries are processed one at a time: compose both posts, publish the
//! tweet, resolve the link preview, then publish the skeet with its card.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{ComposedPost, Config, LinkPreview, ListEntry, Platform};
use crate::publish::{PublishReceipt, Publisher};
use crate::services::{EntryExtractor, LinkPreviewResolver, PostComposer, section};
use crate::utils::http::Fetcher;
use crate::utils::log;
use crate::vcs::ChangeSource;

/// What to announce.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub commit: String,
    pub trigger: String,
}

/// One publisher per platform.
pub struct Publishers {
    pub twitter: Box<dyn Publisher>,
    pub bluesky: Box<dyn Publisher>,
}

/// Posts built (and possibly published) for one entry.
#[derive(Debug, Clone)]
pub struct AnnouncedEntry {
    pub entry: ListEntry,
    pub section: String,
    pub tweet: ComposedPost,
    pub skeet: ComposedPost,
    /// Empty on a dry run
    pub receipts: Vec<PublishReceipt>,
}

/// Result of an announcement run.
#[derive(Debug, Default)]
pub struct AnnounceOutcome {
    /// The commit message lacked the trigger phrase
    pub skipped: bool,
    pub announced: Vec<AnnouncedEntry>,
}

/// Announce every entry added by the commit.
///
/// Without publishers the run is a dry run: everything up to publishing,
/// preview resolution included, runs and is logged.
pub async fn run_announce(
    config: &Config,
    source: &dyn ChangeSource,
    fetcher: Arc<dyn Fetcher>,
    publishers: Option<&Publishers>,
    request: &AnnounceRequest,
) -> Result<AnnounceOutcome> {
    log::header(&format!("Announcing catalog additions from {}", request.commit));

    let change_set = source.change_set(&request.commit).await?;
    if !change_set.is_triggered_by(&request.trigger) {
        ::log::info!(
            "Commit message does not contain trigger keyword {:?}, nothing to post",
            request.trigger
        );
        return Ok(AnnounceOutcome {
            skipped: true,
            ..AnnounceOutcome::default()
        });
    }

    let entries = EntryExtractor::new(&config.catalog.path).extract(&change_set)?;
    let catalog_text = source.file_at(&request.commit, &config.catalog.path).await?;
    ::log::info!("Found {} new catalog entries", entries.len());

    if publishers.is_none() {
        ::log::info!("Dry run, posts will not be published");
    }

    let composer = PostComposer::new(config);
    let resolver = LinkPreviewResolver::new(fetcher, config);
    let mut outcome = AnnounceOutcome::default();

    for entry in entries {
        let section = section::resolve(&catalog_text, &entry.entry_line)?;
        ::log::info!("Section: {}", section);

        let tweet = composer.compose(
            Platform::Twitter,
            &section,
            &entry.title,
            &entry.url,
            &entry.description,
        );
        let skeet = composer.compose(
            Platform::Bluesky,
            &section,
            &entry.title,
            &entry.url,
            &entry.description,
        );
        log_post(&tweet);

        let mut receipts = Vec::new();
        if let Some(publishers) = publishers {
            receipts.push(publishers.twitter.publish(&tweet).await?);
        }

        let preview = resolver.resolve(&entry.url).await;
        log_preview(&entry.url, &preview);
        let skeet = skeet.with_preview(preview);
        log_post(&skeet);

        if let Some(publishers) = publishers {
            receipts.push(publishers.bluesky.publish(&skeet).await?);
        }

        outcome.announced.push(AnnouncedEntry {
            entry,
            section,
            tweet,
            skeet,
            receipts,
        });
    }

    log::summary(
        "Announcement",
        &[
            ("Commit", request.commit.clone()),
            ("Entries", outcome.announced.len().to_string()),
            ("Published", publishers.is_some().to_string()),
        ],
    );
    Ok(outcome)
}

fn log_post(post: &ComposedPost) {
    log::separator();
    ::log::info!("{} post ({} chars):", post.platform, post.char_len());
    log::block(&post.body);
}

fn log_preview(url: &str, preview: &LinkPreview) {
    ::log::info!("Preview for {}:", url);
    log::sub_item(&format!("Title: {}", preview.title.as_deref().unwrap_or("None")));
    log::sub_item(&format!(
        "Description: {}",
        preview.description.as_deref().unwrap_or("None")
    ));
    log::sub_item(&format!(
        "Image URL: {}",
        preview.image_url.as_deref().unwrap_or("None")
    ));
    log::sub_item(&format!(
        "Image type: {}",
        preview.image_mime_type.as_deref().unwrap_or("None")
    ));
}
