// src/publish/mod.rs

//! Publishing composed posts to social platforms.
//!
//! Each platform client implements [`Publisher`]. Credentials are read from
//! the `INPUT_*` environment variables set by the CI action; a real run
//! without them stops before anything is submitted.

pub mod bluesky;
pub mod twitter;

use std::env;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{ComposedPost, Platform};

pub use bluesky::BlueskyClient;
pub use twitter::TwitterClient;

/// Confirmation returned by a platform for a created post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub platform: Platform,
    /// Platform identifier of the post (tweet id, record URI)
    pub id: String,
}

/// Trait for platform publishing backends.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> Platform;

    async fn publish(&self, post: &ComposedPost) -> Result<PublishReceipt>;
}

/// OAuth 1.0a user context for the Twitter API.
#[derive(Clone)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl TwitterCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| required(&lookup, name, "Twitter");
        Ok(Self {
            consumer_key: var("INPUT_TWITTER_CONSUMER_KEY")?,
            consumer_secret: var("INPUT_TWITTER_CONSUMER_SECRET")?,
            access_token: var("INPUT_TWITTER_ACCESS_TOKEN")?,
            access_token_secret: var("INPUT_TWITTER_ACCESS_TOKEN_SECRET")?,
        })
    }
}

/// App password login for a Bluesky account.
#[derive(Clone)]
pub struct BlueskyCredentials {
    pub identifier: String,
    pub password: String,
}

impl BlueskyCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| required(&lookup, name, "Bluesky");
        Ok(Self {
            identifier: var("INPUT_BLUESKY_USERNAME")?,
            password: var("INPUT_BLUESKY_TOKEN")?,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    platform: &'static str,
) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            log::error!("Missing environment variable {}", name);
            Err(AppError::MissingCredentials(platform))
        }
    }
}

// Secrets never reach logs through Debug.
impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for BlueskyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueskyCredentials")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
