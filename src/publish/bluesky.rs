// src/publish/bluesky.rs

//! Bluesky client over the AT Protocol XRPC endpoints.
//!
//! A post is a single `app.bsky.feed.post` record: rendered text, facets
//! for the link and hashtags, and an external embed card when a preview is
//! available. The preview image is uploaded as a blob first and referenced
//! as the card thumbnail.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use super::{BlueskyCredentials, PublishReceipt, Publisher};
use crate::error::{AppError, Result};
use crate::models::{BlueskyConfig, ComposedPost, LinkPreview, Platform, Segment};
use crate::services::rich_text::{self, FacetFeature, RenderedText};

const PLATFORM: &str = "Bluesky";
const POST_COLLECTION: &str = "app.bsky.feed.post";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Deserialize)]
struct UploadedBlob {
    blob: Value,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    uri: String,
}

/// Facets in the record wire format.
pub fn facets_json(rendered: &RenderedText) -> Vec<Value> {
    rendered
        .facets
        .iter()
        .map(|facet| {
            let feature = match &facet.feature {
                FacetFeature::Link { uri } => json!({
                    "$type": "app.bsky.richtext.facet#link",
                    "uri": uri,
                }),
                FacetFeature::Tag { tag } => json!({
                    "$type": "app.bsky.richtext.facet#tag",
                    "tag": tag,
                }),
            };
            json!({
                "index": { "byteStart": facet.byte_start, "byteEnd": facet.byte_end },
                "features": [feature],
            })
        })
        .collect()
}

/// External link card, with the uploaded thumbnail when there is one.
pub fn external_embed(url: &str, preview: &LinkPreview, thumb: Option<Value>) -> Value {
    let mut external = json!({
        "uri": url,
        "title": preview.title.clone().unwrap_or_default(),
        "description": preview.description.clone().unwrap_or_default(),
    });
    if let Some(thumb) = thumb {
        external["thumb"] = thumb;
    }
    json!({
        "$type": "app.bsky.embed.external",
        "external": external,
    })
}

/// The `app.bsky.feed.post` record for a composed post.
pub fn build_record(post: &ComposedPost, embed: Option<Value>, created_at: &str) -> Value {
    let rendered = match &post.segments {
        Some(segments) => rich_text::render(segments),
        None => rich_text::render(&[Segment::plain(post.body.as_str())]),
    };

    let mut record = json!({
        "$type": POST_COLLECTION,
        "text": rendered.text,
        "createdAt": created_at,
    });
    let facets = facets_json(&rendered);
    if !facets.is_empty() {
        record["facets"] = Value::Array(facets);
    }
    if let Some(embed) = embed {
        record["embed"] = embed;
    }
    record
}

/// Posts rich-text skeets with link cards.
pub struct BlueskyClient {
    client: reqwest::Client,
    service_url: String,
    credentials: BlueskyCredentials,
    session: OnceCell<Session>,
}

impl BlueskyClient {
    pub fn new(
        client: reqwest::Client,
        config: &BlueskyConfig,
        credentials: BlueskyCredentials,
    ) -> Self {
        Self {
            client,
            service_url: config.service_url.trim_end_matches('/').to_string(),
            credentials,
            session: OnceCell::new(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service_url, method)
    }

    /// Log in once and reuse the session for later posts.
    async fn session(&self) -> Result<&Session> {
        self.session
            .get_or_try_init(|| async {
                let request = self
                    .client
                    .post(self.endpoint("com.atproto.server.createSession"))
                    .json(&json!({
                        "identifier": self.credentials.identifier,
                        "password": self.credentials.password,
                    }));
                let session: Session = send(request).await?;
                log::debug!("Bluesky session created for {}", session.did);
                Ok(session)
            })
            .await
    }

    async fn upload_thumbnail(
        &self,
        session: &Session,
        preview: &LinkPreview,
    ) -> Option<Value> {
        let (Some(bytes), Some(mime_type)) = (&preview.image_bytes, &preview.image_mime_type)
        else {
            return None;
        };

        let request = self
            .client
            .post(self.endpoint("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header(CONTENT_TYPE, mime_type.as_str())
            .body(bytes.clone());

        match send::<UploadedBlob>(request).await {
            Ok(uploaded) => Some(uploaded.blob),
            Err(e) => {
                log::warn!(
                    "Could not upload preview image {}: {}",
                    preview.image_url.as_deref().unwrap_or("<unknown>"),
                    e
                );
                None
            }
        }
    }
}

/// Send an XRPC request and decode its JSON response.
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::publish(
            PLATFORM,
            format!("HTTP {}: {}", status, body),
        ));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl Publisher for BlueskyClient {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    async fn publish(&self, post: &ComposedPost) -> Result<PublishReceipt> {
        let session = self.session().await?;

        let embed = match post.preview.as_ref().filter(|p| p.has_card()) {
            Some(preview) => {
                let thumb = self.upload_thumbnail(session, preview).await;
                Some(external_embed(&post.url, preview, thumb))
            }
            None => None,
        };

        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let request = self
            .client
            .post(self.endpoint("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&json!({
                "repo": session.did,
                "collection": POST_COLLECTION,
                "record": build_record(post, embed, &created_at),
            }));

        let created: CreatedRecord = send(request).await?;
        log::info!("Skeet posted: {}", created.uri);
        Ok(PublishReceipt {
            platform: Platform::Bluesky,
            id: created.uri,
        })
    }
}
