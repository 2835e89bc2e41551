// src/publish/twitter.rs

//! Twitter API v2 client with OAuth 1.0a request signing.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use sha1::Sha1;

use super::{PublishReceipt, Publisher, TwitterCredentials};
use crate::error::{AppError, Result};
use crate::models::{ComposedPost, Platform, TwitterConfig};

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal, everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const PLATFORM: &str = "Twitter";

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// HMAC-SHA1 signature over the OAuth signature base string.
pub fn signature(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let base_string = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    );
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| AppError::publish(PLATFORM, e))?;
    mac.update(base_string.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Build the `Authorization` header for a JSON-bodied request.
///
/// JSON bodies are not part of the signature, only the oauth parameters.
pub fn authorization(
    credentials: &TwitterCredentials,
    method: &str,
    url: &str,
    nonce: &str,
    timestamp: &str,
) -> Result<String> {
    let mut params = vec![
        ("oauth_consumer_key", credentials.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];
    let signed = signature(
        method,
        url,
        &params,
        &credentials.consumer_secret,
        &credentials.access_token_secret,
    )?;
    params.push(("oauth_signature", signed.as_str()));
    params.sort();

    let fields = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {}", fields))
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

/// Posts plain-text tweets.
pub struct TwitterClient {
    client: reqwest::Client,
    api_url: String,
    credentials: TwitterCredentials,
}

impl TwitterClient {
    pub fn new(
        client: reqwest::Client,
        config: &TwitterConfig,
        credentials: TwitterCredentials,
    ) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            credentials,
        }
    }
}

#[async_trait]
impl Publisher for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn publish(&self, post: &ComposedPost) -> Result<PublishReceipt> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let header = authorization(
            &self.credentials,
            "POST",
            &self.api_url,
            &nonce(),
            &timestamp,
        )?;

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, header)
            .json(&serde_json::json!({ "text": post.body }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::publish(
                PLATFORM,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let created: TweetResponse = response.json().await?;
        log::info!("Tweet posted: {}", created.data.id);
        Ok(PublishReceipt {
            platform: Platform::Twitter,
            id: created.data.id,
        })
    }
}
