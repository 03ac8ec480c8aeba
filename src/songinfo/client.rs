//! Song info service client

use crate::catalog::{SongDetail, SongRequest};
use anyhow::Context;
use std::time::Duration;

/// Client for the external song info service
#[derive(Debug, Clone)]
pub struct SongInfoClient {
    client: reqwest::Client,
    base_url: String,
}

impl SongInfoClient {
    const USER_AGENT: &'static str = concat!("songbook/", env!("CARGO_PKG_VERSION"));

    /// Create a client. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up release date, lyrics and link for a song. One attempt, no retries.
    pub async fn fetch(&self, request: &SongRequest) -> anyhow::Result<SongDetail> {
        let url = format!(
            "{}/info?group={}&song={}",
            self.base_url,
            urlencoding::encode(&request.group_name),
            urlencoding::encode(&request.song_name)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("song info request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("song info service returned {}", response.status());
        }

        let detail: SongDetail = response
            .json()
            .await
            .context("decode song info response")?;
        Ok(detail)
    }
}
