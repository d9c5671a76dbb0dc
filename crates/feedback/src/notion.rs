use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::config::NotionConfig;
use common::ApiStatusError;

use crate::comment::RawComment;
use crate::metrics;

/// Page id lifted from a Notion URL path. Share links end in either a
/// bare 32-hex tail ("Design-Notes-0123...cdef") or a hyphenated UUID;
/// the API wants the hyphenated form, so bare tails are rewritten.
pub fn parse_page_id(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url).ok()?;
    let last = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;

    if is_hyphenated_uuid(last) {
        return Some(last.to_lowercase());
    }

    let tail: String = last
        .chars()
        .rev()
        .take(32)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    if tail.len() == 32 && tail.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(hyphenate(&tail.to_lowercase()));
    }
    None
}

fn is_hyphenated_uuid(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('-').collect();
    parts.len() == 5
        && parts
            .iter()
            .zip([8usize, 4, 4, 4, 12])
            .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
}

fn hyphenate(hex32: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &hex32[0..8],
        &hex32[8..12],
        &hex32[12..16],
        &hex32[16..20],
        &hex32[20..32]
    )
}

/// Raw Notion comment surface behind a trait for the same reason as
/// `LinearApi`: the aggregator must run against stubs.
#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn page_comments(&self, page_id: &str) -> Result<Vec<RawComment>>;
}

pub struct NotionHttpClient {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
    version: String,
}

impl NotionHttpClient {
    pub fn from_config(cfg: &NotionConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base = cfg.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http,
            base: Url::parse(&base)?,
            api_key: cfg.api_key.clone(),
            version: cfg.version.clone(),
        })
    }

    async fn get_json(&self, op: &'static str, url: Url) -> Result<Value> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, op, "dispatching notion request");
        let start = Instant::now();
        let result = self.dispatch(url, &endpoint).await;
        debug!(
            op,
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "notion request finished"
        );
        if result.is_err() {
            metrics::RESOURCE_FAILURES_TOTAL
                .with_label_values(&["notion"])
                .inc();
        }
        result
    }

    async fn dispatch(&self, url: Url, endpoint: &str) -> Result<Value> {
        let mut request = self
            .http
            .get(url)
            .header("Notion-Version", self.version.clone());
        if let Some(key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiStatusError::new(status, endpoint).into());
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl NotionApi for NotionHttpClient {
    async fn page_comments(&self, page_id: &str) -> Result<Vec<RawComment>> {
        let mut url = self.base.join("v1/comments")?;
        url.query_pairs_mut()
            .append_pair("block_id", page_id)
            .append_pair("page_size", "100");
        let response = self.get_json("page_comments", url).await?;
        parse_comments(&response, page_id)
    }
}

fn parse_comments(root: &Value, page_id: &str) -> Result<Vec<RawComment>> {
    let results = root
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("missing results array in comments response"))?;

    let mut comments = Vec::new();
    for node in results.iter().filter(|node| !node.is_null()) {
        let id = node
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("missing comment id"))?;
        let created_at = node
            .get("created_time")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("missing comment created_time"))?;
        let created_at: DateTime<Utc> = created_at.parse()?;

        let body = node
            .get("rich_text")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        // Comment authors come back as partial users; `name` is only
        // present when the integration can read the workspace members.
        let author = node
            .get("created_by")
            .and_then(|user| user.get("name"))
            .and_then(Value::as_str)
            .or_else(|| {
                node.get("created_by")
                    .and_then(|user| user.get("id"))
                    .and_then(Value::as_str)
            })
            .unwrap_or("unknown")
            .to_string();

        comments.push(RawComment {
            id: id.to_string(),
            item_label: format!("wiki page {page_id}"),
            item_url: format!("https://www.notion.so/{}", page_id.replace('-', "")),
            author,
            body,
            created_at,
        });
    }
    Ok(comments)
}
