use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header;
use serde_json::{json, Value};
use tracing::debug;

use common::config::LinearConfig;
use common::ApiStatusError;

use crate::comment::RawComment;
use crate::metrics;

const INITIATIVE_QUERY: &str = r#"
query Initiative($id: String!) {
  initiative(id: $id) {
    name
    projects(first: 10) {
      nodes {
        id
        name
        url
      }
    }
    links {
      nodes {
        label
        url
      }
    }
  }
}
"#;

const PROJECT_COMMENTS_QUERY: &str = r#"
query ProjectComments($id: String!) {
  project(id: $id) {
    issues(first: 25, orderBy: updatedAt) {
      nodes {
        identifier
        title
        url
        comments(first: 10) {
          nodes {
            id
            body
            createdAt
            user {
              displayName
            }
          }
        }
      }
    }
  }
}
"#;

/// A sub-project linked to the initiative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// An external resource attached to the initiative, usually a wiki page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiativePayload {
    pub name: String,
    pub projects: Vec<ProjectRef>,
    pub links: Vec<LinkRef>,
}

/// Raw Linear GraphQL surface behind a trait, mirroring the source
/// connector seams, so the aggregator is testable without a network.
#[async_trait]
pub trait LinearApi: Send + Sync {
    async fn initiative(&self, id: &str) -> Result<InitiativePayload>;

    async fn project_comments(&self, project: &ProjectRef) -> Result<Vec<RawComment>>;
}

pub struct LinearHttpClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl LinearHttpClient {
    pub fn from_config(cfg: &LinearConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: cfg.api_base.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    async fn execute_graphql(&self, op: &'static str, query: &str, variables: Value) -> Result<Value> {
        debug!(op, "dispatching linear request");
        let start = Instant::now();
        let result = self.dispatch(query, variables).await;
        let ok = result.is_ok();
        debug!(op, ok, elapsed_ms = start.elapsed().as_millis() as u64, "linear request finished");
        if !ok {
            metrics::RESOURCE_FAILURES_TOTAL
                .with_label_values(&["linear"])
                .inc();
        }
        result
    }

    async fn dispatch(&self, query: &str, variables: Value) -> Result<Value> {
        let payload = json!({
            "query": query,
            "variables": variables,
        });

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, key.clone());
        }

        let response = request.json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiStatusError::new(status, "graphql").into());
        }

        let value: Value = response.json().await?;
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            return Err(map_graphql_errors(errors));
        }
        Ok(value)
    }
}

#[async_trait]
impl LinearApi for LinearHttpClient {
    async fn initiative(&self, id: &str) -> Result<InitiativePayload> {
        let response = self
            .execute_graphql("initiative", INITIATIVE_QUERY, json!({ "id": id }))
            .await?;
        parse_initiative(&response)
    }

    async fn project_comments(&self, project: &ProjectRef) -> Result<Vec<RawComment>> {
        let response = self
            .execute_graphql(
                "project_comments",
                PROJECT_COMMENTS_QUERY,
                json!({ "id": project.id }),
            )
            .await?;
        parse_project_comments(&response)
    }
}

fn parse_initiative(root: &Value) -> Result<InitiativePayload> {
    let initiative = root
        .get("data")
        .and_then(|d| d.get("initiative"))
        .ok_or_else(|| anyhow!("missing initiative field in GraphQL response"))?;
    if initiative.is_null() {
        return Err(anyhow!("initiative not found"));
    }

    let name = initiative
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let mut projects = Vec::new();
    if let Some(nodes) = connection_nodes(initiative, "projects") {
        for node in nodes.iter().filter(|node| !node.is_null()) {
            let id = node
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing project id"))?;
            projects.push(ProjectRef {
                id: id.to_string(),
                name: node
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                url: node
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            });
        }
    }

    let mut links = Vec::new();
    if let Some(nodes) = connection_nodes(initiative, "links") {
        for node in nodes.iter().filter(|node| !node.is_null()) {
            let url = match node.get("url").and_then(Value::as_str) {
                Some(url) if !url.is_empty() => url.to_string(),
                _ => continue,
            };
            links.push(LinkRef {
                label: node
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                url,
            });
        }
    }

    Ok(InitiativePayload {
        name,
        projects,
        links,
    })
}

fn parse_project_comments(root: &Value) -> Result<Vec<RawComment>> {
    let project = root
        .get("data")
        .and_then(|d| d.get("project"))
        .ok_or_else(|| anyhow!("missing project field in GraphQL response"))?;
    if project.is_null() {
        // Deleted or access-revoked between listing and fetching.
        return Ok(Vec::new());
    }

    let mut comments = Vec::new();
    let issues = connection_nodes(project, "issues").unwrap_or_default();
    for issue in issues.iter().filter(|node| !node.is_null()) {
        let identifier = issue
            .get("identifier")
            .and_then(Value::as_str)
            .unwrap_or("");
        let title = issue.get("title").and_then(Value::as_str).unwrap_or("");
        let item_label = if identifier.is_empty() {
            title.to_string()
        } else {
            format!("{identifier} {title}")
        };
        let item_url = issue
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        for node in connection_nodes(issue, "comments")
            .unwrap_or_default()
            .iter()
            .filter(|node| !node.is_null())
        {
            let id = node
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing comment id"))?;
            let created_at = node
                .get("createdAt")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing comment createdAt"))?;
            let created_at: DateTime<Utc> = created_at.parse()?;
            comments.push(RawComment {
                id: id.to_string(),
                item_label: item_label.clone(),
                item_url: item_url.clone(),
                author: node
                    .get("user")
                    .and_then(|u| u.get("displayName"))
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                body: node
                    .get("body")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                created_at,
            });
        }
    }
    Ok(comments)
}

fn connection_nodes<'a>(parent: &'a Value, field: &str) -> Option<Vec<&'a Value>> {
    parent
        .get(field)
        .and_then(|conn| conn.get("nodes"))
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().collect())
}

fn map_graphql_errors(errors: &[Value]) -> anyhow::Error {
    if let Some(first) = errors.first() {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown GraphQL error");
        return anyhow!(message.to_string());
    }
    anyhow!("unknown GraphQL error")
}
