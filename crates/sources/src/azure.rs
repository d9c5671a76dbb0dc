use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use common::config::{AzureConfig, SourcesConfig};
use common::ApiStatusError;

use crate::connector::SourceConnector;
use crate::github::short_sha;
use crate::merge::merge_branch_commits;
use crate::metrics;
use crate::records::{
    CommitRecord, Provider, PullRequestRecord, PullRequestState, RepoActivity, RepoTarget,
};

const API_VERSION: &str = "7.0";
const HEADS_PREFIX: &str = "refs/heads/";

/// Azure DevOps wraps every list response in `{ "value": [...] }`.
#[derive(Debug, Clone, Deserialize)]
struct ValueEnvelope<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefPayload {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureAuthorPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureCommitPayload {
    pub commit_id: String,
    pub author: AzureAuthorPayload,
    /// Commit message; Azure calls it a comment.
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureIdentityPayload {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzurePullPayload {
    pub pull_request_id: i64,
    pub title: String,
    /// "active", "completed", or "abandoned".
    pub status: String,
    pub created_by: AzureIdentityPayload,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub closed_date: Option<DateTime<Utc>>,
}

/// Raw Azure DevOps Git surface behind a trait, mirroring `GithubApi`.
#[async_trait]
pub trait AzureApi: Send + Sync {
    async fn list_branches(
        &self,
        org: &str,
        project: &str,
        repo: &str,
    ) -> Result<Vec<RefPayload>>;

    async fn list_branch_commits(
        &self,
        org: &str,
        project: &str,
        repo: &str,
        branch: &str,
        since: DateTime<Utc>,
        top: u32,
    ) -> Result<Vec<AzureCommitPayload>>;

    async fn list_pull_requests(
        &self,
        org: &str,
        project: &str,
        repo: &str,
    ) -> Result<Vec<AzurePullPayload>>;
}

pub struct AzureHttpClient {
    http: reqwest::Client,
    base: Url,
    pat: Option<String>,
}

impl AzureHttpClient {
    pub fn from_config(cfg: &AzureConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base = cfg.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http,
            base: Url::parse(&base)?,
            pat: cfg.pat.clone(),
        })
    }

    fn repo_url(&self, org: &str, project: &str, repo: &str, resource: &str) -> Result<Url> {
        Ok(self
            .base
            .join(&format!("{org}/{project}/_apis/git/repositories/{repo}/{resource}"))?)
    }

    fn with_query(url: &mut Url, params: &[(&str, String)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, op: &'static str, url: Url) -> Result<Vec<T>> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, op, "dispatching azure devops request");
        let start = Instant::now();
        let result = self.dispatch::<ValueEnvelope<T>>(url, &endpoint).await;
        metrics::observe_fetch("azure", op, start.elapsed().as_secs_f64(), result.is_ok());
        result.map(|envelope| envelope.value)
    }

    async fn dispatch<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T> {
        let mut request = self.http.get(url);
        if let Some(pat) = &self.pat {
            // PAT goes in basic auth with an empty user name.
            request = request.basic_auth("", Some(pat));
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
impl AzureApi for AzureHttpClient {
    async fn list_branches(
        &self,
        org: &str,
        project: &str,
        repo: &str,
    ) -> Result<Vec<RefPayload>> {
        let mut url = self.repo_url(org, project, repo, "refs")?;
        Self::with_query(
            &mut url,
            &[
                ("filter", "heads/".to_string()),
                ("api-version", API_VERSION.to_string()),
            ],
        );
        self.get_list("branches", url).await
    }

    async fn list_branch_commits(
        &self,
        org: &str,
        project: &str,
        repo: &str,
        branch: &str,
        since: DateTime<Utc>,
        top: u32,
    ) -> Result<Vec<AzureCommitPayload>> {
        let mut url = self.repo_url(org, project, repo, "commits")?;
        Self::with_query(
            &mut url,
            &[
                ("searchCriteria.itemVersion.version", branch.to_string()),
                ("searchCriteria.fromDate", since.to_rfc3339()),
                ("searchCriteria.$top", top.to_string()),
                ("api-version", API_VERSION.to_string()),
            ],
        );
        self.get_list("commits", url).await
    }

    async fn list_pull_requests(
        &self,
        org: &str,
        project: &str,
        repo: &str,
    ) -> Result<Vec<AzurePullPayload>> {
        let mut url = self.repo_url(org, project, repo, "pullrequests")?;
        Self::with_query(
            &mut url,
            &[
                ("searchCriteria.status", "all".to_string()),
                ("$top", "100".to_string()),
                ("api-version", API_VERSION.to_string()),
            ],
        );
        self.get_list("pulls", url).await
    }
}

/// Azure DevOps counterpart of `GithubConnector`: same branch fan-out,
/// same dedup, same degradation contract.
pub struct AzureConnector {
    api: Arc<dyn AzureApi>,
    commit_page_size: u32,
    has_credentials: bool,
}

impl AzureConnector {
    pub fn new(api: Arc<dyn AzureApi>, commit_page_size: u32, has_credentials: bool) -> Self {
        Self {
            api,
            commit_page_size,
            has_credentials,
        }
    }

    pub fn from_config(azure: &AzureConfig, sources: &SourcesConfig) -> Result<Self> {
        let client =
            AzureHttpClient::from_config(azure, Duration::from_secs(sources.fetch_timeout_secs))?;
        Ok(Self::new(
            Arc::new(client),
            sources.commit_page_size,
            azure.pat.is_some(),
        ))
    }
}

#[async_trait]
impl SourceConnector for AzureConnector {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    async fn fetch_activity(
        &self,
        target: &RepoTarget,
        lookback_days: u32,
    ) -> Result<RepoActivity> {
        let label = target.label();
        let mut activity = RepoActivity::default();

        if !self.has_credentials {
            warn!(repo = %label, "azure pat not configured; returning empty activity");
            activity
                .degraded
                .push(format!("azure {label}: pat not configured"));
            return Ok(activity);
        }
        let Some(project) = target.project.as_deref() else {
            warn!(repo = %label, "azure target missing project; skipping");
            activity
                .degraded
                .push(format!("azure {label}: project not configured"));
            return Ok(activity);
        };

        let since = Utc::now() - ChronoDuration::days(i64::from(lookback_days));

        let refs = match self
            .api
            .list_branches(&target.org, project, &target.repo)
            .await
        {
            Ok(refs) => refs,
            Err(err) => {
                warn!(repo = %label, error = %err, "azure branch listing failed");
                activity
                    .degraded
                    .push(format!("azure {label}: branch listing failed"));
                return Ok(activity);
            }
        };
        let branches: Vec<String> = refs
            .into_iter()
            .map(|r| {
                r.name
                    .strip_prefix(HEADS_PREFIX)
                    .map(str::to_string)
                    .unwrap_or(r.name)
            })
            .collect();

        let fetches = branches.iter().map(|branch| {
            self.api.list_branch_commits(
                &target.org,
                project,
                &target.repo,
                branch,
                since,
                self.commit_page_size,
            )
        });
        let results = futures::future::join_all(fetches).await;

        let mut per_branch = Vec::with_capacity(branches.len());
        for (branch, result) in branches.iter().zip(results) {
            match result {
                Ok(payloads) => per_branch.push(
                    payloads
                        .into_iter()
                        .filter_map(|payload| commit_record(payload, branch, &label))
                        .collect(),
                ),
                Err(err) => {
                    warn!(
                        repo = %label,
                        branch = %branch,
                        error = %err,
                        "azure commit fetch failed; skipping branch"
                    );
                    metrics::BRANCH_FAILURES_TOTAL
                        .with_label_values(&["azure"])
                        .inc();
                    activity
                        .degraded
                        .push(format!("azure {label}@{branch}: commit fetch failed"));
                }
            }
        }
        activity.commits = merge_branch_commits(per_branch);
        metrics::COMMITS_FETCHED_TOTAL
            .with_label_values(&["azure"])
            .inc_by(activity.commits.len() as u64);

        match self
            .api
            .list_pull_requests(&target.org, project, &target.repo)
            .await
        {
            Ok(pulls) => {
                activity.pull_requests = pulls.into_iter().map(pull_record).collect();
            }
            Err(err) => {
                warn!(repo = %label, error = %err, "azure pull request fetch failed");
                activity
                    .degraded
                    .push(format!("azure {label}: pull request fetch failed"));
            }
        }

        Ok(activity)
    }
}

fn commit_record(
    payload: AzureCommitPayload,
    branch: &str,
    repo_name: &str,
) -> Option<CommitRecord> {
    let authored_at = payload.author.date?;
    let author_raw = payload
        .author
        .name
        .unwrap_or_else(|| "unknown".to_string());

    Some(CommitRecord {
        short_id: short_sha(&payload.commit_id),
        full_id: payload.commit_id,
        author_raw,
        authored_at,
        message: payload.comment,
        branch: branch.to_string(),
        repo_name: repo_name.to_string(),
    })
}

fn pull_record(payload: AzurePullPayload) -> PullRequestRecord {
    let state = match payload.status.as_str() {
        "active" => PullRequestState::Open,
        "completed" => PullRequestState::Merged,
        _ => PullRequestState::Closed,
    };
    let merged_at = match state {
        PullRequestState::Merged => payload.closed_date,
        _ => None,
    };

    PullRequestRecord {
        number: payload.pull_request_id,
        title: payload.title,
        author_raw: payload
            .created_by
            .display_name
            .or(payload.created_by.unique_name)
            .unwrap_or_else(|| "unknown".to_string()),
        state,
        created_at: payload.creation_date,
        merged_at,
    }
}
