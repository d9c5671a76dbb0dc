use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use common::config::{GithubConfig, SourcesConfig};
use common::ApiStatusError;

use crate::connector::SourceConnector;
use crate::merge::merge_branch_commits;
use crate::metrics;
use crate::records::{
    CommitRecord, Provider, PullRequestRecord, PullRequestState, RepoActivity, RepoTarget,
};

#[derive(Debug, Clone, Deserialize)]
pub struct BranchPayload {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRefPayload {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthorPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetailPayload {
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthorPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    pub sha: String,
    pub commit: CommitDetailPayload,
    /// Account that pushed the commit; absent for unlinked authors.
    #[serde(default)]
    pub author: Option<UserRefPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullPayload {
    pub number: i64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<UserRefPayload>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Raw GitHub REST surface, kept behind a trait so connector logic is
/// testable without a network.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<BranchPayload>>;

    async fn list_branch_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        since: DateTime<Utc>,
        per_page: u32,
    ) -> Result<Vec<CommitPayload>>;

    async fn list_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullPayload>>;
}

pub struct GithubHttpClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    user_agent: String,
}

impl GithubHttpClient {
    pub fn from_config(cfg: &GithubConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base = cfg.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http,
            base: Url::parse(&base)?,
            token: cfg.token.clone(),
            user_agent: cfg.user_agent.clone(),
        })
    }

    fn join(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn with_query(url: &mut Url, params: &[(&str, String)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, op: &'static str, url: Url) -> Result<T> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, op, "dispatching github request");
        let start = Instant::now();
        let result = self.dispatch(url, &endpoint).await;
        metrics::observe_fetch("github", op, start.elapsed().as_secs_f64(), result.is_ok());
        result
    }

    async fn dispatch<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T> {
        let mut request = self
            .http
            .get(url)
            .header(header::USER_AGENT, self.user_agent.clone())
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
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
impl GithubApi for GithubHttpClient {
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<BranchPayload>> {
        let mut url = self.join(&format!("repos/{owner}/{repo}/branches"))?;
        Self::with_query(&mut url, &[("per_page", "100".to_string())]);
        self.get_json("branches", url).await
    }

    async fn list_branch_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        since: DateTime<Utc>,
        per_page: u32,
    ) -> Result<Vec<CommitPayload>> {
        let mut url = self.join(&format!("repos/{owner}/{repo}/commits"))?;
        Self::with_query(
            &mut url,
            &[
                ("sha", branch.to_string()),
                ("since", since.to_rfc3339()),
                ("per_page", per_page.to_string()),
            ],
        );
        self.get_json("commits", url).await
    }

    async fn list_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullPayload>> {
        let mut url = self.join(&format!("repos/{owner}/{repo}/pulls"))?;
        Self::with_query(
            &mut url,
            &[
                ("state", "all".to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", "100".to_string()),
            ],
        );
        self.get_json("pulls", url).await
    }
}

/// Fetches branches, per-branch commits, and pull requests for one
/// GitHub repository, merging branches into a deduplicated commit list.
pub struct GithubConnector {
    api: Arc<dyn GithubApi>,
    commit_page_size: u32,
    has_credentials: bool,
}

impl GithubConnector {
    pub fn new(api: Arc<dyn GithubApi>, commit_page_size: u32, has_credentials: bool) -> Self {
        Self {
            api,
            commit_page_size,
            has_credentials,
        }
    }

    pub fn from_config(github: &GithubConfig, sources: &SourcesConfig) -> Result<Self> {
        let client =
            GithubHttpClient::from_config(github, Duration::from_secs(sources.fetch_timeout_secs))?;
        Ok(Self::new(
            Arc::new(client),
            sources.commit_page_size,
            github.token.is_some(),
        ))
    }
}

#[async_trait]
impl SourceConnector for GithubConnector {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    async fn fetch_activity(
        &self,
        target: &RepoTarget,
        lookback_days: u32,
    ) -> Result<RepoActivity> {
        let label = target.label();
        let mut activity = RepoActivity::default();

        if !self.has_credentials {
            warn!(repo = %label, "github token not configured; returning empty activity");
            activity
                .degraded
                .push(format!("github {label}: token not configured"));
            return Ok(activity);
        }

        let since = Utc::now() - ChronoDuration::days(i64::from(lookback_days));

        let branches = match self.api.list_branches(&target.org, &target.repo).await {
            Ok(branches) => branches,
            Err(err) => {
                warn!(repo = %label, error = %err, "github branch listing failed");
                activity
                    .degraded
                    .push(format!("github {label}: branch listing failed"));
                return Ok(activity);
            }
        };

        let fetches = branches.iter().map(|branch| {
            self.api.list_branch_commits(
                &target.org,
                &target.repo,
                &branch.name,
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
                        .filter_map(|payload| commit_record(payload, &branch.name, &label))
                        .collect(),
                ),
                Err(err) => {
                    warn!(
                        repo = %label,
                        branch = %branch.name,
                        error = %err,
                        "github commit fetch failed; skipping branch"
                    );
                    metrics::BRANCH_FAILURES_TOTAL
                        .with_label_values(&["github"])
                        .inc();
                    activity
                        .degraded
                        .push(format!("github {label}@{}: commit fetch failed", branch.name));
                }
            }
        }
        activity.commits = merge_branch_commits(per_branch);
        metrics::COMMITS_FETCHED_TOTAL
            .with_label_values(&["github"])
            .inc_by(activity.commits.len() as u64);

        match self.api.list_pull_requests(&target.org, &target.repo).await {
            Ok(pulls) => {
                activity.pull_requests = pulls.into_iter().map(pull_record).collect();
            }
            Err(err) => {
                warn!(repo = %label, error = %err, "github pull request fetch failed");
                activity
                    .degraded
                    .push(format!("github {label}: pull request fetch failed"));
            }
        }

        Ok(activity)
    }
}

fn commit_record(payload: CommitPayload, branch: &str, repo_name: &str) -> Option<CommitRecord> {
    // A commit without an authored date cannot be windowed or
    // classified; drop it rather than guess.
    let authored_at = payload.commit.author.as_ref().and_then(|a| a.date)?;
    let author_raw = payload
        .author
        .map(|user| user.login)
        .or_else(|| payload.commit.author.and_then(|a| a.name))
        .unwrap_or_else(|| "unknown".to_string());

    Some(CommitRecord {
        short_id: short_sha(&payload.sha),
        full_id: payload.sha,
        author_raw,
        authored_at,
        message: payload.commit.message,
        branch: branch.to_string(),
        repo_name: repo_name.to_string(),
    })
}

fn pull_record(payload: PullPayload) -> PullRequestRecord {
    let state = if payload.merged_at.is_some() {
        PullRequestState::Merged
    } else if payload.state == "open" {
        PullRequestState::Open
    } else {
        PullRequestState::Closed
    };

    PullRequestRecord {
        number: payload.number,
        title: payload.title,
        author_raw: payload
            .user
            .map(|user| user.login)
            .unwrap_or_else(|| "unknown".to_string()),
        state,
        created_at: payload.created_at,
        merged_at: payload.merged_at,
    }
}

pub(crate) fn short_sha(sha: &str) -> String {
    sha.chars().take(8).collect()
}
