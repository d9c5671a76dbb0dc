use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use analysis::{TeamHealth, WorkReport};
use feedback::FeedbackReport;

pub const MAX_TOP_CONTRIBUTORS: usize = 10;
pub const MAX_RECENT_COMMITS: usize = 30;

/// Review-age buckets for open pull requests, by days since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewBucket {
    InReview,
    NeedsReview,
    Stale,
}

impl ReviewBucket {
    /// Under three days a PR is simply in review; from three through
    /// five it needs a reviewer; past five it has gone stale.
    pub fn from_age_days(age_days: i64) -> Self {
        if age_days < 3 {
            Self::InReview
        } else if age_days <= 5 {
            Self::NeedsReview
        } else {
            Self::Stale
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InReview => "in-review",
            Self::NeedsReview => "needs-review",
            Self::Stale => "stale",
        }
    }
}

/// One bar of a chart-ready series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryTotals {
    pub total_commits: usize,
    /// Pull requests merged inside the lookback window.
    pub prs_merged: usize,
    pub prs_open: usize,
    pub contributor_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopContributor {
    pub name: String,
    pub commit_count: usize,
    pub pr_count: usize,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRow {
    pub name: String,
    pub commit_count: usize,
    pub pull_request_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenPullRequest {
    pub repo: String,
    pub number: i64,
    pub title: String,
    pub author: String,
    pub age_days: i64,
    pub bucket: ReviewBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentCommit {
    pub short_id: String,
    pub repo: String,
    pub branch: String,
    pub author: String,
    pub subject: String,
    pub authored_at: DateTime<Utc>,
}

/// The one combined result object the presentation layer consumes.
/// Every field is final; nothing here is meant to be re-derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    pub period_label: String,
    pub generated_at: DateTime<Utc>,
    pub totals: SummaryTotals,
    pub commits_by_contributor: Vec<SeriesPoint>,
    pub commits_by_repository: Vec<SeriesPoint>,
    pub top_contributors: Vec<TopContributor>,
    pub repositories: Vec<RepositoryRow>,
    pub open_pull_requests: Vec<OpenPullRequest>,
    pub recent_commits: Vec<RecentCommit>,
    /// Degraded sources and skipped repositories, in plain language.
    pub warnings: Vec<String>,
    pub work: WorkReport,
    pub health: TeamHealth,
    pub insights: Vec<String>,
    pub feedback: FeedbackReport,
}

pub fn period_label(lookback_days: u32) -> String {
    if lookback_days == 1 {
        "Last 24 hours".to_string()
    } else {
        format!("Last {lookback_days} days")
    }
}
