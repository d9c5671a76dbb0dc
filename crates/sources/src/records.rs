use std::fmt;

use chrono::{DateTime, Utc};
use common::config::RepositoryConfig;
use serde::{Deserialize, Serialize};

/// Normalized commit, identical in shape no matter which provider
/// produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    pub short_id: String,
    /// Full hash, the dedup key across branches.
    pub full_id: String,
    pub author_raw: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
    /// Branch this commit was first observed on.
    pub branch: String,
    pub repo_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Merged,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub number: i64,
    pub title: String,
    pub author_raw: String,
    pub state: PullRequestState,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Everything one repository contributed to the window, plus labels for
/// the pieces that could not be fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoActivity {
    pub commits: Vec<CommitRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
    /// One label per degraded piece, surfaced as report warnings.
    pub degraded: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Azure,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Azure => "azure",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "github" | "gh" => Some(Self::Github),
            "azure" | "azure-devops" | "ado" => Some(Self::Azure),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured repository to pull activity from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub provider: Provider,
    pub org: String,
    /// Azure DevOps project; GitHub targets leave this empty.
    pub project: Option<String>,
    pub repo: String,
}

impl RepoTarget {
    pub fn from_config(cfg: &RepositoryConfig) -> Option<Self> {
        Some(Self {
            provider: Provider::parse(&cfg.provider)?,
            org: cfg.org.clone(),
            project: cfg.project.clone(),
            repo: cfg.repo.clone(),
        })
    }

    pub fn label(&self) -> String {
        match &self.project {
            Some(project) => format!("{}/{}/{}", self.org, project, self.repo),
            None => format!("{}/{}", self.org, self.repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parse_accepts_aliases() {
        assert_eq!(Provider::parse("GitHub"), Some(Provider::Github));
        assert_eq!(Provider::parse("ado"), Some(Provider::Azure));
        assert_eq!(Provider::parse("azure-devops"), Some(Provider::Azure));
        assert_eq!(Provider::parse("gitlab"), None);
    }

    #[test]
    fn label_includes_project_only_for_azure_style_targets() {
        let github = RepoTarget {
            provider: Provider::Github,
            org: "acme".to_string(),
            project: None,
            repo: "app".to_string(),
        };
        assert_eq!(github.label(), "acme/app");

        let azure = RepoTarget {
            provider: Provider::Azure,
            org: "acme".to_string(),
            project: Some("platform".to_string()),
            repo: "app".to_string(),
        };
        assert_eq!(azure.label(), "acme/platform/app");
    }
}
