use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tracing::{info, warn};

use analysis::{CommitAnalysis, CommitAnalyzer, WorkIntentExtractor};
use common::config::AppConfig;
use common::text::first_line;
use common::Result;
use feedback::{FeedbackAggregator, FeedbackReport};
use identity::IdentityResolver;
use sources::azure::AzureConnector;
use sources::github::GithubConnector;
use sources::records::{Provider, PullRequestState, RepoActivity, RepoTarget};
use sources::SharedConnector;

use crate::metrics;
use crate::report::{
    period_label, DashboardReport, OpenPullRequest, RecentCommit, RepositoryRow, ReviewBucket,
    SeriesPoint, SummaryTotals, TopContributor, MAX_RECENT_COMMITS, MAX_TOP_CONTRIBUTORS,
};

/// The feedback branch of the pipeline behind a seam so the orchestrator
/// can be exercised without Linear or Notion.
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    async fn gather(&self) -> FeedbackReport;
}

#[async_trait]
impl FeedbackSource for FeedbackAggregator {
    async fn gather(&self) -> FeedbackReport {
        FeedbackAggregator::gather(self).await
    }
}

/// Top-level orchestrator. One `run` recomputes the whole dashboard from
/// source: repository fan-out and the feedback branch in parallel, then
/// analysis, extraction, and the team rollup. Nothing is persisted.
pub struct Pipeline {
    connectors: Vec<SharedConnector>,
    targets: Vec<RepoTarget>,
    /// Config entries that could not be turned into targets; repeated on
    /// every report so a typo never fails silently.
    startup_warnings: Vec<String>,
    resolver: IdentityResolver,
    analyzer: CommitAnalyzer,
    extractor: WorkIntentExtractor,
    feedback: Arc<dyn FeedbackSource>,
}

impl Pipeline {
    pub fn new(
        connectors: Vec<SharedConnector>,
        targets: Vec<RepoTarget>,
        resolver: IdentityResolver,
        feedback: Arc<dyn FeedbackSource>,
    ) -> Self {
        Self {
            connectors,
            targets,
            startup_warnings: Vec::new(),
            resolver,
            analyzer: CommitAnalyzer::default(),
            extractor: WorkIntentExtractor,
            feedback,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let github = GithubConnector::from_config(&cfg.github, &cfg.sources)?;
        let azure = AzureConnector::from_config(&cfg.azure, &cfg.sources)?;
        let connectors: Vec<SharedConnector> = vec![Arc::new(github), Arc::new(azure)];

        let mut targets = Vec::new();
        let mut startup_warnings = Vec::new();
        for repo in &cfg.sources.repositories {
            match RepoTarget::from_config(repo) {
                Some(target) => targets.push(target),
                None => {
                    warn!(provider = %repo.provider, repo = %repo.repo, "unknown provider; skipping repository");
                    startup_warnings.push(format!(
                        "{}/{}: unknown provider \"{}\", repository skipped",
                        repo.org, repo.repo, repo.provider
                    ));
                }
            }
        }

        let feedback = FeedbackAggregator::from_config(
            &cfg.linear,
            &cfg.notion,
            &cfg.team,
            Duration::from_secs(cfg.sources.fetch_timeout_secs),
        )?;

        let mut pipeline = Self::new(
            connectors,
            targets,
            IdentityResolver::from_config(&cfg.team),
            Arc::new(feedback),
        );
        pipeline.startup_warnings = startup_warnings;
        Ok(pipeline)
    }

    fn connector_for(&self, provider: Provider) -> Option<&SharedConnector> {
        self.connectors.iter().find(|c| c.provider() == provider)
    }

    pub async fn run(&self, lookback_days: u32) -> Result<DashboardReport> {
        let started = Instant::now();
        info!(lookback_days, repos = self.targets.len(), "pipeline run starting");

        let repo_fetches = futures::future::join_all(self.targets.iter().map(|target| async {
            let label = target.label();
            match self.connector_for(target.provider) {
                Some(connector) => match connector.fetch_activity(target, lookback_days).await {
                    Ok(activity) => (label, activity),
                    Err(err) => {
                        // Connector errors are wiring bugs, not flaky
                        // networks; absorb them the same way regardless.
                        warn!(repo = %label, error = %err, "repository fetch failed");
                        let mut activity = RepoActivity::default();
                        activity.degraded.push(format!("{label}: fetch failed"));
                        (label, activity)
                    }
                },
                None => {
                    let mut activity = RepoActivity::default();
                    activity
                        .degraded
                        .push(format!("{label}: no connector for provider"));
                    (label, activity)
                }
            }
        }));
        let (per_repo, mut feedback) = tokio::join!(repo_fetches, self.feedback.gather());

        let mut warnings = self.startup_warnings.clone();
        for (_, activity) in &per_repo {
            warnings.extend(activity.degraded.iter().cloned());
        }
        warnings.append(&mut feedback.degraded);

        let report = self.assemble(lookback_days, per_repo, feedback, warnings);

        metrics::RUNS_TOTAL.inc();
        metrics::RUN_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
        metrics::LAST_RUN_TIMESTAMP_SECONDS.set(Utc::now().timestamp() as f64);
        info!(
            commits = report.totals.total_commits,
            contributors = report.totals.contributor_count,
            warnings = report.warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run finished"
        );
        Ok(report)
    }

    fn assemble(
        &self,
        lookback_days: u32,
        per_repo: Vec<(String, RepoActivity)>,
        feedback: FeedbackReport,
        warnings: Vec<String>,
    ) -> DashboardReport {
        let now = Utc::now();
        let window_start = now - ChronoDuration::days(i64::from(lookback_days));

        let mut commits = Vec::new();
        let mut open_pull_requests = Vec::new();
        let mut repositories = Vec::new();
        let mut prs_merged = 0usize;
        let mut prs_open = 0usize;
        let mut all_pull_requests = Vec::new();

        for (label, activity) in per_repo {
            repositories.push(RepositoryRow {
                name: label.clone(),
                commit_count: activity.commits.len(),
                pull_request_count: activity.pull_requests.len(),
            });

            for pr in &activity.pull_requests {
                match pr.state {
                    PullRequestState::Open => {
                        prs_open += 1;
                        let age_days = (now - pr.created_at).num_days();
                        open_pull_requests.push(OpenPullRequest {
                            repo: label.clone(),
                            number: pr.number,
                            title: pr.title.clone(),
                            author: self.resolver.resolve(&pr.author_raw).display_name,
                            age_days,
                            bucket: ReviewBucket::from_age_days(age_days),
                        });
                    }
                    PullRequestState::Merged => {
                        if pr.merged_at.map_or(false, |at| at >= window_start) {
                            prs_merged += 1;
                        }
                    }
                    PullRequestState::Closed => {}
                }
            }

            all_pull_requests.extend(activity.pull_requests);
            commits.extend(activity.commits);
        }
        open_pull_requests.sort_by(|a, b| b.age_days.cmp(&a.age_days));

        let analyses: Vec<CommitAnalysis> = commits
            .iter()
            .map(|commit| {
                let identity = self.resolver.resolve(&commit.author_raw);
                self.analyzer.analyze(
                    &commit.message,
                    commit.authored_at,
                    identity.tz_offset_hours,
                )
            })
            .collect();

        let work = self
            .extractor
            .extract(&commits, &all_pull_requests, &self.resolver);
        let health = analysis::aggregate(&analyses);
        let insights = analysis::explain(&analyses, &health);

        let commits_by_contributor: Vec<SeriesPoint> = work
            .contributors
            .iter()
            .filter(|profile| profile.commit_count > 0)
            .map(|profile| SeriesPoint {
                label: profile.canonical_name.clone(),
                value: profile.commit_count,
            })
            .collect();

        let mut by_repo: BTreeMap<&str, usize> = BTreeMap::new();
        for commit in &commits {
            *by_repo.entry(commit.repo_name.as_str()).or_insert(0) += 1;
        }
        let mut commits_by_repository: Vec<SeriesPoint> = by_repo
            .into_iter()
            .map(|(label, value)| SeriesPoint {
                label: label.to_string(),
                value,
            })
            .collect();
        commits_by_repository.sort_by(|a, b| b.value.cmp(&a.value));

        let top_contributors: Vec<TopContributor> = work
            .contributors
            .iter()
            .take(MAX_TOP_CONTRIBUTORS)
            .map(|profile| TopContributor {
                name: profile.canonical_name.clone(),
                commit_count: profile.commit_count,
                pr_count: profile.pr_count,
                last_active: profile.last_active,
            })
            .collect();

        let mut recent = commits;
        recent.sort_by(|a, b| b.authored_at.cmp(&a.authored_at));
        recent.truncate(MAX_RECENT_COMMITS);
        let recent_commits: Vec<RecentCommit> = recent
            .into_iter()
            .map(|commit| RecentCommit {
                subject: first_line(&commit.message).to_string(),
                author: self.resolver.resolve(&commit.author_raw).display_name,
                short_id: commit.short_id,
                repo: commit.repo_name,
                branch: commit.branch,
                authored_at: commit.authored_at,
            })
            .collect();

        DashboardReport {
            period_label: period_label(lookback_days),
            generated_at: now,
            totals: SummaryTotals {
                total_commits: health.commit_count,
                prs_merged,
                prs_open,
                contributor_count: work.contributors.len(),
            },
            commits_by_contributor,
            commits_by_repository,
            top_contributors,
            repositories,
            open_pull_requests,
            recent_commits,
            warnings,
            work,
            health,
            insights,
            feedback,
        }
    }
}
