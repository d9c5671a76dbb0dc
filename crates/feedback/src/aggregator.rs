use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use common::config::{LinearConfig, NotionConfig, TeamConfig};

use crate::comment::{classify, FeedbackComment, QuickLink};
use crate::linear::{LinearApi, LinearHttpClient, LinkRef, ProjectRef};
use crate::metrics;
use crate::notion::{parse_page_id, NotionApi, NotionHttpClient};

const MAX_COMMENTS: usize = 20;
const MAX_SUB_PROJECTS: usize = 5;

/// Cross-platform feedback for one initiative, merged and time-sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackReport {
    pub initiative_name: String,
    /// Newest first, at most twenty.
    pub comments: Vec<FeedbackComment>,
    pub quick_links: Vec<QuickLink>,
    /// My own questions still awaiting an answer, counted across every
    /// fetched comment, not just the twenty shown.
    pub pending_count: usize,
    pub platform_counts: BTreeMap<String, usize>,
    pub author_counts: BTreeMap<String, usize>,
    /// Resources that could not be fetched; surfaced as report warnings,
    /// never serialized into the dashboard payload itself.
    #[serde(skip)]
    pub degraded: Vec<String>,
}

/// Queries the initiative graph and its linked wiki pages, classifies
/// every comment, and merges the result. Independent of the commit/PR
/// branch of the pipeline.
pub struct FeedbackAggregator {
    linear: Arc<dyn LinearApi>,
    notion: Arc<dyn NotionApi>,
    initiative_id: String,
    self_names: Vec<String>,
    has_linear_key: bool,
    has_notion_key: bool,
}

impl FeedbackAggregator {
    pub fn new(
        linear: Arc<dyn LinearApi>,
        notion: Arc<dyn NotionApi>,
        initiative_id: impl Into<String>,
        self_names: Vec<String>,
        has_linear_key: bool,
        has_notion_key: bool,
    ) -> Self {
        Self {
            linear,
            notion,
            initiative_id: initiative_id.into(),
            self_names,
            has_linear_key,
            has_notion_key,
        }
    }

    pub fn from_config(
        linear_cfg: &LinearConfig,
        notion_cfg: &NotionConfig,
        team: &TeamConfig,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self::new(
            Arc::new(LinearHttpClient::from_config(linear_cfg, timeout)?),
            Arc::new(NotionHttpClient::from_config(notion_cfg, timeout)?),
            linear_cfg.initiative_id.clone(),
            team.self_names.clone(),
            linear_cfg.api_key.is_some(),
            notion_cfg.api_key.is_some(),
        ))
    }

    pub async fn gather(&self) -> FeedbackReport {
        let mut report = FeedbackReport::default();

        if self.initiative_id.is_empty() {
            report
                .degraded
                .push("feedback: no initiative configured".to_string());
            return report;
        }
        if !self.has_linear_key {
            warn!("linear api key not configured; skipping feedback");
            report
                .degraded
                .push("feedback linear: api key not configured".to_string());
            return report;
        }

        let initiative = match self.linear.initiative(&self.initiative_id).await {
            Ok(initiative) => initiative,
            Err(err) => {
                warn!(initiative = %self.initiative_id, error = %err, "initiative fetch failed");
                report
                    .degraded
                    .push("feedback linear: initiative fetch failed".to_string());
                return report;
            }
        };
        report.initiative_name = initiative.name;
        report.quick_links = quick_links(&initiative.projects, &initiative.links);

        let projects: Vec<&ProjectRef> =
            initiative.projects.iter().take(MAX_SUB_PROJECTS).collect();
        let mut pages: Vec<(&LinkRef, String)> = initiative
            .links
            .iter()
            .filter_map(|link| parse_page_id(&link.url).map(|id| (link, id)))
            .collect();
        if !pages.is_empty() && !self.has_notion_key {
            warn!("notion api key not configured; skipping linked wiki pages");
            report
                .degraded
                .push("feedback notion: api key not configured".to_string());
            pages.clear();
        }

        let linear_fetches = projects.iter().map(|project| self.linear.project_comments(project));
        let notion_fetches = pages.iter().map(|(_, id)| self.notion.page_comments(id));
        let (linear_results, notion_results) = futures::join!(
            futures::future::join_all(linear_fetches),
            futures::future::join_all(notion_fetches),
        );

        let mut comments = Vec::new();
        for (project, result) in projects.iter().zip(linear_results) {
            match result {
                Ok(raw) => {
                    metrics::COMMENTS_FETCHED_TOTAL
                        .with_label_values(&["linear"])
                        .inc_by(raw.len() as u64);
                    comments.extend(
                        raw.into_iter()
                            .map(|raw| classify(raw, "linear", &self.self_names)),
                    );
                }
                Err(err) => {
                    warn!(project = %project.name, error = %err, "project comment fetch failed; skipping");
                    report.degraded.push(format!(
                        "feedback linear \"{}\": comment fetch failed",
                        project.name
                    ));
                }
            }
        }

        for ((link, _), result) in pages.iter().zip(notion_results) {
            match result {
                Ok(raw) => {
                    metrics::COMMENTS_FETCHED_TOTAL
                        .with_label_values(&["notion"])
                        .inc_by(raw.len() as u64);
                    comments.extend(raw.into_iter().map(|mut raw| {
                        if !link.label.is_empty() {
                            raw.item_label = link.label.clone();
                        }
                        classify(raw, "notion", &self.self_names)
                    }));
                }
                Err(err) => {
                    warn!(page = %link.url, error = %err, "page comment fetch failed; skipping");
                    report.degraded.push(format!(
                        "feedback notion \"{}\": comment fetch failed",
                        if link.label.is_empty() { &link.url } else { &link.label }
                    ));
                }
            }
        }

        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        // Pending is counted over everything fetched; the display cap
        // below must not hide an unanswered question.
        report.pending_count = comments.iter().filter(|c| c.is_pending).count();
        comments.truncate(MAX_COMMENTS);

        for comment in &comments {
            *report
                .platform_counts
                .entry(comment.platform.clone())
                .or_insert(0) += 1;
            *report
                .author_counts
                .entry(comment.author.clone())
                .or_insert(0) += 1;
        }
        report.comments = comments;
        report
    }
}

fn quick_links(projects: &[ProjectRef], links: &[LinkRef]) -> Vec<QuickLink> {
    let mut out = Vec::new();
    for project in projects {
        if !project.url.is_empty() {
            out.push(QuickLink {
                label: project.name.clone(),
                url: project.url.clone(),
            });
        }
    }
    for link in links {
        out.push(QuickLink {
            label: if link.label.is_empty() {
                link.url.clone()
            } else {
                link.label.clone()
            },
            url: link.url.clone(),
        });
    }
    out
}
