use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use feedback::comment::RawComment;
use feedback::linear::{InitiativePayload, LinearApi, LinkRef, ProjectRef};
use feedback::notion::NotionApi;
use feedback::FeedbackAggregator;

const PAGE_URL: &str = "https://www.notion.so/acme/Design-0123456789abcdef0123456789abcdef";
const PAGE_ID: &str = "01234567-89ab-cdef-0123-456789abcdef";

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn raw(id: &str, author: &str, body: &str, created_at: DateTime<Utc>) -> RawComment {
    RawComment {
        id: id.to_string(),
        item_label: format!("item for {id}"),
        item_url: format!("https://example.test/{id}"),
        author: author.to_string(),
        body: body.to_string(),
        created_at,
    }
}

fn project(id: &str, name: &str) -> ProjectRef {
    ProjectRef {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("https://linear.app/acme/project/{id}"),
    }
}

#[derive(Default)]
struct StubLinear {
    initiative: Option<InitiativePayload>,
    comments: HashMap<String, Vec<RawComment>>,
    failing_projects: Vec<String>,
}

#[async_trait]
impl LinearApi for StubLinear {
    async fn initiative(&self, _id: &str) -> Result<InitiativePayload> {
        self.initiative
            .clone()
            .ok_or_else(|| anyhow!("initiative unavailable"))
    }

    async fn project_comments(&self, project: &ProjectRef) -> Result<Vec<RawComment>> {
        if self.failing_projects.contains(&project.id) {
            return Err(anyhow!("project unavailable"));
        }
        Ok(self.comments.get(&project.id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct StubNotion {
    comments: HashMap<String, Vec<RawComment>>,
    fail_all: bool,
}

#[async_trait]
impl NotionApi for StubNotion {
    async fn page_comments(&self, page_id: &str) -> Result<Vec<RawComment>> {
        if self.fail_all {
            return Err(anyhow!("notion unavailable"));
        }
        Ok(self.comments.get(page_id).cloned().unwrap_or_default())
    }
}

fn aggregator(linear: StubLinear, notion: StubNotion) -> FeedbackAggregator {
    FeedbackAggregator::new(
        Arc::new(linear),
        Arc::new(notion),
        "init-1",
        vec!["jeff harris".to_string()],
        true,
        true,
    )
}

fn initiative(projects: Vec<ProjectRef>, links: Vec<LinkRef>) -> InitiativePayload {
    InitiativePayload {
        name: "Billing revamp".to_string(),
        projects,
        links,
    }
}

#[tokio::test]
async fn comments_merge_newest_first_across_platforms() {
    let mut linear = StubLinear {
        initiative: Some(initiative(
            vec![project("p1", "Invoicing")],
            vec![LinkRef {
                label: "Design notes".to_string(),
                url: PAGE_URL.to_string(),
            }],
        )),
        ..StubLinear::default()
    };
    linear.comments.insert(
        "p1".to_string(),
        vec![
            raw("l1", "Anna Kern", "retries capped at five.", at(4, 10)),
            raw("l2", "Jeff Harris", "should we cap retries?", at(6, 9)),
        ],
    );
    let mut notion = StubNotion::default();
    notion.comments.insert(
        PAGE_ID.to_string(),
        vec![raw("n1", "Anna Kern", "updated the diagram.", at(5, 16))],
    );

    let report = aggregator(linear, notion).gather().await;

    assert_eq!(report.initiative_name, "Billing revamp");
    let ids: Vec<&str> = report.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["l2", "n1", "l1"]);
    assert_eq!(report.platform_counts["linear"], 2);
    assert_eq!(report.platform_counts["notion"], 1);
    assert_eq!(report.author_counts["Anna Kern"], 2);
    assert!(report.degraded.is_empty());
}

#[tokio::test]
async fn pending_counts_only_my_own_questions() {
    let mut linear = StubLinear {
        initiative: Some(initiative(vec![project("p1", "Invoicing")], Vec::new())),
        ..StubLinear::default()
    };
    linear.comments.insert(
        "p1".to_string(),
        vec![
            raw("l1", "Jeff Harris", "should we cap retries?", at(6, 9)),
            raw("l2", "Anna Kern", "is the cap configurable?", at(6, 10)),
            raw("l3", "Jeff Harris", "capped at five now.", at(6, 11)),
        ],
    );

    let report = aggregator(linear, StubNotion::default()).gather().await;

    assert_eq!(report.pending_count, 1);
    let pending: Vec<&str> = report
        .comments
        .iter()
        .filter(|c| c.is_pending)
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(pending, vec!["l1"]);
    // Anna's question is a question, just never pending.
    let anna = report.comments.iter().find(|c| c.id == "l2").unwrap();
    assert!(anna.is_question);
    assert!(!anna.is_pending);
}

#[tokio::test]
async fn merge_caps_at_twenty_keeping_the_newest() {
    let mut linear = StubLinear {
        initiative: Some(initiative(vec![project("p1", "Invoicing")], Vec::new())),
        ..StubLinear::default()
    };
    let many: Vec<RawComment> = (0..30)
        .map(|i| raw(&format!("l{i}"), "Anna Kern", "note", at(1, 0) + chrono::Duration::hours(i)))
        .collect();
    linear.comments.insert("p1".to_string(), many);

    let report = aggregator(linear, StubNotion::default()).gather().await;

    assert_eq!(report.comments.len(), 20);
    assert_eq!(report.comments[0].id, "l29");
    assert_eq!(report.comments[19].id, "l10");
}

#[tokio::test]
async fn only_five_sub_projects_are_queried() {
    let projects: Vec<ProjectRef> =
        (0..8).map(|i| project(&format!("p{i}"), &format!("Project {i}"))).collect();
    let mut linear = StubLinear {
        initiative: Some(initiative(projects, Vec::new())),
        ..StubLinear::default()
    };
    for i in 0..8 {
        linear.comments.insert(
            format!("p{i}"),
            vec![raw(&format!("l{i}"), "Anna Kern", "note", at(2, i))],
        );
    }

    let report = aggregator(linear, StubNotion::default()).gather().await;

    assert_eq!(report.comments.len(), 5);
    assert!(report.comments.iter().all(|c| {
        let n: u32 = c.id[1..].parse().unwrap();
        n < 5
    }));
}

#[tokio::test]
async fn pending_questions_survive_the_display_cap() {
    let mut linear = StubLinear {
        initiative: Some(initiative(vec![project("p1", "Invoicing")], Vec::new())),
        ..StubLinear::default()
    };
    let mut comments =
        vec![raw("old", "Jeff Harris", "should we cap retries?", at(1, 0))];
    comments.extend((0..25).map(|i| {
        raw(
            &format!("l{i}"),
            "Anna Kern",
            "note",
            at(2, 0) + chrono::Duration::hours(i),
        )
    }));
    linear.comments.insert("p1".to_string(), comments);

    let report = aggregator(linear, StubNotion::default()).gather().await;

    // The question fell off the list but not out of the count.
    assert_eq!(report.comments.len(), 20);
    assert!(report.comments.iter().all(|c| c.id != "old"));
    assert_eq!(report.pending_count, 1);
}

#[tokio::test]
async fn failing_resources_degrade_without_aborting() {
    let mut linear = StubLinear {
        initiative: Some(initiative(
            vec![project("p1", "Invoicing"), project("p2", "Dunning")],
            vec![LinkRef {
                label: "Design notes".to_string(),
                url: PAGE_URL.to_string(),
            }],
        )),
        failing_projects: vec!["p2".to_string()],
        ..StubLinear::default()
    };
    linear.comments.insert(
        "p1".to_string(),
        vec![raw("l1", "Anna Kern", "retries capped.", at(4, 10))],
    );
    let notion = StubNotion {
        fail_all: true,
        ..StubNotion::default()
    };

    let report = aggregator(linear, notion).gather().await;

    assert_eq!(report.comments.len(), 1);
    assert_eq!(report.degraded.len(), 2);
    assert!(report.degraded.iter().any(|d| d.contains("Dunning")));
    assert!(report.degraded.iter().any(|d| d.contains("Design notes")));
}

#[tokio::test]
async fn unreachable_initiative_yields_empty_with_label() {
    let report = aggregator(StubLinear::default(), StubNotion::default())
        .gather()
        .await;

    assert!(report.comments.is_empty());
    assert!(report.quick_links.is_empty());
    assert_eq!(report.degraded.len(), 1);
    assert!(report.degraded[0].contains("initiative fetch failed"));
}

#[tokio::test]
async fn missing_linear_key_short_circuits() {
    let aggregator = FeedbackAggregator::new(
        Arc::new(StubLinear::default()),
        Arc::new(StubNotion::default()),
        "init-1",
        Vec::new(),
        false,
        true,
    );

    let report = aggregator.gather().await;

    assert!(report.comments.is_empty());
    assert_eq!(report.degraded.len(), 1);
    assert!(report.degraded[0].contains("api key not configured"));
}

#[tokio::test]
async fn quick_links_cover_projects_and_linked_pages() {
    let linear = StubLinear {
        initiative: Some(initiative(
            vec![project("p1", "Invoicing")],
            vec![LinkRef {
                label: String::new(),
                url: "https://docs.acme.dev/runbooks/billing".to_string(),
            }],
        )),
        ..StubLinear::default()
    };

    let report = aggregator(linear, StubNotion::default()).gather().await;

    assert_eq!(report.quick_links.len(), 2);
    assert_eq!(report.quick_links[0].label, "Invoicing");
    // Unlabeled links fall back to showing their URL.
    assert_eq!(report.quick_links[1].label, "https://docs.acme.dev/runbooks/billing");
}
