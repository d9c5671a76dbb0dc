use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::text::first_line;

use crate::conventional::{self, parse_header};
use crate::timeclock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

impl SentimentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitAnalysis {
    pub sentiment_class: SentimentClass,
    pub sentiment_score: f32,
    pub conventional_type: Option<String>,
    pub scope: Option<String>,
    pub is_breaking_change: bool,
    pub blocker_tags: BTreeSet<String>,
    pub achievement_tags: BTreeSet<String>,
    pub is_late_night: bool,
    pub is_weekend: bool,
}

/// One sentiment category: a label and the phrases that trigger it.
/// A category contributes its weight at most once per message no matter
/// how many of its phrases occur.
#[derive(Debug, Clone, Copy)]
pub struct PhraseCategory {
    pub name: &'static str,
    pub phrases: &'static [&'static str],
}

const fn category(name: &'static str, phrases: &'static [&'static str]) -> PhraseCategory {
    PhraseCategory { name, phrases }
}

const POSITIVE_CATEGORIES: &[PhraseCategory] = &[
    category(
        "completion",
        &["finish", "complete", "done", "landed", "wrap up", "wrapped up"],
    ),
    category(
        "success",
        &["success", "passing", "all green", "works now", "finally works"],
    ),
    category(
        "improvement",
        &["improve", "optimiz", "optimis", "speed up", "faster", "upgrade", "migrat"],
    ),
    category(
        "creation",
        &["add ", "added ", "create", "implement", "introduce", "scaffold"],
    ),
    category("cheer", &["finally", "yay", "woohoo", "awesome", "huge win", "🎉"]),
    category(
        "simplification",
        &["simplif", "streamline", "deduplicate", "declutter", "remove dead"],
    ),
];

const NEGATIVE_CATEGORIES: &[PhraseCategory] = &[
    category(
        "blocked",
        &["blocked", "blocking", "blocker", "stuck", "waiting on", "waiting for", "held up"],
    ),
    category(
        "broken",
        &["broken", "breaks", "failing", "fails", "error", "crash", "regression", "not working"],
    ),
    category("revert", &["revert", "roll back", "rollback", "back out"]),
    category(
        "workaround",
        &["hack", "workaround", "kludge", "band-aid", "stopgap", "temporary fix"],
    ),
    category(
        "wip",
        &["wip", "work in progress", "incomplete", "unfinished", "half-done"],
    ),
    category(
        "frustration",
        &["ugh", "argh", "annoying", "frustrat", "wtf", "why is this"],
    ),
];

const BLOCKER_TAGS: &[PhraseCategory] = &[
    category("blocked", &["blocked", "blocker", "stuck"]),
    category("waiting", &["waiting on", "waiting for", "awaiting"]),
    category("pending", &["pending"]),
    category("wip", &["wip", "work in progress"]),
    category("needs-input", &["needs input", "need input", "needs decision", "tbd"]),
    category("workaround", &["todo", "workaround", "fixme", "temporary fix"]),
];

const ACHIEVEMENT_TAGS: &[PhraseCategory] = &[
    category("completed", &["complete"]),
    category("finished", &["finish"]),
    category("shipped", &["ship"]),
    category("launched", &["launch"]),
    category("resolved", &["resolve"]),
    category("implemented", &["implement"]),
    category("integrated", &["integrat"]),
];

/// Substrings counting as a fix verb for the bug-fixed achievement.
const FIX_VERBS: &[&str] = &["fix"];

/// Message-level analyzer. The phrase tables live on the instance so
/// tests can run variants; `Default` wires the standard lexicon.
pub struct CommitAnalyzer {
    version: &'static str,
    positive: &'static [PhraseCategory],
    negative: &'static [PhraseCategory],
    blockers: &'static [PhraseCategory],
    achievements: &'static [PhraseCategory],
}

impl Default for CommitAnalyzer {
    fn default() -> Self {
        Self {
            version: "sentiment_v1",
            positive: POSITIVE_CATEGORIES,
            negative: NEGATIVE_CATEGORIES,
            blockers: BLOCKER_TAGS,
            achievements: ACHIEVEMENT_TAGS,
        }
    }
}

impl CommitAnalyzer {
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Analyze one commit message. Never fails; an empty message yields a
    /// neutral analysis with no tags. Purely a function of its inputs.
    pub fn analyze(
        &self,
        message: &str,
        authored_at: DateTime<Utc>,
        tz_offset_hours: i32,
    ) -> CommitAnalysis {
        let lower = message.to_lowercase();
        let header = parse_header(first_line(message));
        // The `!` marker or the literal footer token, counted once.
        let is_breaking_change = header.breaking_marker || message.contains("BREAKING CHANGE");

        let mut score = 0.0f32;
        for cat in self.positive {
            if cat.phrases.iter().any(|p| lower.contains(p)) {
                score += 1.0;
            }
        }
        for cat in self.negative {
            if cat.phrases.iter().any(|p| lower.contains(p)) {
                score -= 1.0;
            }
        }
        if let Some(commit_type) = header.commit_type.as_deref() {
            score += conventional::type_weight(commit_type);
        }
        if is_breaking_change {
            score -= 0.5;
        }

        let sentiment_class = if score >= 0.5 {
            SentimentClass::Positive
        } else if score <= -0.5 {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        };

        let blocker_tags = collect_tags(self.blockers, &lower);
        let mut achievement_tags = collect_tags(self.achievements, &lower);
        if FIX_VERBS.iter().any(|v| lower.contains(v)) && lower.contains("bug") {
            achievement_tags.insert("bug-fixed".to_string());
        }

        let clock = timeclock::local_clock(authored_at, tz_offset_hours);

        CommitAnalysis {
            sentiment_class,
            sentiment_score: score,
            conventional_type: header.commit_type,
            scope: header.scope,
            is_breaking_change,
            blocker_tags,
            achievement_tags,
            is_late_night: timeclock::is_late_night(clock.hour),
            is_weekend: timeclock::is_weekend(clock.weekday),
        }
    }
}

fn collect_tags(rules: &[PhraseCategory], lower: &str) -> BTreeSet<String> {
    rules
        .iter()
        .filter(|rule| rule.phrases.iter().any(|p| lower.contains(p)))
        .map(|rule| rule.name.to_string())
        .collect()
}
