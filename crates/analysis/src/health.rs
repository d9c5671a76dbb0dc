use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::commit::{CommitAnalysis, SentimentClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnoutRisk {
    Low,
    Medium,
    High,
}

impl BurnoutRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamHealth {
    pub commit_count: usize,
    pub overall_sentiment: SentimentClass,
    /// Mean per-commit score, rounded to two decimals.
    pub average_sentiment_score: f32,
    pub late_night_count: usize,
    pub weekend_count: usize,
    pub breaking_change_count: usize,
    pub burnout_risk: BurnoutRisk,
    /// Ranked by count, top five.
    pub top_blockers: Vec<TagCount>,
    /// Ranked by count, top five.
    pub top_achievements: Vec<TagCount>,
}

const MAX_RANKED_TAGS: usize = 5;

/// Off-hours share above which burnout risk is high, then medium.
const BURNOUT_HIGH: f32 = 0.4;
const BURNOUT_MEDIUM: f32 = 0.2;

/// Collapse per-commit analyses into one team snapshot. Empty input is a
/// calm default: neutral sentiment, low risk, zero counts.
pub fn aggregate(analyses: &[CommitAnalysis]) -> TeamHealth {
    let commit_count = analyses.len();
    if commit_count == 0 {
        return TeamHealth {
            commit_count: 0,
            overall_sentiment: SentimentClass::Neutral,
            average_sentiment_score: 0.0,
            late_night_count: 0,
            weekend_count: 0,
            breaking_change_count: 0,
            burnout_risk: BurnoutRisk::Low,
            top_blockers: Vec::new(),
            top_achievements: Vec::new(),
        };
    }

    let total_score: f32 = analyses.iter().map(|a| a.sentiment_score).sum();
    let average_sentiment_score = round2(total_score / commit_count as f32);
    let overall_sentiment = if average_sentiment_score >= 0.3 {
        SentimentClass::Positive
    } else if average_sentiment_score <= -0.3 {
        SentimentClass::Negative
    } else {
        SentimentClass::Neutral
    };

    let late_night_count = analyses.iter().filter(|a| a.is_late_night).count();
    let weekend_count = analyses.iter().filter(|a| a.is_weekend).count();
    let breaking_change_count = analyses.iter().filter(|a| a.is_breaking_change).count();

    // A commit late at night on a weekend counts in both terms; the
    // ratio is intentionally the plain sum over total.
    let off_hours_ratio = (late_night_count + weekend_count) as f32 / commit_count as f32;
    let burnout_risk = if off_hours_ratio > BURNOUT_HIGH {
        BurnoutRisk::High
    } else if off_hours_ratio > BURNOUT_MEDIUM {
        BurnoutRisk::Medium
    } else {
        BurnoutRisk::Low
    };

    let top_blockers = rank_tags(analyses.iter().flat_map(|a| a.blocker_tags.iter()));
    let top_achievements = rank_tags(analyses.iter().flat_map(|a| a.achievement_tags.iter()));

    TeamHealth {
        commit_count,
        overall_sentiment,
        average_sentiment_score,
        late_night_count,
        weekend_count,
        breaking_change_count,
        burnout_risk,
        top_blockers,
        top_achievements,
    }
}

/// Human-readable observations derived from a snapshot, in a fixed order
/// so the dashboard renders stably.
pub fn explain(analyses: &[CommitAnalysis], health: &TeamHealth) -> Vec<String> {
    let mut insights = Vec::new();
    if health.commit_count == 0 {
        insights.push("No commits in this window.".to_string());
        return insights;
    }

    insights.push(format!(
        "Overall team sentiment is {} (average score {:.2}).",
        health.overall_sentiment.as_str(),
        health.average_sentiment_score
    ));

    if health.breaking_change_count > 0 {
        insights.push(format!(
            "{} breaking {} landed in this window.",
            health.breaking_change_count,
            plural(health.breaking_change_count, "change", "changes")
        ));
    }

    if health.burnout_risk != BurnoutRisk::Low {
        let off_hours = health.late_night_count + health.weekend_count;
        let percent =
            (off_hours as f32 / health.commit_count as f32 * 100.0).round() as i64;
        insights.push(format!(
            "Burnout risk is {}: {}% of commits happened late at night or on weekends.",
            health.burnout_risk.as_str(),
            percent
        ));
    }

    if !health.top_blockers.is_empty() {
        insights.push(format!(
            "Most common blockers: {}.",
            format_tags(&health.top_blockers, 3)
        ));
    }

    if !health.top_achievements.is_empty() {
        insights.push(format!(
            "Wins this period: {}.",
            format_tags(&health.top_achievements, 3)
        ));
    }

    let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for analysis in analyses {
        if let Some(commit_type) = analysis.conventional_type.as_deref() {
            *type_counts.entry(commit_type).or_insert(0) += 1;
        }
    }
    if !type_counts.is_empty() {
        let mut ranked: Vec<(&str, usize)> = type_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let mix = ranked
            .iter()
            .take(3)
            .map(|(commit_type, count)| format!("{commit_type} ({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        insights.push(format!("Commit mix: {mix}."));
    }

    insights
}

fn rank_tags<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in tags {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(MAX_RANKED_TAGS);
    ranked
}

fn format_tags(tags: &[TagCount], limit: usize) -> String {
    tags.iter()
        .take(limit)
        .map(|t| format!("{} ({})", t.tag, t.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn analysis(score: f32, late: bool, weekend: bool) -> CommitAnalysis {
        CommitAnalysis {
            sentiment_class: if score >= 0.5 {
                SentimentClass::Positive
            } else if score <= -0.5 {
                SentimentClass::Negative
            } else {
                SentimentClass::Neutral
            },
            sentiment_score: score,
            conventional_type: None,
            scope: None,
            is_breaking_change: false,
            blocker_tags: BTreeSet::new(),
            achievement_tags: BTreeSet::new(),
            is_late_night: late,
            is_weekend: weekend,
        }
    }

    fn with_tags(mut base: CommitAnalysis, blockers: &[&str], wins: &[&str]) -> CommitAnalysis {
        base.blocker_tags = blockers.iter().map(|t| t.to_string()).collect();
        base.achievement_tags = wins.iter().map(|t| t.to_string()).collect();
        base
    }

    #[test]
    fn empty_window_is_calm() {
        let health = aggregate(&[]);
        assert_eq!(health.commit_count, 0);
        assert_eq!(health.overall_sentiment, SentimentClass::Neutral);
        assert_eq!(health.burnout_risk, BurnoutRisk::Low);
        assert_eq!(health.average_sentiment_score, 0.0);
    }

    #[test]
    fn five_late_night_commits_of_ten_mean_high_risk() {
        let mut analyses = Vec::new();
        for i in 0..10 {
            analyses.push(analysis(0.0, i < 5, false));
        }
        let health = aggregate(&analyses);
        assert_eq!(health.late_night_count, 5);
        assert_eq!(health.burnout_risk, BurnoutRisk::High);
    }

    #[test]
    fn risk_never_drops_when_off_hours_grow() {
        fn risk_rank(risk: BurnoutRisk) -> u8 {
            match risk {
                BurnoutRisk::Low => 0,
                BurnoutRisk::Medium => 1,
                BurnoutRisk::High => 2,
            }
        }
        let total = 10usize;
        let mut previous = 0u8;
        for late in 0..=total {
            let analyses: Vec<CommitAnalysis> =
                (0..total).map(|i| analysis(0.0, i < late, false)).collect();
            let rank = risk_rank(aggregate(&analyses).burnout_risk);
            assert!(rank >= previous, "risk dropped at late={late}");
            previous = rank;
        }
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let analyses = vec![analysis(1.0, false, false), analysis(0.0, false, false), analysis(0.0, false, false)];
        let health = aggregate(&analyses);
        assert_eq!(health.average_sentiment_score, 0.33);
        assert_eq!(health.overall_sentiment, SentimentClass::Positive);
    }

    #[test]
    fn blockers_and_achievements_are_ranked() {
        let base = || analysis(0.0, false, false);
        let analyses = vec![
            with_tags(base(), &["blocked", "wip"], &[]),
            with_tags(base(), &["blocked"], &["shipped"]),
            with_tags(base(), &["waiting"], &["shipped", "resolved"]),
        ];
        let health = aggregate(&analyses);
        assert_eq!(health.top_blockers[0].tag, "blocked");
        assert_eq!(health.top_blockers[0].count, 2);
        assert_eq!(health.top_achievements[0].tag, "shipped");
        assert_eq!(health.top_achievements[0].count, 2);
    }

    #[test]
    fn explain_orders_insights_stably() {
        let mut first = analysis(1.0, true, false);
        first.is_breaking_change = true;
        first.conventional_type = Some("feat".to_string());
        let mut second = analysis(1.0, true, false);
        second.conventional_type = Some("feat".to_string());
        let analyses = vec![first, second];
        let health = aggregate(&analyses);
        let insights = explain(&analyses, &health);

        assert!(insights[0].starts_with("Overall team sentiment is positive"));
        assert!(insights.iter().any(|i| i.contains("1 breaking change landed")));
        assert!(insights.iter().any(|i| i.starts_with("Burnout risk is high")));
        assert!(insights.last().unwrap().contains("feat (2)"));
    }

    #[test]
    fn explain_handles_the_empty_window() {
        let health = aggregate(&[]);
        let insights = explain(&[], &health);
        assert_eq!(insights, vec!["No commits in this window.".to_string()]);
    }
}
