use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use common::text::first_line;
use identity::IdentityResolver;
use sources::records::{CommitRecord, PullRequestRecord};

use crate::conventional::parse_header;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributorProfile {
    pub canonical_name: String,
    /// Ticket id plus the most frequent content words, at most three.
    pub focus_tags: Vec<String>,
    /// Cleaned change descriptions, newest-first in scan order, at most five.
    pub key_changes: Vec<String>,
    pub domains: BTreeSet<String>,
    pub commit_count: usize,
    pub pr_count: usize,
    pub branches: BTreeSet<String>,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainFocus {
    pub domain: String,
    pub commit_count: usize,
    /// Up to two example subjects that placed commits in this domain.
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchActivity {
    pub name: String,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkReport {
    /// Sorted by commit count, ties alphabetical.
    pub contributors: Vec<ContributorProfile>,
    /// Top five domains by commit count.
    pub team_focus: Vec<DomainFocus>,
    /// Up to five initiative fragments lifted from commit messages.
    pub key_initiatives: Vec<String>,
    /// Top ten non-default branches by commit count.
    pub active_branches: Vec<BranchActivity>,
    pub summary: String,
}

const MAX_FOCUS_TAGS: usize = 3;
const MAX_KEY_CHANGES: usize = 5;
const MAX_TEAM_FOCUS: usize = 5;
const MAX_INITIATIVES: usize = 5;
const MAX_ACTIVE_BRANCHES: usize = 10;
const MIN_CHANGE_CHARS: usize = 10;

/// Branch heads that name a topic, not a person. The bare `<owner>/...`
/// rule must not fire on these.
const TOPIC_PREFIXES: &[&str] = &[
    "feature", "feat", "bugfix", "fix", "hotfix", "release", "chore", "task", "topic", "users",
    "dev",
];

/// Branches that never count as "active" topic branches.
const DEFAULT_BRANCHES: &[&str] = &["main", "master", "develop", "trunk"];

/// Ordered keyword-to-domain table. A token matches a keyword exactly,
/// or by prefix when the keyword is four characters or longer.
const DOMAIN_KEYWORDS: &[(&str, &str)] = &[
    ("auth", "authentication"),
    ("login", "authentication"),
    ("oauth", "authentication"),
    ("sso", "authentication"),
    ("session", "authentication"),
    ("billing", "billing"),
    ("payment", "billing"),
    ("invoice", "billing"),
    ("subscription", "billing"),
    ("stripe", "billing"),
    ("api", "api"),
    ("endpoint", "api"),
    ("graphql", "api"),
    ("webhook", "api"),
    ("frontend", "frontend"),
    ("ui", "frontend"),
    ("css", "frontend"),
    ("component", "frontend"),
    ("layout", "frontend"),
    ("database", "database"),
    ("db", "database"),
    ("schema", "database"),
    ("migrat", "database"),
    ("sql", "database"),
    ("query", "database"),
    ("deploy", "infrastructure"),
    ("docker", "infrastructure"),
    ("kubernetes", "infrastructure"),
    ("terraform", "infrastructure"),
    ("infra", "infrastructure"),
    ("ci", "infrastructure"),
    ("test", "testing"),
    ("coverage", "testing"),
    ("e2e", "testing"),
    ("flaky", "testing"),
    ("docs", "documentation"),
    ("readme", "documentation"),
    ("changelog", "documentation"),
    ("wiki", "documentation"),
    ("perf", "performance"),
    ("cache", "performance"),
    ("latency", "performance"),
    ("optim", "performance"),
    ("security", "security"),
    ("vuln", "security"),
    ("cve", "security"),
    ("encrypt", "security"),
    ("xss", "security"),
];

/// Words too generic to describe anyone's focus.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "onto", "that", "this", "are", "was", "were",
    "been", "being", "has", "have", "had", "not", "now", "new", "old", "out", "off", "per", "via",
    "when", "after", "before", "more", "some", "all", "its", "our", "but", "can", "will", "should",
    "merge", "branch", "pull", "request", "commit", "add", "added", "adds", "fix", "fixes",
    "fixed", "update", "updated", "updates", "remove", "removed", "feat", "chore", "docs", "wip",
    "refactor", "revert",
];

static TICKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]{1,9}-\d{1,6}\b").expect("invalid ticket regex"));

static TICKET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[?[A-Z][A-Z0-9]{1,9}-\d{1,6}\]?[\s:\-]+").expect("invalid prefix regex")
});

static ACTION_VERBS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^(?i)add(?:s|ed|ing)?\b", "Add"),
        (r"^(?i)fix(?:es|ed|ing)?\b", "Fix"),
        (r"^(?i)updat(?:e|es|ed|ing)\b", "Update"),
        (r"^(?i)remov(?:e|es|ed|ing)\b", "Remove"),
        (r"^(?i)refactor(?:s|ed|ing)?\b", "Refactor"),
        (r"^(?i)implement(?:s|ed|ing)?\b", "Implement"),
        (r"^(?i)improv(?:e|es|ed|ing)\b", "Improve"),
        (r"^(?i)migrat(?:e|es|ed|ing)\b", "Migrate"),
        (r"^(?i)creat(?:e|es|ed|ing)\b", "Create"),
        (r"^(?i)upgrad(?:e|es|ed|ing)\b", "Upgrade"),
        (r"^(?i)introduc(?:e|es|ed|ing)\b", "Introduce"),
    ]
    .into_iter()
    .map(|(pattern, verb)| (Regex::new(pattern).expect("invalid verb regex"), verb))
    .collect()
});

static INITIATIVE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:implement(?:ed|ing)?|build(?:ing)?|built|creat(?:e|ed|ing)|design(?:ed|ing)?|integrat(?:e|ed|ing)|migrat(?:e|ed|ing)|launch(?:ed|ing)?|roll(?:ed|ing)? out)\s+(?:the\s+|a\s+|an\s+)?([a-z0-9][a-z0-9 /._-]{7,59})",
        r"(?i)\b(?:start(?:ed|ing)?\s+(?:on|work\s+on)|kick(?:ed|ing)?\s+off)\s+(?:the\s+)?([a-z0-9][a-z0-9 /._-]{7,59})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid initiative regex"))
    .collect()
});

#[derive(Default)]
struct ProfileAccum {
    ticket: Option<String>,
    words: Vec<(String, usize)>,
    key_changes: Vec<String>,
    domains: BTreeSet<String>,
    commit_count: usize,
    pr_count: usize,
    branches: BTreeSet<String>,
    last_active: Option<DateTime<Utc>>,
}

impl ProfileAccum {
    fn touch(&mut self, at: DateTime<Utc>) {
        self.last_active = Some(self.last_active.map_or(at, |prev| prev.max(at)));
    }

    fn bump_word(&mut self, word: &str) {
        if let Some(slot) = self.words.iter_mut().find(|(w, _)| w == word) {
            slot.1 += 1;
        } else {
            self.words.push((word.to_string(), 1));
        }
    }
}

#[derive(Default)]
struct DomainAccum {
    commit_count: usize,
    examples: Vec<String>,
}

/// Turns a window of commits and pull requests into per-person work
/// profiles and a team-level digest. Pure: no clock, no network.
#[derive(Debug, Default)]
pub struct WorkIntentExtractor;

impl WorkIntentExtractor {
    pub fn extract(
        &self,
        commits: &[CommitRecord],
        pull_requests: &[PullRequestRecord],
        resolver: &IdentityResolver,
    ) -> WorkReport {
        let mut profiles: BTreeMap<String, ProfileAccum> = BTreeMap::new();
        let mut domains: BTreeMap<&'static str, DomainAccum> = BTreeMap::new();
        let mut branches: BTreeMap<String, usize> = BTreeMap::new();
        let mut initiatives: Vec<String> = Vec::new();

        for commit in commits {
            let owner = branch_owner(&commit.branch)
                .and_then(|candidate| resolver.lookup(candidate))
                .unwrap_or_else(|| resolver.resolve(&commit.author_raw));

            let accum = profiles.entry(owner.display_name.clone()).or_default();
            accum.commit_count += 1;
            accum.branches.insert(commit.branch.clone());
            accum.touch(commit.authored_at);

            let subject = first_line(&commit.message);
            let merge = is_merge_commit(subject);

            if accum.ticket.is_none() {
                if let Some(found) = TICKET_RE.find(&commit.message) {
                    accum.ticket = Some(found.as_str().to_string());
                }
            }
            let scrubbed = TICKET_RE.replace_all(subject, " ");
            for token in tokenize(&scrubbed) {
                if is_content_word(&token) {
                    accum.bump_word(&token);
                }
            }

            let commit_domains = match_domains(&commit.message);
            for domain in commit_domains {
                accum.domains.insert(domain.to_string());
                let slot = domains.entry(domain).or_default();
                slot.commit_count += 1;
                if slot.examples.len() < 2 {
                    slot.examples.push(subject.to_string());
                }
            }

            if !merge {
                let change = clean_change_description(&commit.message);
                if change.chars().count() > MIN_CHANGE_CHARS
                    && !accum
                        .key_changes
                        .iter()
                        .any(|seen| seen.eq_ignore_ascii_case(&change))
                {
                    accum.key_changes.push(change);
                }

                if initiatives.len() < MAX_INITIATIVES {
                    for re in INITIATIVE_RES.iter() {
                        if let Some(caps) = re.captures(subject) {
                            if let Some(fragment) = caps.get(1) {
                                push_initiative(&mut initiatives, fragment.as_str());
                            }
                        }
                    }
                }
            }

            *branches.entry(commit.branch.clone()).or_insert(0) += 1;
        }

        for pr in pull_requests {
            let identity = resolver.resolve(&pr.author_raw);
            let accum = profiles.entry(identity.display_name.clone()).or_default();
            accum.pr_count += 1;
            accum.touch(pr.created_at);
            if let Some(merged_at) = pr.merged_at {
                accum.touch(merged_at);
            }
        }

        let mut contributors: Vec<ContributorProfile> = profiles
            .into_iter()
            .map(|(name, accum)| render_profile(name, accum))
            .collect();
        contributors.sort_by(|a, b| b.commit_count.cmp(&a.commit_count));

        let mut team_focus: Vec<DomainFocus> = domains
            .into_iter()
            .map(|(domain, accum)| DomainFocus {
                domain: domain.to_string(),
                commit_count: accum.commit_count,
                examples: accum.examples,
            })
            .collect();
        team_focus.sort_by(|a, b| b.commit_count.cmp(&a.commit_count));
        team_focus.truncate(MAX_TEAM_FOCUS);

        let mut active_branches: Vec<BranchActivity> = branches
            .into_iter()
            .filter(|(name, _)| !DEFAULT_BRANCHES.iter().any(|d| name.eq_ignore_ascii_case(d)))
            .map(|(name, commit_count)| BranchActivity { name, commit_count })
            .collect();
        active_branches.sort_by(|a, b| b.commit_count.cmp(&a.commit_count));
        active_branches.truncate(MAX_ACTIVE_BRANCHES);

        let summary = render_summary(&team_focus, &contributors);

        WorkReport {
            contributors,
            team_focus,
            key_initiatives: initiatives,
            active_branches,
            summary,
        }
    }
}

/// Owner hinted by the branch naming scheme, if any. Ordered rules:
/// `users/<owner>/...`, `feature/<owner>/<topic>`, `dev/<owner>/...`,
/// then bare `<owner>/...` unless the head names a topic.
fn branch_owner(branch: &str) -> Option<&str> {
    let segments: Vec<&str> = branch.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    let head = segments[0];
    if head.eq_ignore_ascii_case("users") {
        return Some(segments[1]);
    }
    if head.eq_ignore_ascii_case("feature") && segments.len() >= 3 {
        return Some(segments[1]);
    }
    if head.eq_ignore_ascii_case("dev") {
        return Some(segments[1]);
    }
    if !TOPIC_PREFIXES.iter().any(|p| head.eq_ignore_ascii_case(p)) {
        return Some(head);
    }
    None
}

fn is_merge_commit(subject: &str) -> bool {
    subject.starts_with("Merge ") || subject.starts_with("Merged ")
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn is_content_word(token: &str) -> bool {
    token.chars().count() >= 3
        && token.chars().any(|c| c.is_alphabetic())
        && !STOP_WORDS.contains(&token)
}

fn match_domains(message: &str) -> BTreeSet<&'static str> {
    let tokens = tokenize(message);
    let mut matched = BTreeSet::new();
    for (keyword, domain) in DOMAIN_KEYWORDS {
        let hit = tokens.iter().any(|token| {
            token == keyword || (keyword.len() >= 4 && token.starts_with(keyword))
        });
        if hit {
            matched.insert(*domain);
        }
    }
    matched
}

/// Subject line reduced to a readable change description: conventional
/// prefix dropped, leading ticket id stripped, leading verb normalized.
fn clean_change_description(message: &str) -> String {
    let subject = first_line(message);
    let header = parse_header(subject);
    let base = if header.commit_type.is_some() {
        header.description
    } else {
        subject.to_string()
    };
    let stripped = TICKET_PREFIX_RE.replace(&base, "").to_string();

    for (re, verb) in ACTION_VERBS.iter() {
        if let Some(found) = re.find(&stripped) {
            let rest = stripped[found.end()..].trim_start();
            if rest.is_empty() {
                return (*verb).to_string();
            }
            return format!("{verb} {rest}");
        }
    }
    capitalize_first(stripped.trim())
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn push_initiative(initiatives: &mut Vec<String>, fragment: &str) {
    if initiatives.len() >= MAX_INITIATIVES {
        return;
    }
    let cleaned = fragment.trim().trim_end_matches(['.', ',', ';', ':']).trim();
    if cleaned.is_empty() {
        return;
    }
    if initiatives.iter().any(|seen| seen.eq_ignore_ascii_case(cleaned)) {
        return;
    }
    initiatives.push(cleaned.to_string());
}

fn render_profile(canonical_name: String, accum: ProfileAccum) -> ContributorProfile {
    let mut words = accum.words;
    words.sort_by(|a, b| b.1.cmp(&a.1));

    let mut focus_tags: Vec<String> = Vec::new();
    if let Some(ticket) = accum.ticket {
        focus_tags.push(ticket);
    }
    for (word, _) in words.into_iter().take(2) {
        if focus_tags.len() >= MAX_FOCUS_TAGS {
            break;
        }
        focus_tags.push(word);
    }

    let mut key_changes = accum.key_changes;
    key_changes.truncate(MAX_KEY_CHANGES);

    ContributorProfile {
        canonical_name,
        focus_tags,
        key_changes,
        domains: accum.domains,
        commit_count: accum.commit_count,
        pr_count: accum.pr_count,
        branches: accum.branches,
        last_active: accum.last_active,
    }
}

fn render_summary(team_focus: &[DomainFocus], contributors: &[ContributorProfile]) -> String {
    if contributors.is_empty() {
        return "No commit activity in this window.".to_string();
    }

    let mut summary = match team_focus {
        [] => "Activity does not map onto a recognized domain this window.".to_string(),
        [only] => format!("Most activity centers on {}.", only.domain),
        [first, second, ..] => {
            format!("Most activity centers on {} and {}.", first.domain, second.domain)
        }
    };

    let highlights: Vec<String> = contributors
        .iter()
        .filter(|profile| !profile.key_changes.is_empty())
        .take(3)
        .map(|profile| format!("{} is on \"{}\"", profile.canonical_name, profile.key_changes[0]))
        .collect();
    if !highlights.is_empty() {
        summary.push(' ');
        summary.push_str(&highlights.join("; "));
        summary.push('.');
    }
    summary
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use identity::table::{AliasEntry, AliasTable};
    use sources::records::PullRequestState;

    use super::*;

    fn resolver() -> IdentityResolver {
        let table = AliasTable::new(vec![
            AliasEntry {
                key: "jeff".to_string(),
                display_name: "Jeff Harris".to_string(),
                tz_offset_hours: -8,
                tz_label: "PST".to_string(),
            },
            AliasEntry {
                key: "jeharris-eci".to_string(),
                display_name: "Jeff Harris".to_string(),
                tz_offset_hours: -8,
                tz_label: "PST".to_string(),
            },
            AliasEntry {
                key: "anna".to_string(),
                display_name: "Anna Kern".to_string(),
                tz_offset_hours: 1,
                tz_label: "CET".to_string(),
            },
        ]);
        IdentityResolver::new(table, 0, "UTC")
    }

    fn commit(id: &str, author: &str, branch: &str, message: &str) -> CommitRecord {
        CommitRecord {
            short_id: id[..id.len().min(8)].to_string(),
            full_id: id.to_string(),
            author_raw: author.to_string(),
            authored_at: Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap(),
            message: message.to_string(),
            branch: branch.to_string(),
            repo_name: "acme/app".to_string(),
        }
    }

    #[test]
    fn branch_owner_rules_are_ordered() {
        assert_eq!(branch_owner("users/jeff/token-cache"), Some("jeff"));
        assert_eq!(branch_owner("feature/anna/search-index"), Some("anna"));
        assert_eq!(branch_owner("dev/jeff/spike"), Some("jeff"));
        assert_eq!(branch_owner("jeff/spike"), Some("jeff"));
        // Two-segment feature branches carry a topic, not an owner.
        assert_eq!(branch_owner("feature/search-index"), None);
        assert_eq!(branch_owner("fix/login-redirect"), None);
        assert_eq!(branch_owner("main"), None);
    }

    #[test]
    fn branch_owner_must_survive_the_alias_table() {
        let commits = vec![commit(
            "c1",
            "JeHarris-ECI",
            "users/stranger/tidy",
            "chore: tidy configs",
        )];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        // "stranger" is not in the table, so the raw author wins.
        assert_eq!(report.contributors[0].canonical_name, "Jeff Harris");
    }

    #[test]
    fn spelling_variants_accumulate_into_one_profile() {
        let commits = vec![
            commit("c1", "jeff", "main", "feat: add billing export"),
            commit("c2", "JeHarris-ECI", "main", "fix: billing rounding"),
        ];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        assert_eq!(report.contributors.len(), 1);
        assert_eq!(report.contributors[0].commit_count, 2);
    }

    #[test]
    fn change_description_is_cleaned_and_rewritten() {
        let commits = vec![commit(
            "c1",
            "anna",
            "main",
            "PAY-123: added proration handling for annual plans",
        )];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        let profile = &report.contributors[0];
        assert_eq!(profile.key_changes[0], "Add proration handling for annual plans");
        assert_eq!(profile.focus_tags[0], "PAY-123");
    }

    #[test]
    fn conventional_prefix_is_dropped_from_changes() {
        let commits = vec![commit(
            "c1",
            "anna",
            "main",
            "feat(billing): implement invoice retry queue",
        )];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        assert_eq!(
            report.contributors[0].key_changes[0],
            "Implement invoice retry queue"
        );
    }

    #[test]
    fn merge_commits_count_but_produce_no_change() {
        let commits = vec![
            commit("c1", "anna", "main", "Merge branch 'feature/search'"),
            commit("c2", "anna", "main", "feat: add search filters"),
        ];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        let profile = &report.contributors[0];
        assert_eq!(profile.commit_count, 2);
        assert_eq!(profile.key_changes, vec!["Add search filters".to_string()]);
    }

    #[test]
    fn one_message_can_hit_several_domains() {
        let commits = vec![commit("c1", "jeff", "main", "fix: auth token cache invalidation")];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        let domains = &report.contributors[0].domains;
        assert!(domains.contains("authentication"));
        assert!(domains.contains("performance"));
    }

    #[test]
    fn team_focus_ranks_domains_with_examples() {
        let commits = vec![
            commit("c1", "jeff", "main", "fix: login redirect loop"),
            commit("c2", "jeff", "main", "feat: oauth device flow"),
            commit("c3", "anna", "main", "fix: invoice rounding"),
        ];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        assert_eq!(report.team_focus[0].domain, "authentication");
        assert_eq!(report.team_focus[0].commit_count, 2);
        assert_eq!(report.team_focus[0].examples.len(), 2);
        assert_eq!(report.team_focus[1].domain, "billing");
    }

    #[test]
    fn initiatives_are_deduplicated_and_capped() {
        let commits: Vec<CommitRecord> = (0..8)
            .map(|i| {
                commit(
                    &format!("c{i}"),
                    "anna",
                    "main",
                    &format!("chore: building the reporting pipeline v{i}"),
                )
            })
            .chain(std::iter::once(commit(
                "dup",
                "anna",
                "main",
                "chore: building the reporting pipeline v0",
            )))
            .collect();
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        assert!(report.key_initiatives.len() <= MAX_INITIATIVES);
        let lowered: Vec<String> = report
            .key_initiatives
            .iter()
            .map(|i| i.to_lowercase())
            .collect();
        let mut deduped = lowered.clone();
        deduped.dedup();
        assert_eq!(lowered.len(), deduped.len());
    }

    #[test]
    fn pull_requests_update_counts_and_recency() {
        let pr = PullRequestRecord {
            number: 7,
            title: "Add search filters".to_string(),
            author_raw: "anna".to_string(),
            state: PullRequestState::Merged,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            merged_at: Some(Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap()),
        };
        let report = WorkIntentExtractor.extract(&[], &[pr], &resolver());
        let profile = &report.contributors[0];
        assert_eq!(profile.canonical_name, "Anna Kern");
        assert_eq!(profile.pr_count, 1);
        assert_eq!(
            profile.last_active,
            Some(Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn default_branches_are_not_active_branches() {
        let commits = vec![
            commit("c1", "jeff", "main", "chore: sync"),
            commit("c2", "jeff", "users/jeff/token-cache", "feat: add token cache"),
            commit("c3", "jeff", "users/jeff/token-cache", "fix: cache expiry"),
        ];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        assert_eq!(report.active_branches.len(), 1);
        assert_eq!(report.active_branches[0].name, "users/jeff/token-cache");
        assert_eq!(report.active_branches[0].commit_count, 2);
    }

    #[test]
    fn empty_window_has_empty_profiles_and_a_quiet_summary() {
        let report = WorkIntentExtractor.extract(&[], &[], &resolver());
        assert!(report.contributors.is_empty());
        assert!(report.team_focus.is_empty());
        assert_eq!(report.summary, "No commit activity in this window.");
    }

    #[test]
    fn summary_names_top_contributor_and_domain() {
        let commits = vec![
            commit("c1", "jeff", "main", "feat: add oauth device flow"),
            commit("c2", "jeff", "main", "fix: login redirect loop"),
            commit("c3", "anna", "main", "docs: update readme"),
        ];
        let report = WorkIntentExtractor.extract(&commits, &[], &resolver());
        assert!(report.summary.contains("authentication"));
        assert!(report.summary.contains("Jeff Harris"));
    }
}
