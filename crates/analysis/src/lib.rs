pub mod commit;
pub mod conventional;
pub mod health;
pub mod intent;
pub mod timeclock;

pub use commit::{CommitAnalysis, CommitAnalyzer, SentimentClass};
pub use health::{aggregate, explain, BurnoutRisk, TagCount, TeamHealth};
pub use intent::{BranchActivity, ContributorProfile, DomainFocus, WorkIntentExtractor, WorkReport};
