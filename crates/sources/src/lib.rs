pub mod azure;
pub mod connector;
pub mod github;
pub mod merge;
pub mod metrics;
pub mod records;

pub use crate::connector::{SharedConnector, SourceConnector};
pub use crate::records::{
    CommitRecord, Provider, PullRequestRecord, PullRequestState, RepoActivity, RepoTarget,
};
