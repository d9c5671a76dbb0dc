use std::collections::HashSet;

use crate::records::CommitRecord;

/// Merge per-branch commit lists into one deduplicated list.
///
/// `per_branch` must be in branch enumeration order. A commit reachable
/// from several branches keeps the record from the branch where it was
/// first observed; that ordering is the tie-break, not a consistency
/// guarantee.
pub fn merge_branch_commits(per_branch: Vec<Vec<CommitRecord>>) -> Vec<CommitRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for commits in per_branch {
        for commit in commits {
            if seen.insert(commit.full_id.clone()) {
                merged.push(commit);
            }
        }
    }
    merged
}
