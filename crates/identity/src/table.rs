use common::config::TeamConfig;
use serde::{Deserialize, Serialize};

/// One person as the rest of the pipeline sees them. Several account
/// spellings collapse into a single canonical identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalIdentity {
    pub display_name: String,
    pub tz_offset_hours: i32,
    pub tz_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// Lower-cased account spelling this entry matches.
    pub key: String,
    pub display_name: String,
    pub tz_offset_hours: i32,
    pub tz_label: String,
}

impl AliasEntry {
    pub fn identity(&self) -> CanonicalIdentity {
        CanonicalIdentity {
            display_name: self.display_name.clone(),
            tz_offset_hours: self.tz_offset_hours,
            tz_label: self.tz_label.clone(),
        }
    }
}

/// Ordered alias table. Order is the tie-break for substring matches:
/// the first entry that matches wins, so more specific spellings belong
/// earlier in the configuration.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new(mut entries: Vec<AliasEntry>) -> Self {
        for entry in &mut entries {
            entry.key = entry.key.trim().to_lowercase();
        }
        entries.retain(|entry| !entry.key.is_empty());
        Self { entries }
    }

    pub fn from_config(team: &TeamConfig) -> Self {
        Self::new(
            team.aliases
                .iter()
                .map(|alias| AliasEntry {
                    key: alias.key.clone(),
                    display_name: alias.display_name.clone(),
                    tz_offset_hours: alias.tz_offset_hours,
                    tz_label: alias.tz_label.clone(),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// Case-insensitive exact lookup. `needle` must already be lower-cased.
    pub fn exact(&self, needle: &str) -> Option<&AliasEntry> {
        self.entries.iter().find(|entry| entry.key == needle)
    }

    /// Substring fallback in either direction: the alias key contained in
    /// the input, or the input contained in the key. First entry wins.
    pub fn substring(&self, needle: &str) -> Option<&AliasEntry> {
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| needle.contains(&entry.key) || entry.key.contains(needle))
    }
}
