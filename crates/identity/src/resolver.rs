use common::config::TeamConfig;

use crate::table::{AliasTable, CanonicalIdentity};

/// Maps raw author strings from any platform onto canonical identities.
///
/// Resolution is total: exact alias match, then ordered substring match,
/// then a fallback identity built from the raw input and the configured
/// default timezone. Downstream code never has to handle "unknown".
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    table: AliasTable,
    default_tz_offset_hours: i32,
    default_tz_label: String,
}

impl IdentityResolver {
    pub fn new(table: AliasTable, default_tz_offset_hours: i32, default_tz_label: &str) -> Self {
        Self {
            table,
            default_tz_offset_hours,
            default_tz_label: default_tz_label.to_string(),
        }
    }

    pub fn from_config(team: &TeamConfig) -> Self {
        Self::new(
            AliasTable::from_config(team),
            team.default_tz_offset_hours,
            &team.default_tz_label,
        )
    }

    /// Table-only lookup, no fallback. Used where a guessed name must not
    /// be trusted, e.g. owners inferred from branch names.
    pub fn lookup(&self, raw: &str) -> Option<CanonicalIdentity> {
        let needle = raw.trim().to_lowercase();
        self.table
            .exact(&needle)
            .or_else(|| self.table.substring(&needle))
            .map(|entry| entry.identity())
    }

    /// Total resolution. Unknown authors keep their raw spelling and get
    /// the default timezone.
    pub fn resolve(&self, raw: &str) -> CanonicalIdentity {
        if let Some(identity) = self.lookup(raw) {
            return identity;
        }

        let trimmed = raw.trim();
        let display_name = if trimmed.is_empty() { raw } else { trimmed };
        CanonicalIdentity {
            display_name: display_name.to_string(),
            tz_offset_hours: self.default_tz_offset_hours,
            tz_label: self.default_tz_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::AliasEntry;

    fn resolver() -> IdentityResolver {
        let table = AliasTable::new(vec![
            AliasEntry {
                key: "jeharris-eci".to_string(),
                display_name: "Jeff Harris".to_string(),
                tz_offset_hours: -8,
                tz_label: "PST".to_string(),
            },
            AliasEntry {
                key: "jeff.harris".to_string(),
                display_name: "Jeff Harris".to_string(),
                tz_offset_hours: -8,
                tz_label: "PST".to_string(),
            },
            AliasEntry {
                key: "akern".to_string(),
                display_name: "Anna Kern".to_string(),
                tz_offset_hours: 1,
                tz_label: "CET".to_string(),
            },
        ]);
        IdentityResolver::new(table, 0, "UTC")
    }

    #[test]
    fn exact_match_beats_substring() {
        let identity = resolver().resolve("akern");
        assert_eq!(identity.display_name, "Anna Kern");
        assert_eq!(identity.tz_offset_hours, 1);
    }

    #[test]
    fn spelling_variants_collapse_to_one_person() {
        let resolver = resolver();
        let a = resolver.resolve("JeHarris-ECI");
        let b = resolver.resolve("jeff.harris");
        assert_eq!(a.display_name, b.display_name);
        assert_eq!(a.tz_label, "PST");
    }

    #[test]
    fn substring_covers_platform_decorations() {
        // Azure-style "Display Name <account>" strings still hit the table.
        let identity = resolver().resolve("jeharris-eci@corp");
        assert_eq!(identity.display_name, "Jeff Harris");
    }

    #[test]
    fn unknown_author_falls_back_to_raw_with_default_zone() {
        let identity = resolver().resolve("  drive-by-contributor  ");
        assert_eq!(identity.display_name, "drive-by-contributor");
        assert_eq!(identity.tz_offset_hours, 0);
        assert_eq!(identity.tz_label, "UTC");
    }

    #[test]
    fn resolution_is_total_for_any_input() {
        let resolver = resolver();
        for raw in ["", "??", "Ée-Müller", "zz"] {
            let identity = resolver.resolve(raw);
            if !raw.is_empty() {
                assert!(!identity.display_name.is_empty());
            }
            assert_eq!(identity.tz_label, "UTC");
        }
    }

    #[test]
    fn lookup_has_no_fallback() {
        assert!(resolver().lookup("nobody-here").is_none());
    }
}
