use once_cell::sync::Lazy;
use regex::Regex;

/// Decomposed `type(scope)!: description` commit header. Messages that do
/// not follow the convention parse to a header with no type and the whole
/// first line as description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionalHeader {
    pub commit_type: Option<String>,
    pub scope: Option<String>,
    pub breaking_marker: bool,
    pub description: String,
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)(?:\(([^)]*)\))?(!)?:\s*(.*)$").expect("invalid header regex")
});

pub fn parse_header(first_line: &str) -> ConventionalHeader {
    let line = first_line.trim();
    match HEADER_RE.captures(line) {
        Some(caps) => ConventionalHeader {
            commit_type: caps.get(1).map(|m| m.as_str().to_lowercase()),
            scope: caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty()),
            breaking_marker: caps.get(3).is_some(),
            description: caps.get(4).map_or(String::new(), |m| m.as_str().to_string()),
        },
        None => ConventionalHeader {
            description: line.to_string(),
            ..ConventionalHeader::default()
        },
    }
}

/// Sentiment weight of a conventional type. Types outside the table
/// (docs, style, build, ci, chore, anything custom) carry no weight.
pub fn type_weight(commit_type: &str) -> f32 {
    match commit_type {
        "feat" => 1.0,
        "fix" => 0.5,
        "perf" => 0.7,
        "refactor" => 0.3,
        "test" => 0.2,
        "revert" => -0.3,
        _ => 0.0,
    }
}
