/// Character budget for comment excerpts shown on the dashboard.
pub const EXCERPT_MAX_CHARS: usize = 300;

/// Trim and cap `input` at `max_chars` characters, appending an ellipsis
/// when anything was cut. Counts chars, not bytes, so multi-byte text
/// never splits mid-character.
pub fn excerpt(input: &str, max_chars: usize) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }

    let mut buf: String = trimmed.chars().take(max_chars).collect();
    buf.push('…');
    buf
}

/// First line of a (possibly multi-line) message, trailing whitespace removed.
pub fn first_line(input: &str) -> &str {
    input.lines().next().unwrap_or("").trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_input_untouched() {
        assert_eq!(excerpt("  short note \n", 300), "short note");
    }

    #[test]
    fn excerpt_caps_long_input_with_ellipsis() {
        let long = "x".repeat(1250);
        let cut = excerpt(&long, EXCERPT_MAX_CHARS);
        assert_eq!(cut.chars().count(), EXCERPT_MAX_CHARS + 1);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn excerpt_counts_chars_not_bytes() {
        let cut = excerpt("áéíóú", 3);
        assert_eq!(cut, "áéí…");
    }

    #[test]
    fn first_line_stops_at_newline() {
        assert_eq!(first_line("subject line \n\nbody text"), "subject line");
        assert_eq!(first_line(""), "");
    }
}
