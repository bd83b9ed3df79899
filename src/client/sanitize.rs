//! Input checks applied before anything leaves the client.

pub const MAX_MESSAGE_CHARS: usize = 3000;

const BLOCKED_PATTERNS: [&str; 4] = ["<script", "javascript:", "data:text/html", "vbscript:"];

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// Strip control characters, trim, and cap at [`MAX_MESSAGE_CHARS`].
///
/// Applying it twice yields the same string.
pub fn sanitize_input(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| !is_stripped_control(*c)).collect();
    let truncated: String = stripped.trim().chars().take(MAX_MESSAGE_CHARS).collect();
    truncated.trim_end().to_string()
}

/// Why a message was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooLong(usize),
    Blocked(&'static str),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Empty => write!(f, "message is empty"),
            Rejection::TooLong(n) => {
                write!(f, "message has {n} characters (limit {MAX_MESSAGE_CHARS})")
            }
            Rejection::Blocked(p) => write!(f, "message contains blocked pattern `{p}`"),
        }
    }
}

pub fn validate_input(input: &str) -> Result<(), Rejection> {
    let trimmed = input.trim();
    // Text made only of control characters would go out blank.
    if trimmed.is_empty() || sanitize_input(trimmed).is_empty() {
        return Err(Rejection::Empty);
    }

    let len = trimmed.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(Rejection::TooLong(len));
    }

    let lowered = trimmed.to_lowercase();
    match BLOCKED_PATTERNS.iter().copied().find(|p| lowered.contains(p)) {
        Some(p) => Err(Rejection::Blocked(p)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_input_to_limit() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 500);
        assert_eq!(sanitize_input(&long).chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn strips_controls_but_keeps_line_breaks() {
        assert_eq!(sanitize_input("  hi\u{0}\u{7}\tthere\r\nking\u{7F} "), "hi\tthere\r\nking");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let boundary = format!("{} tail", "b".repeat(MAX_MESSAGE_CHARS - 1));
        let samples = [
            "\u{1} leading control then space",
            "plain",
            "   padded   ",
            boundary.as_str(),
            "\u{1F}\u{1F}",
        ];
        for s in samples {
            let once = sanitize_input(s);
            assert_eq!(sanitize_input(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn rejects_blocked_patterns_case_insensitively() {
        assert_eq!(validate_input("hi <SCRIPT>x</script>"), Err(Rejection::Blocked("<script")));
        assert_eq!(validate_input("JavaScript:alert(1)"), Err(Rejection::Blocked("javascript:")));
        assert_eq!(validate_input("data:text/html,x"), Err(Rejection::Blocked("data:text/html")));
        assert_eq!(validate_input("VBScript:run"), Err(Rejection::Blocked("vbscript:")));
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(validate_input(" \n\t "), Err(Rejection::Empty));
        assert_eq!(validate_input("\u{1}\u{2}\u{7}"), Err(Rejection::Empty));
        assert_eq!(validate_input(" \u{0} \u{7F} "), Err(Rejection::Empty));
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(validate_input(&long), Err(Rejection::TooLong(MAX_MESSAGE_CHARS + 1)));
        assert!(validate_input(&"x".repeat(MAX_MESSAGE_CHARS)).is_ok());
    }
}
