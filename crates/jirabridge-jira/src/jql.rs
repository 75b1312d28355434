//! JQL construction
//!
//! Every value that comes from a caller is emitted as a double-quoted JQL
//! string literal so it can never terminate the literal early or inject
//! additional clauses.

pub const ORDER_BY_UPDATED: &str = "ORDER BY updated DESC";

/// Quote `value` as a JQL string literal.
///
/// Backslashes and double quotes are escaped. Control characters (newlines,
/// tabs) are not valid inside a literal and become spaces. Single quotes
/// need no escaping inside a double-quoted literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Full-text search across summary, description and comments.
pub fn text_search(term: &str) -> String {
    format!("text ~ {} {}", quote(term.trim()), ORDER_BY_UPDATED)
}

pub fn project(project_key: &str) -> String {
    format!("project = {} {}", quote(project_key.trim()), ORDER_BY_UPDATED)
}

pub fn assigned_to_current_user() -> String {
    format!("assignee = currentUser() {}", ORDER_BY_UPDATED)
}

/// Tickets updated within the last `days` days, relative to Jira's clock.
pub fn updated_within_days(days: u32) -> String {
    format!("updated >= -{}d {}", days, ORDER_BY_UPDATED)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Undo `quote`, failing if the literal is malformed.
    fn unquote(literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => out.push(chars.next()?),
                // An unescaped quote would close the literal early.
                '"' => return None,
                c => out.push(c),
            }
        }
        Some(out)
    }

    #[test]
    fn test_quote_apostrophe() {
        assert_eq!(quote("O'Brien"), "\"O'Brien\"");
        assert_eq!(unquote(&quote("O'Brien")).as_deref(), Some("O'Brien"));
    }

    #[test]
    fn test_quote_escapes_double_quotes_and_backslashes() {
        let nasty = r#"say "hi" \ or " OR project = SECRET"#;
        let quoted = quote(nasty);
        assert_eq!(unquote(&quoted).as_deref(), Some(nasty));
        assert_eq!(quote(r#"a"b"#), r#""a\"b""#);
        assert_eq!(quote(r"C:\path"), r#""C:\\path""#);
    }

    #[test]
    fn test_quote_trailing_backslash_cannot_escape_closing_quote() {
        let quoted = quote("ends with \\");
        assert_eq!(quoted, "\"ends with \\\\\"");
        assert_eq!(unquote(&quoted).as_deref(), Some("ends with \\"));
    }

    #[test]
    fn test_quote_replaces_control_characters() {
        assert_eq!(quote("line one\nline\ttwo"), "\"line one line two\"");
    }

    #[test]
    fn test_text_search() {
        assert_eq!(
            text_search("  O'Brien "),
            "text ~ \"O'Brien\" ORDER BY updated DESC"
        );
    }

    #[test]
    fn test_project_is_quoted() {
        assert_eq!(project("PROJ"), "project = \"PROJ\" ORDER BY updated DESC");
        assert_eq!(
            project("X OR 1=1"),
            "project = \"X OR 1=1\" ORDER BY updated DESC"
        );
    }

    #[test]
    fn test_fixed_clauses() {
        assert_eq!(
            assigned_to_current_user(),
            "assignee = currentUser() ORDER BY updated DESC"
        );
        assert_eq!(
            updated_within_days(7),
            "updated >= -7d ORDER BY updated DESC"
        );
    }
}
