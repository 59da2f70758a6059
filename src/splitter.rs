//! Statement splitting for SQL dump files.
//!
//! Dumps arrive as one large script: comments, blank lines, and many
//! semicolon-terminated statements, some of which carry `;` inside quoted
//! string literals. Splitting happens in two passes:
//!
//! - **Comment stripping**: block comments (`/* ... */`, multi-line included)
//!   are replaced with a single space, and any line whose first non-whitespace
//!   characters are `--` or `#` is dropped whole.
//! - **Quote-aware scan**: the cleaned text is walked character by character,
//!   tracking whether the cursor is inside a `'` or `"` literal. A `;` outside
//!   a literal terminates the current statement; inside a literal it is plain
//!   content. A quote preceded by a backslash does not close its literal.
//!
//! Known limitation: block comments are removed in a raw pass *before* the
//! quote-aware scan, so a string literal that contains the text `/*` or `*/`
//! will be corrupted. Dumps produced by `mysqldump` do not hit this in
//! practice.

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Splits a SQL script into trimmed, non-empty statements in source order.
pub fn split_statements(script: &str) -> Vec<String> {
    let without_blocks = strip_block_comments(script);
    let clean = strip_comment_lines(&without_blocks);

    let mut statements = Vec::new();
    let mut buffer = String::new();
    let mut in_literal = false;
    let mut quote = '\0';
    let mut prev = '\0';

    for ch in clean.chars() {
        if in_literal {
            if ch == quote && prev != '\\' {
                in_literal = false;
            }
            buffer.push(ch);
        } else if ch == '\'' || ch == '"' {
            in_literal = true;
            quote = ch;
            buffer.push(ch);
        } else if ch == ';' {
            push_statement(&mut statements, &buffer);
            buffer.clear();
        } else {
            buffer.push(ch);
        }
        prev = ch;
    }
    push_statement(&mut statements, &buffer);

    statements
}

fn strip_block_comments(script: &str) -> String {
    BLOCK_COMMENT_RE.replace_all(script, " ").into_owned()
}

fn strip_comment_lines(script: &str) -> String {
    script
        .lines()
        .filter(|line| {
            let lead = line.trim_start();
            !(lead.starts_with("--") || lead.starts_with('#'))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_statement(statements: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}
