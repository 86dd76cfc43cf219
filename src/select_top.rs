use std::sync::LazyLock;

use regex::Regex;

use crate::line::split_lines;

/// `SELECT`, `SELECT DISTINCT` or `SELECT ALL` alone on a line.
static SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\s*)SELECT(?:\s+(DISTINCT|ALL))?\s*$").unwrap());

/// `TOP <value> [PERCENT] [WITH TIES] <rest>` where the value is a
/// parenthesized expression or a single token.
static TOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*)TOP\s+(\(\s*[^)]*?\s*\)|\S+)(\s+PERCENT\b)?(\s+WITH\s+TIES\b)?(.*)$")
        .unwrap()
});

/// Merge a bare `SELECT [DISTINCT|ALL]` line with a following `TOP ...` line.
///
/// ```text
/// SELECT DISTINCT          SELECT DISTINCT TOP (10) PERCENT
///   TOP (10) PERCENT a, b    a, b
/// ```
///
/// Columns left on the TOP line stay on their own line at the TOP line's
/// indentation.
pub fn merge_select_top(text: &str) -> String {
    let lines = split_lines(text);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut merged = 0usize;

    let mut i = 0;
    while i < lines.len() {
        let current = lines[i];
        let next = lines.get(i + 1).copied().unwrap_or("");

        if let (Some(select), Some(top)) = (SELECT_RE.captures(current), TOP_RE.captures(next)) {
            let mut parts = vec!["SELECT".to_string()];
            if let Some(modifier) = select.get(2) {
                parts.push(modifier.as_str().to_ascii_uppercase());
            }
            parts.push("TOP".to_string());
            parts.push(top[2].trim().to_string());
            if top.get(3).is_some() {
                parts.push("PERCENT".to_string());
            }
            if top.get(4).is_some() {
                parts.push("WITH TIES".to_string());
            }
            out.push(format!("{}{}", &select[1], parts.join(" ")));

            let rest = top[5].trim_start();
            if !rest.is_empty() {
                out.push(format!("{}{}", &top[1], rest));
            }
            merged += 1;
            i += 2;
            continue;
        }

        out.push(current.to_string());
        i += 1;
    }

    tracing::debug!(merged, "select/top merge");
    out.join("\n")
}
