use std::sync::LazyLock;

use regex::Regex;
use smallvec::SmallVec;

use crate::line::{
    condition_keyword, is_clause_start, is_join_start, is_line_comment, opens_derived_join,
    paren_delta, reindent, split_lines, IndentUnit, TableIndentTracker,
};

/// `<indent><...JOIN...> ON <cond>` on a single physical line.
static JOIN_ON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\s*)(.*?\bJOIN\b.*?)\s+(ON\b.*)$").unwrap());

/// A line starting with the ON keyword.
static LEADING_ON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*ON\b").unwrap());

/// The closing line of a derived table carrying its join condition:
/// `) alias ON cond`.
static CLOSE_ALIAS_ON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\)\s+\S+)\s+(ON\b.*)$").unwrap());

/// Scanner state for the alignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinScan {
    /// Not inside a JOIN condition region.
    Outside,
    /// After a JOIN line; ON/AND/OR lines align under it.
    InJoinCondition { join_indent: usize },
    /// Inside a `JOIN (` derived table; lines pass through untouched until
    /// the parenthesis depth returns to zero.
    InDerivedBlock { depth: isize, join_indent: usize },
}

/// Split JOIN/ON lines and align join conditions.
///
/// Two passes over the script:
///   1. Split `... JOIN src ON cond` lines into a JOIN line and an ON line.
///   2. Scan the lines with [`JoinScan`], re-indenting JOIN lines under the
///      FROM table line and ON/AND/OR continuations under their JOIN.
pub fn format_join_on_only(text: &str, indent_size: usize) -> String {
    let unit = IndentUnit::new(indent_size);
    let split = split_join_on_lines(&split_lines(text), unit);
    let aligned = align_join_conditions(&split, unit);
    tracing::debug!(
        lines_in = split.len(),
        lines_out = aligned.len(),
        "join/on alignment"
    );
    aligned.join("\n")
}

/// Pass 1: break each `JOIN ... ON ...` line in two. The ON part goes one
/// unit deeper than the JOIN line's own indentation.
fn split_join_on_lines(lines: &[&str], unit: IndentUnit) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    for &line in lines {
        out.extend(split_join_on(line, unit));
    }
    out
}

fn split_join_on(line: &str, unit: IndentUnit) -> SmallVec<[String; 2]> {
    let mut parts = SmallVec::new();
    if is_line_comment(line) || LEADING_ON_RE.is_match(line) {
        parts.push(line.to_string());
        return parts;
    }
    match JOIN_ON_RE.captures(line) {
        Some(caps) => {
            let indent = &caps[1];
            parts.push(format!("{}{}", indent, caps[2].trim_end()));
            parts.push(format!(
                "{}{}{}",
                indent,
                " ".repeat(unit.width()),
                caps[3].trim_start()
            ));
        }
        None => parts.push(line.to_string()),
    }
    parts
}

/// Pass 2: walk the lines once, driving [`JoinScan`].
fn align_join_conditions(lines: &[String], unit: IndentUnit) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + 4);
    let mut tables = TableIndentTracker::new();
    let mut state = JoinScan::Outside;

    for line in lines {
        if let JoinScan::InDerivedBlock { depth, join_indent } = state {
            let depth = depth + paren_delta(line);
            if depth > 0 {
                out.push(line.clone());
                state = JoinScan::InDerivedBlock { depth, join_indent };
                continue;
            }
            // Closing line of the derived table.
            push_close_line(&mut out, line, join_indent, unit);
            state = JoinScan::InJoinCondition { join_indent };
            continue;
        }

        tables.observe(line, unit);
        let join_indent = tables.table_indent().unwrap_or(0) + unit.width();

        if opens_derived_join(line) {
            if is_join_start(line) {
                out.push(reindent(join_indent, line));
            } else {
                out.push(line.clone());
            }
            state = JoinScan::InDerivedBlock {
                depth: paren_delta(line),
                join_indent,
            };
            continue;
        }

        if is_clause_start(line) {
            out.push(line.clone());
            state = JoinScan::Outside;
            continue;
        }

        if is_join_start(line) {
            out.push(reindent(join_indent, line));
            state = JoinScan::InJoinCondition { join_indent };
            continue;
        }

        match state {
            JoinScan::InJoinCondition { join_indent } => {
                if CLOSE_ALIAS_ON_RE.is_match(line) {
                    push_close_line(&mut out, line, join_indent, unit);
                } else if let Some((keyword, rest)) = condition_keyword(line) {
                    out.push(format!(
                        "{}{}{}",
                        " ".repeat(join_indent + unit.width()),
                        keyword,
                        rest
                    ));
                } else {
                    out.push(line.clone());
                }
            }
            _ => out.push(line.clone()),
        }
    }

    if let JoinScan::InDerivedBlock { depth, .. } = state {
        tracing::debug!(depth, "derived join block left open at end of text");
    }
    out
}

/// Emit a derived table's closing line. `) alias ON cond` becomes `) alias`
/// at the JOIN's indentation plus `ON cond` one unit deeper; any other
/// closing line passes through.
fn push_close_line(out: &mut Vec<String>, line: &str, join_indent: usize, unit: IndentUnit) {
    match CLOSE_ALIAS_ON_RE.captures(line) {
        Some(caps) => {
            out.push(reindent(join_indent, &caps[1]));
            out.push(reindent(join_indent + unit.width(), &caps[2]));
        }
        None => out.push(line.to_string()),
    }
}
