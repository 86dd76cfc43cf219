use crate::line::{
    condition_keyword, indent_width, is_clause_start, is_join_start, is_standalone_from,
    is_structural, opens_derived_join, paren_delta, reindent, split_lines, IndentUnit,
    TableIndentTracker,
};

/// State of the FROM/JOIN rescan inside a rebased subquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NestedFrom {
    Outside,
    /// Just saw a standalone `FROM`; the next structural line is the table.
    AwaitingTable,
    InFromBlock {
        table_indent: usize,
        join_indent: Option<usize>,
    },
}

/// Normalize every `JOIN ( subquery ) alias` block in `text`.
///
/// Each block is rebased as a unit. The `JOIN (` line and its closing line
/// go to the join indentation and the interior goes one unit deeper, keeping
/// its own relative nesting. FROM/JOIN/ON structure inside the subquery is
/// then re-aligned.
pub fn format_derived_join_blocks(text: &str, indent_size: usize) -> String {
    let unit = IndentUnit::new(indent_size);
    let lines = split_lines(text);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut tables = TableIndentTracker::new();
    let mut blocks = 0usize;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        tables.observe(line, unit);
        if !opens_derived_join(line) {
            out.push(line.to_string());
            i += 1;
            continue;
        }

        let join_indent = match tables.table_indent() {
            Some(table_indent) => table_indent + unit.width(),
            None => indent_width(line, unit),
        };
        out.push(reindent(join_indent, line));

        let Some(close) = find_close(&lines, i) else {
            tracing::debug!(line = i + 1, "derived join block has no closing parenthesis");
            i += 1;
            continue;
        };

        let interior = rebase_interior(&lines[i + 1..close], join_indent + unit.width(), unit);
        out.extend(align_nested_joins(interior, unit));
        out.push(reindent(join_indent, lines[close]));
        blocks += 1;
        i = close + 1;
    }

    tracing::debug!(blocks, lines = out.len(), "derived join blocks");
    out.join("\n")
}

/// Index of the line where the running parenthesis depth, counted from the
/// opening line inclusive, first drops to zero or below.
fn find_close(lines: &[&str], open: usize) -> Option<usize> {
    let mut depth = paren_delta(lines[open]);
    for (offset, line) in lines[open + 1..].iter().enumerate() {
        depth += paren_delta(line);
        if depth <= 0 {
            return Some(open + 1 + offset);
        }
    }
    None
}

/// Move the structural lines of a block so the least-indented one sits at
/// `base`. Blank and comment lines are left as they are.
fn rebase_interior(lines: &[&str], base: usize, unit: IndentUnit) -> Vec<String> {
    let min_indent = lines
        .iter()
        .filter(|line| is_structural(line))
        .map(|line| indent_width(line, unit))
        .min();

    let Some(min_indent) = min_indent else {
        return lines.iter().map(|line| line.to_string()).collect();
    };

    lines
        .iter()
        .map(|&line| {
            if is_structural(line) {
                reindent(base + indent_width(line, unit) - min_indent, line)
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Force JOIN lines under a subquery's FROM table one unit deeper than the
/// table, and their ON/AND/OR lines one unit deeper than the JOIN.
fn align_nested_joins(mut lines: Vec<String>, unit: IndentUnit) -> Vec<String> {
    let mut state = NestedFrom::Outside;

    for line in lines.iter_mut() {
        if !is_structural(line) {
            continue;
        }
        if is_clause_start(line) {
            state = NestedFrom::Outside;
            continue;
        }
        if is_standalone_from(line) {
            state = NestedFrom::AwaitingTable;
            continue;
        }
        match state {
            NestedFrom::Outside => {}
            NestedFrom::AwaitingTable => {
                state = NestedFrom::InFromBlock {
                    table_indent: indent_width(line, unit),
                    join_indent: None,
                };
            }
            NestedFrom::InFromBlock {
                table_indent,
                join_indent,
            } => {
                if is_join_start(line) {
                    let desired = table_indent + unit.width();
                    *line = reindent(desired, line);
                    state = NestedFrom::InFromBlock {
                        table_indent,
                        join_indent: Some(desired),
                    };
                } else if let Some(join_indent) = join_indent {
                    if let Some((keyword, rest)) = condition_keyword(line) {
                        let aligned = format!(
                            "{}{}{}",
                            " ".repeat(join_indent + unit.width()),
                            keyword,
                            rest
                        );
                        *line = aligned;
                    }
                }
            }
        }
    }
    lines
}
