use crate::line::{is_blank, is_line_comment, leading_whitespace, split_lines};

const LINE_PREFIX: &str = "--";
const BLOCK_START: &str = "/*";
const BLOCK_END: &str = "*/";

/// Comment or uncomment every line of `text`.
///
/// When every non-blank line already starts with `--` (at column 0 or after
/// indentation) one `--` and a single following space are removed from each.
/// Otherwise `-- ` is prepended to every non-blank line. Blank lines are
/// never changed.
pub fn toggle_line_comments(text: &str) -> String {
    let lines = split_lines(text);
    let all_commented = lines
        .iter()
        .filter(|line| !is_blank(line))
        .all(|line| is_line_comment(line));

    lines
        .into_iter()
        .map(|line| {
            if all_commented {
                uncomment_line(line)
            } else {
                comment_line(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn comment_line(line: &str) -> String {
    if is_blank(line) {
        line.to_string()
    } else {
        format!("{} {}", LINE_PREFIX, line)
    }
}

fn uncomment_line(line: &str) -> String {
    let indent = leading_whitespace(line);
    match line[indent.len()..].strip_prefix(LINE_PREFIX) {
        Some(rest) => {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            format!("{}{}", indent, rest)
        }
        None => line.to_string(),
    }
}

/// Wrap `text` in standalone `/*` and `*/` lines, or drop those lines when
/// `text` already starts and ends with them.
pub fn toggle_block_comment(text: &str) -> String {
    let lines = split_lines(text);
    let last = lines.len() - 1;
    let wrapped = last > 0 && lines[0].trim() == BLOCK_START && lines[last].trim() == BLOCK_END;
    if wrapped {
        lines[1..last].join("\n")
    } else {
        format!("{}\n{}\n{}", BLOCK_START, lines.join("\n"), BLOCK_END)
    }
}
