use serde::Deserialize;

use crate::line::{is_blank, is_line_comment, leading_whitespace, split_lines, strip_line_comment};

/// Where list separators go.
///
/// ```text
/// trailing     leading
/// a,           a
/// b,           , b
/// c            , c
/// ```
///
/// A comma never moves across a blank line or a `--` comment line; in that
/// case both lines are left as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommaPosition {
    /// Leading commas: `, item` at the start of the next line.
    #[default]
    Before,
    /// Trailing commas: `item,` at the end of the line.
    After,
    /// Leave commas where they are.
    Preserve,
}

impl CommaPosition {
    pub fn apply(self, text: &str) -> String {
        match self {
            CommaPosition::Before => to_leading_commas(text),
            CommaPosition::After => to_trailing_commas(text),
            CommaPosition::Preserve => text.to_string(),
        }
    }
}

/// Move each trailing comma to the start of the following line.
pub fn to_leading_commas(text: &str) -> String {
    let lines = split_lines(text);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut current = lines[0].to_string();

    for &next in &lines[1..] {
        let movable = !is_blank(next) && !is_line_comment(next);
        match strip_trailing_comma(&current) {
            Some(stripped) if movable => {
                out.push(stripped);
                let rest = next.trim_start();
                current = if rest.starts_with(',') {
                    next.to_string()
                } else {
                    format!("{}, {}", leading_whitespace(next), rest)
                };
            }
            _ => {
                out.push(std::mem::replace(&mut current, next.to_string()));
            }
        }
    }
    out.push(current);

    out.join("\n")
}

/// Move each leading `, ` to the end of the previous line.
pub fn to_trailing_commas(text: &str) -> String {
    let lines = split_lines(text);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for line in lines {
        if let Some((indent, rest)) = split_leading_comma(line) {
            let previous = out
                .last_mut()
                .filter(|prev| !is_blank(prev) && !is_line_comment(prev));
            if let Some(prev) = previous {
                *prev = append_trailing_comma(prev);
                out.push(format!("{}{}", indent, rest));
                continue;
            }
        }
        out.push(line.to_string());
    }

    out.join("\n")
}

/// `line` without its trailing comma, if the code part of the line (before
/// any `--` comment) ends with one.
fn strip_trailing_comma(line: &str) -> Option<String> {
    let code = strip_line_comment(line).trim_end();
    if !code.ends_with(',') {
        return None;
    }
    let comma = code.len() - 1;
    Some(format!("{}{}", &line[..comma], &line[comma + 1..]))
}

/// `(indent, rest)` for a line of the form `<indent>, <rest>`. At least one
/// whitespace character must follow the comma.
fn split_leading_comma(line: &str) -> Option<(&str, &str)> {
    let indent = leading_whitespace(line);
    let after = line[indent.len()..].strip_prefix(',')?;
    let rest = after.trim_start();
    if rest.len() == after.len() {
        return None;
    }
    Some((indent, rest))
}

/// Append a comma to the code part of `line`, ahead of any `--` comment.
fn append_trailing_comma(line: &str) -> String {
    let code = strip_line_comment(line).trim_end();
    let comment = line[code.len()..].trim_end();
    format!("{},{}", code, comment)
}
