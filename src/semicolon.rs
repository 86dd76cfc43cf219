use crate::line::{comment_start, split_lines};

/// Put every statement terminator on a line of its own.
///
/// `body ;` becomes `body` followed by `;`, and a line holding only `;`
/// (with any surrounding whitespace) is normalized to exactly `;`. Lines
/// carrying a `--` comment are left alone; `--` inside a quoted literal is
/// not a comment.
pub fn move_semicolon_to_own_line(text: &str) -> String {
    let lines = split_lines(text);
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 4);

    for line in lines {
        if comment_start(line).is_some() {
            out.push(line.to_string());
            continue;
        }
        match line.trim_end().strip_suffix(';') {
            Some(body) => {
                let body = body.trim_end();
                if !body.is_empty() {
                    out.push(body.to_string());
                }
                out.push(";".to_string());
            }
            None => out.push(line.to_string()),
        }
    }

    tracing::debug!(lines = out.len(), "semicolon stage");
    out.join("\n")
}
