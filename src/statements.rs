use crate::line::split_lines;

/// Split a script into statements on lines holding only `;`.
///
/// Each statement is trimmed and empty statements are dropped. A `;` at
/// the end of a code line does not split; run the script through
/// [`crate::semicolon::move_semicolon_to_own_line`] first to split on those
/// as well.
pub fn split_sql_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut buf: Vec<&str> = Vec::new();

    for line in split_lines(text) {
        if line.trim() == ";" {
            flush(&mut buf, &mut statements);
        } else {
            buf.push(line);
        }
    }
    flush(&mut buf, &mut statements);

    statements
}

fn flush(buf: &mut Vec<&str>, statements: &mut Vec<String>) {
    let joined = buf.join("\n");
    buf.clear();
    let statement = joined.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
}
