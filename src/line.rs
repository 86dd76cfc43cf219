use memchr::memchr_iter;
use phf::phf_set;

/// Smallest and largest accepted indent widths, in spaces.
pub const MIN_INDENT: usize = 1;
pub const MAX_INDENT: usize = 8;
pub const DEFAULT_INDENT: usize = 2;

/// Keywords that end a JOIN condition region on their own.
static CLAUSE_START_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "WHERE", "HAVING", "LIMIT", "UNION", "EXCEPT", "INTERSECT",
};

/// Keywords that start a clause only when followed by `BY`.
static BY_CLAUSE_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "GROUP", "ORDER",
};

static JOIN_MODIFIERS: phf::Set<&'static str> = phf_set! {
    "INNER", "LEFT", "RIGHT", "FULL", "CROSS",
};

/// Modifiers that may be followed by `OUTER` before `JOIN`.
static OUTER_JOIN_MODIFIERS: phf::Set<&'static str> = phf_set! {
    "LEFT", "RIGHT", "FULL",
};

static CONDITION_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "ON", "AND", "OR",
};

/// One structural indentation level, in spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentUnit(usize);

impl IndentUnit {
    /// Build a unit from a configured size, clamped to `MIN_INDENT..=MAX_INDENT`.
    pub fn new(size: usize) -> Self {
        Self(size.clamp(MIN_INDENT, MAX_INDENT))
    }

    pub fn width(self) -> usize {
        self.0
    }
}

impl Default for IndentUnit {
    fn default() -> Self {
        Self(DEFAULT_INDENT)
    }
}

/// Split text on `\n` or `\r\n`. Always yields at least one line.
///
/// Every stage works on the physical lines this returns; the helpers below
/// classify or measure one line at a time.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        if let Some(stripped) = line.strip_suffix('\r') {
            *line = stripped;
        }
    }
    lines
}

/// The run of whitespace at the start of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Width of the leading whitespace, counting a tab as one indent unit.
pub fn indent_width(line: &str, unit: IndentUnit) -> usize {
    leading_whitespace(line)
        .chars()
        .map(|c| if c == '\t' { unit.width() } else { 1 })
        .sum()
}

/// `line` with its leading whitespace replaced by `width` spaces.
pub fn reindent(width: usize, line: &str) -> String {
    let body = line.trim_start();
    let mut out = String::with_capacity(width + body.len());
    out.extend(std::iter::repeat(' ').take(width));
    out.push_str(body);
    out
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// True for `--` comment lines (after indentation).
pub fn is_line_comment(line: &str) -> bool {
    line.trim_start().starts_with("--")
}

/// Byte offset of the first `--` that is not inside a `'...'` or `"..."`
/// literal. A doubled quote inside a literal (`'it''s'`) stays inside it.
pub fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => quote = Some(b),
            None if b == b'-' && bytes.get(i + 1) == Some(&b'-') => return Some(i),
            None => {}
        }
    }
    None
}

/// The part of `line` before its `--` comment, if it has one.
pub fn strip_line_comment(line: &str) -> &str {
    match comment_start(line) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Blank and comment lines carry no structure.
pub fn is_structural(line: &str) -> bool {
    !is_blank(line) && !is_line_comment(line)
}

/// A line holding nothing but the `FROM` keyword.
pub fn is_standalone_from(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("FROM")
}

/// `WHERE`, `GROUP BY`, `ORDER BY`, `HAVING`, `LIMIT`, `UNION`, `EXCEPT`
/// or `INTERSECT` at the start of the line.
pub fn is_clause_start(line: &str) -> bool {
    let mut words = LeadingWords::new(line);
    let Some(first) = words.next() else {
        return false;
    };
    let first = first.to_ascii_uppercase();
    if CLAUSE_START_KEYWORDS.contains(first.as_str()) {
        return true;
    }
    BY_CLAUSE_KEYWORDS.contains(first.as_str())
        && words.next().is_some_and(|w| w.eq_ignore_ascii_case("BY"))
}

/// `[INNER|LEFT|RIGHT|FULL|CROSS] JOIN` at the start of the line.
/// `LEFT|RIGHT|FULL OUTER JOIN` is accepted as well.
pub fn is_join_start(line: &str) -> bool {
    let mut words = LeadingWords::new(line);
    let Some(first) = words.next() else {
        return false;
    };
    if first.eq_ignore_ascii_case("JOIN") {
        return true;
    }
    let first = first.to_ascii_uppercase();
    if !JOIN_MODIFIERS.contains(first.as_str()) {
        return false;
    }
    match words.next() {
        Some(w) if w.eq_ignore_ascii_case("JOIN") => true,
        Some(w) if w.eq_ignore_ascii_case("OUTER") => {
            OUTER_JOIN_MODIFIERS.contains(first.as_str())
                && words.next().is_some_and(|w| w.eq_ignore_ascii_case("JOIN"))
        }
        _ => false,
    }
}

/// A line that mentions `JOIN` as a word and ends with `(`: the opener of a
/// derived-table join.
pub fn opens_derived_join(line: &str) -> bool {
    line.trim_end().ends_with('(') && contains_word(line, "JOIN")
}

/// Split a line that starts with `ON`, `AND` or `OR` into the upper-cased
/// keyword and everything after it.
pub fn condition_keyword(line: &str) -> Option<(String, &str)> {
    let body = line.trim_start();
    let word_len = word_len(body);
    let word = &body[..word_len];
    let upper = word.to_ascii_uppercase();
    if CONDITION_KEYWORDS.contains(upper.as_str()) {
        Some((upper, &body[word_len..]))
    } else {
        None
    }
}

/// Opening minus closing parentheses on the line. String literals and
/// comments are not excluded.
pub fn paren_delta(line: &str) -> isize {
    let bytes = line.as_bytes();
    memchr_iter(b'(', bytes).count() as isize - memchr_iter(b')', bytes).count() as isize
}

/// Whether `word` occurs in `line` delimited by non-word characters,
/// compared case-insensitively.
pub fn contains_word(line: &str, word: &str) -> bool {
    let bytes = line.as_bytes();
    let needle = word.as_bytes();
    if needle.is_empty() || bytes.len() < needle.len() {
        return false;
    }
    (0..=bytes.len() - needle.len()).any(|start| {
        let end = start + needle.len();
        bytes[start..end].eq_ignore_ascii_case(needle)
            && (start == 0 || !is_word_byte(bytes[start - 1]))
            && (end == bytes.len() || !is_word_byte(bytes[end]))
    })
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn word_len(s: &str) -> usize {
    s.bytes().take_while(|&b| is_word_byte(b)).count()
}

/// Iterates the whitespace-separated words at the start of a line and stops
/// at the first character that is neither a word character nor whitespace.
struct LeadingWords<'a> {
    rest: &'a str,
    done: bool,
}

impl<'a> LeadingWords<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            rest: line.trim_start(),
            done: false,
        }
    }
}

impl<'a> Iterator for LeadingWords<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let len = word_len(self.rest);
        if len == 0 {
            self.done = true;
            return None;
        }
        let word = &self.rest[..len];
        let after = &self.rest[len..];
        let trimmed = after.trim_start();
        if trimmed.len() == after.len() {
            // The word is followed by punctuation or the end of the line.
            self.done = true;
        }
        self.rest = trimmed;
        Some(word)
    }
}

/// Remembers the indentation of the table line under the most recent
/// standalone `FROM`, i.e. the first non-blank line after it.
#[derive(Debug, Default, Clone)]
pub struct TableIndentTracker {
    armed: bool,
    table_indent: Option<usize>,
}

impl TableIndentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next visited line. A JOIN line right after `FROM` is not a
    /// table line and leaves the tracker waiting.
    pub fn observe(&mut self, line: &str, unit: IndentUnit) {
        if is_standalone_from(line) {
            self.armed = true;
            return;
        }
        if self.armed && !is_blank(line) && !is_join_start(line) && !opens_derived_join(line) {
            self.table_indent = Some(indent_width(line, unit));
            self.armed = false;
        }
    }

    pub fn table_indent(&self) -> Option<usize> {
        self.table_indent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_unit_clamps() {
        assert_eq!(IndentUnit::new(0).width(), 1);
        assert_eq!(IndentUnit::new(4).width(), 4);
        assert_eq!(IndentUnit::new(20).width(), 8);
        assert_eq!(IndentUnit::default().width(), 2);
    }

    #[test]
    fn test_split_lines_handles_crlf() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
        // A lone trailing carriage return is content, not a line break.
        assert_eq!(split_lines("a\r"), vec!["a\r"]);
    }

    #[test]
    fn test_indent_width_expands_tabs() {
        let unit = IndentUnit::new(4);
        assert_eq!(indent_width("\t  x", unit), 6);
        assert_eq!(indent_width("x", unit), 0);
        assert_eq!(indent_width("   ", unit), 3);
    }

    #[test]
    fn test_reindent() {
        assert_eq!(reindent(4, "\t x"), "    x");
        assert_eq!(reindent(0, "  x  "), "x  ");
    }

    #[test]
    fn test_blank_and_comment() {
        assert!(is_blank("  \t"));
        assert!(!is_blank(" x"));
        assert!(is_line_comment("   -- note"));
        assert!(!is_line_comment("a -- note"));
        assert!(!is_structural(""));
        assert!(!is_structural("--x"));
        assert!(is_structural("x"));
    }

    #[test]
    fn test_strip_line_comment() {
        assert_eq!(strip_line_comment("a, -- b, -- c"), "a, ");
        assert_eq!(strip_line_comment("a,"), "a,");
        assert_eq!(strip_line_comment("-- x"), "");
        assert_eq!(strip_line_comment("WHERE a LIKE '%--%' -- x"), "WHERE a LIKE '%--%' ");
    }

    #[test]
    fn test_comment_start_skips_literals() {
        assert_eq!(comment_start("a -- b"), Some(2));
        assert_eq!(comment_start("'--'"), None);
        assert_eq!(comment_start("\"a--b\" --c"), Some(7));
        assert_eq!(comment_start("'it''s' -- x"), Some(8));
        assert_eq!(comment_start("'open -- x"), None);
        assert_eq!(comment_start("a - -b"), None);
    }

    #[test]
    fn test_is_clause_start() {
        assert!(is_clause_start("WHERE a = 1"));
        assert!(is_clause_start("  where"));
        assert!(is_clause_start("GROUP  BY a"));
        assert!(is_clause_start("order by a"));
        assert!(is_clause_start("UNION ALL"));
        assert!(is_clause_start("LIMIT(5)"));
        assert!(!is_clause_start("GROUP a"));
        assert!(!is_clause_start("GROUPBY a"));
        assert!(!is_clause_start("WHERE_x = 1"));
        assert!(!is_clause_start("AND a = 1"));
        assert!(!is_clause_start(""));
    }

    #[test]
    fn test_is_join_start() {
        assert!(is_join_start("JOIN u"));
        assert!(is_join_start("  left join u"));
        assert!(is_join_start("INNER JOIN u ON a = b"));
        assert!(is_join_start("CROSS JOIN u"));
        assert!(is_join_start("LEFT OUTER JOIN u"));
        assert!(is_join_start("JOIN ("));
        assert!(!is_join_start("CROSS OUTER JOIN u"));
        assert!(!is_join_start("LEFT u"));
        assert!(!is_join_start("JOINED"));
        assert!(!is_join_start("FROM a JOIN b"));
    }

    #[test]
    fn test_opens_derived_join() {
        assert!(opens_derived_join("  LEFT JOIN (  "));
        assert!(opens_derived_join("join("));
        assert!(!opens_derived_join("JOIN (SELECT 1) x"));
        assert!(!opens_derived_join("REJOIN ("));
        assert!(!opens_derived_join("SELECT ("));
    }

    #[test]
    fn test_condition_keyword() {
        assert_eq!(
            condition_keyword("   and a = b"),
            Some(("AND".to_string(), " a = b"))
        );
        assert_eq!(condition_keyword("on(a = b)"), Some(("ON".to_string(), "(a = b)")));
        assert_eq!(condition_keyword("ORDER BY a"), None);
        assert_eq!(condition_keyword(""), None);
    }

    #[test]
    fn test_paren_delta() {
        assert_eq!(paren_delta("JOIN ("), 1);
        assert_eq!(paren_delta(") x"), -1);
        assert_eq!(paren_delta("f(a, (b))"), 0);
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("left join (", "JOIN"));
        assert!(!contains_word("joined", "JOIN"));
        assert!(!contains_word("x_join", "JOIN"));
        assert!(contains_word("a.join", "JOIN"));
    }

    #[test]
    fn test_table_indent_tracker() {
        let unit = IndentUnit::new(2);
        let mut tracker = TableIndentTracker::new();
        for line in ["SELECT a", "FROM", "", "    t0"] {
            tracker.observe(line, unit);
        }
        assert_eq!(tracker.table_indent(), Some(4));

        tracker.observe("from", unit);
        tracker.observe("\tt1", unit);
        assert_eq!(tracker.table_indent(), Some(2));

        tracker.observe("FROM t2", unit);
        tracker.observe("      x", unit);
        assert_eq!(tracker.table_indent(), Some(2));
    }

    #[test]
    fn test_table_indent_tracker_skips_join_lines() {
        let unit = IndentUnit::new(2);
        let mut tracker = TableIndentTracker::new();
        for line in ["FROM", "  JOIN (", "    LEFT JOIN u"] {
            tracker.observe(line, unit);
        }
        assert_eq!(tracker.table_indent(), None);

        tracker.observe("   t", unit);
        assert_eq!(tracker.table_indent(), Some(3));
    }
}
