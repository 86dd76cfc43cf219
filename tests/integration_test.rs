use pretty_assertions::assert_eq;
use sqlbench::{
    format_derived_join_blocks, format_join_on_only, format_sql_all, format_string,
    merge_select_top, move_semicolon_to_own_line, split_sql_statements, to_leading_commas,
    to_trailing_commas, toggle_block_comment, toggle_line_comments, CommaPosition, FormatOptions,
    Mode, SqlbenchError,
};

fn default_options() -> FormatOptions {
    FormatOptions::default()
}

fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn non_blank_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| *w != ";")
        .map(|w| w.trim_end_matches(';').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

// ─── Stage scenarios ───

#[test]
fn test_join_on_scenario() {
    assert_eq!(
        format_join_on_only("SELECT a, b\nFROM t\nJOIN u ON t.id = u.id", 2),
        "SELECT a, b\nFROM t\n  JOIN u\n    ON t.id = u.id"
    );
}

#[test]
fn test_select_top_scenario() {
    assert_eq!(
        merge_select_top("SELECT\n  TOP 10 a, b\nFROM t"),
        "SELECT TOP 10\n  a, b\nFROM t"
    );
}

#[test]
fn test_semicolon_scenario() {
    assert_eq!(move_semicolon_to_own_line("SELECT 1 ;"), "SELECT 1\n;");
}

#[test]
fn test_derived_table_scenario() {
    let sql = "FROM t0\n  JOIN (\nSELECT x FROM y\n  ) z ON z.id = t0.id";
    let expected = "FROM t0\n  JOIN (\n    SELECT x FROM y\n  ) z\n    ON z.id = t0.id";
    assert_eq!(format_sql_all(sql, &default_options()), expected);
}

#[test]
fn test_comma_scenarios() {
    let leading = to_leading_commas("a,\nb,\nc");
    assert_eq!(leading, "a\n, b\n, c");
    assert_eq!(to_trailing_commas(&leading), "a,\nb,\nc");

    assert_eq!(to_leading_commas("a,\n\nb"), "a,\n\nb");
}

// ─── Pipeline properties ───

const REPORT_QUERY: &str = "SELECT DISTINCT
  TOP (25) PERCENT o.id, c.name, x.total
FROM
  orders o
inner join customers c on c.id = o.customer_id and c.active = 1
LEFT JOIN (
SELECT
  oi.order_id, SUM(oi.amount) AS total
FROM
  order_items oi
JOIN products p ON p.id = oi.product_id
GROUP BY
  oi.order_id
) x ON x.order_id = o.id
WHERE
  o.status = 'open'
ORDER BY
  o.id;";

#[test]
fn test_full_pipeline_layout() {
    let expected = "SELECT DISTINCT TOP (25) PERCENT
  o.id, c.name, x.total
FROM
  orders o
    inner join customers c
      ON c.id = o.customer_id and c.active = 1
    LEFT JOIN (
      SELECT
        oi.order_id, SUM(oi.amount) AS total
      FROM
        order_items oi
          JOIN products p
            ON p.id = oi.product_id
      GROUP BY
        oi.order_id
    ) x
      ON x.order_id = o.id
WHERE
  o.status = 'open'
ORDER BY
  o.id
;";
    assert_eq!(format_sql_all(REPORT_QUERY, &default_options()), expected);
}

#[test]
fn test_pipeline_is_idempotent() {
    for indent_size in [1, 2, 4, 8] {
        let options = FormatOptions { indent_size };
        let once = format_sql_all(REPORT_QUERY, &options);
        assert_eq!(format_sql_all(&once, &options), once, "indent {}", indent_size);
    }
}

#[test]
fn test_pipeline_keeps_words() {
    let formatted = format_sql_all(REPORT_QUERY, &default_options());
    let upper = |words: Vec<String>| -> Vec<String> {
        words.into_iter().map(|w| w.to_ascii_uppercase()).collect()
    };
    assert_eq!(
        upper(non_blank_words(&formatted)),
        upper(non_blank_words(REPORT_QUERY))
    );
}

#[test]
fn test_derived_stage_is_idempotent() {
    let once = format_derived_join_blocks(REPORT_QUERY, 2);
    assert_eq!(format_derived_join_blocks(&once, 2), once);
}

#[test]
fn test_semicolon_line_delta() {
    let sql = "SELECT 1;\nSELECT 2\n;\n  ;  \nSELECT 3 -- done;";
    let out = move_semicolon_to_own_line(sql);
    assert_eq!(out, "SELECT 1\n;\nSELECT 2\n;\n;\nSELECT 3 -- done;");
    assert_eq!(line_count(&out), line_count(sql) + 1);
}

#[test]
fn test_select_top_line_delta() {
    let sql = "SELECT\nTOP 5\nFROM t\nUNION ALL\nSELECT\n  TOP 5 a\nFROM u";
    let out = merge_select_top(sql);
    assert_eq!(out, "SELECT TOP 5\nFROM t\nUNION ALL\nSELECT TOP 5\n  a\nFROM u");
    assert_eq!(line_count(&out), line_count(sql) - 1);
}

#[test]
fn test_comma_round_trip_with_comments() {
    let trailing = "SELECT\n  a, -- key\n  b,\n\n  c,\n  -- note\n  d\nFROM t";
    let leading = to_leading_commas(trailing);
    assert_eq!(
        leading,
        "SELECT\n  a -- key\n  , b,\n\n  c,\n  -- note\n  d\nFROM t"
    );
    assert_eq!(to_trailing_commas(&leading), trailing);
}

#[test]
fn test_malformed_input_does_not_panic() {
    let inputs = [
        "",
        "\n\n",
        ")))",
        "JOIN (",
        "FROM\n",
        "LEFT JOIN (\n((((\n",
        "SELECT\n",
        "SELECT\nTOP",
        ";;;",
        ", , ,",
        "\t\tJOIN x ON\n\tAND",
    ];
    for input in inputs {
        let _ = format_sql_all(input, &default_options());
        let _ = to_leading_commas(input);
        let _ = to_trailing_commas(input);
    }
}

// ─── Public API ───

#[test]
fn test_format_string_leading_commas() {
    let result = format_string("SELECT\n  a,\n  b\nFROM t\nJOIN u ON u.id = t.id;", &Mode::default()).unwrap();
    assert_eq!(
        result,
        "SELECT\n  a\n  , b\nFROM t\n  JOIN u\n    ON u.id = t.id\n;"
    );
}

#[test]
fn test_format_string_trailing_commas() {
    let mode = Mode {
        comma_position: CommaPosition::After,
        indent_size: 4,
        ..Mode::default()
    };
    let result = format_string("SELECT\n    a\n    , b\nFROM\n    t\nJOIN u ON u.id = t.id", &mode).unwrap();
    assert_eq!(
        result,
        "SELECT\n    a,\n    b\nFROM\n    t\n        JOIN u\n            ON u.id = t.id"
    );
}

#[test]
fn test_format_string_clamps_indent() {
    let mode = Mode {
        indent_size: 0,
        ..Mode::default()
    };
    let result = format_string("FROM t\nJOIN u ON u.id = t.id", &mode).unwrap();
    assert_eq!(result, "FROM t\n JOIN u\n  ON u.id = t.id");
}

#[test]
fn test_format_then_split_statements() {
    let formatted = format_string("SELECT 1;\nSELECT TOP 1 a FROM t;", &Mode::default()).unwrap();
    assert_eq!(
        split_sql_statements(&formatted),
        vec!["SELECT 1", "SELECT TOP 1 a FROM t"]
    );
}

#[test]
fn test_toggle_comments_round_trip() {
    let sql = "SELECT a\n\n  FROM t";
    let commented = toggle_line_comments(sql);
    assert_eq!(commented, "-- SELECT a\n\n--   FROM t");
    assert_eq!(toggle_line_comments(&commented), sql);
}

#[test]
fn test_block_comment_around_formatted_statement() {
    let formatted = format_sql_all("FROM t\nJOIN u ON u.id = t.id;", &default_options());
    let commented = toggle_block_comment(&formatted);
    assert_eq!(commented, "/*\nFROM t\n  JOIN u\n    ON u.id = t.id\n;\n*/");
    assert_eq!(toggle_block_comment(&commented), formatted);
}

#[test]
fn test_semicolon_after_literal_with_dashes() {
    let formatted = format_string("SELECT 'a--b' AS x;\nSELECT 2;", &Mode::default()).unwrap();
    assert_eq!(formatted, "SELECT 'a--b' AS x\n;\nSELECT 2\n;");
    assert_eq!(
        split_sql_statements(&formatted),
        vec!["SELECT 'a--b' AS x", "SELECT 2"]
    );
}

#[test]
fn test_error_display() {
    let err = SqlbenchError::Config("bad".to_string());
    assert_eq!(err.to_string(), "sqlbench config error: bad");
}
