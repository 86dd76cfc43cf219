use crate::derived_join::format_derived_join_blocks;
use crate::join_on::format_join_on_only;
use crate::line::IndentUnit;
use crate::mode::FormatOptions;
use crate::select_top::merge_select_top;
use crate::semicolon::move_semicolon_to_own_line;

/// SqlFormatter runs the 4-stage formatting pipeline:
///   1. Split JOIN/ON lines and align join conditions
///   2. Normalize derived-table (`JOIN (`) blocks
///   3. Merge `SELECT` / `TOP` lines
///   4. Move statement terminators to their own line
///
/// Comma style is not a stage: callers convert commas before running the
/// pipeline (see [`crate::commas::CommaPosition`]).
pub struct SqlFormatter {
    unit: IndentUnit,
}

impl SqlFormatter {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            unit: IndentUnit::new(options.indent_size),
        }
    }

    /// Run the full pipeline. Output lines are joined with `\n`.
    pub fn format(&self, text: &str) -> String {
        // Stage 1: JOIN/ON
        let text = format_join_on_only(text, self.unit.width());

        // Stage 2: derived-table blocks
        let text = format_derived_join_blocks(&text, self.unit.width());

        // Stage 3: SELECT TOP
        let text = merge_select_top(&text);

        // Stage 4: semicolons
        move_semicolon_to_own_line(&text)
    }
}

/// Format `text` with every pipeline stage, in order.
pub fn format_sql_all(text: &str, options: &FormatOptions) -> String {
    SqlFormatter::new(options).format(text)
}
