use serde::Deserialize;

use crate::commas::CommaPosition;
use crate::line::{DEFAULT_INDENT, MAX_INDENT, MIN_INDENT};

/// Configuration seen by the formatting pipeline itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per indentation level. Clamped to 1..=8 by the pipeline.
    pub indent_size: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_INDENT,
        }
    }
}

/// Mode holds all configuration for a sqlbench run.
#[derive(Debug, Clone, Deserialize)]
pub struct Mode {
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    #[serde(default)]
    pub comma_position: CommaPosition,

    #[serde(default)]
    pub check: bool,

    #[serde(default)]
    pub diff: bool,

    /// Skip the safety equivalence check.
    #[serde(default)]
    pub fast: bool,

    /// Glob patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub no_progressbar: bool,

    #[serde(default)]
    pub no_color: bool,

    #[serde(default)]
    pub force_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[serde(default)]
    pub threads: usize,

    #[serde(default)]
    pub single_process: bool,
}

fn default_indent_size() -> usize {
    DEFAULT_INDENT
}

impl Mode {
    /// Pipeline options, with the indent size clamped into range.
    pub fn format_options(&self) -> FormatOptions {
        let indent_size = self.indent_size.clamp(MIN_INDENT, MAX_INDENT);
        if indent_size != self.indent_size {
            tracing::warn!(
                requested = self.indent_size,
                used = indent_size,
                "indent size out of range"
            );
        }
        FormatOptions { indent_size }
    }

    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        if self.force_color {
            return true;
        }
        if self.no_color {
            return false;
        }
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }
        true
    }

    /// Whether the safety check should be performed.
    pub fn should_safety_check(&self) -> bool {
        !self.fast && !self.check && !self.diff
    }

    /// Whether a progress bar should be drawn for `file_count` files.
    pub fn show_progress(&self, file_count: usize) -> bool {
        file_count > 1 && !self.quiet && !self.no_progressbar
    }

    /// SQL file extensions to process.
    pub fn sql_extensions(&self) -> &[&str] {
        &["sql", "ddl", "dml"]
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_INDENT,
            comma_position: CommaPosition::default(),
            check: false,
            diff: false,
            fast: false,
            exclude: Vec::new(),
            verbose: false,
            quiet: false,
            no_progressbar: false,
            no_color: false,
            force_color: false,
            threads: 0,
            single_process: false,
        }
    }
}
