use std::io::Write;
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Status of formatting a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    /// Reformatted, or would be under `--check` / `--diff`.
    Changed,
    Error,
}

/// Result of formatting a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub error: Option<String>,
}

impl FileResult {
    pub fn unchanged(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Unchanged,
            error: None,
        }
    }

    pub fn changed(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Changed,
            error: None,
        }
    }

    pub fn error(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Error,
            error: Some(message.into()),
        }
    }
}

/// Aggregated report of formatting results.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn unchanged(&self) -> usize {
        self.count(FileStatus::Unchanged)
    }

    pub fn changed(&self) -> usize {
        self.count(FileStatus::Changed)
    }

    pub fn errors(&self) -> usize {
        self.count(FileStatus::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    /// Process exit code: 2 on any error, 1 when `check` found files to
    /// reformat, 0 otherwise.
    pub fn exit_code(&self, check: bool) -> i32 {
        if self.has_errors() {
            2
        } else if check && self.has_changes() {
            1
        } else {
            0
        }
    }

    /// One-line summary. `check` words changed files as pending.
    pub fn summary(&self, check: bool) -> String {
        let mut parts = vec![format!("{} file(s) processed", self.total())];
        if self.changed() > 0 {
            let verb = if check { "would be reformatted" } else { "reformatted" };
            parts.push(format!("{} {}", self.changed(), verb));
        }
        if self.unchanged() > 0 {
            parts.push(format!("{} unchanged", self.unchanged()));
        }
        if self.errors() > 0 {
            parts.push(format!("{} error(s)", self.errors()));
        }
        parts.join(", ")
    }

    /// Write per-file lines for changed files and errors, then the summary,
    /// to stderr. Errors are always written; the rest only when not `quiet`.
    pub fn print(&self, check: bool, verbose: bool, quiet: bool, color: bool) -> std::io::Result<()> {
        let choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let stream = StandardStream::stderr(choice);
        let mut out = stream.lock();

        for result in &self.results {
            match (&result.status, &result.error) {
                (FileStatus::Error, error) => {
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                    write!(out, "error")?;
                    out.reset()?;
                    writeln!(
                        out,
                        ": {}: {}",
                        result.path.display(),
                        error.as_deref().unwrap_or("unknown error")
                    )?;
                }
                (FileStatus::Changed, _) if verbose && !quiet => {
                    let verb = if check { "would reformat" } else { "reformatted" };
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                    write!(out, "{}", verb)?;
                    out.reset()?;
                    writeln!(out, " {}", result.path.display())?;
                }
                _ => {}
            }
        }

        if !quiet {
            writeln!(out, "{}", self.summary(check))?;
        }
        Ok(())
    }
}
