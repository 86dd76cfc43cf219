use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::SqlbenchError;
use crate::formatter::format_sql_all;
use crate::line::{split_lines, strip_line_comment};
use crate::mode::Mode;
use crate::report::{FileResult, Report};

/// Format a SQL string according to the given mode.
///
/// Commas are converted first, then the formatting pipeline runs, then the
/// result is checked against the source unless the mode skips it.
pub fn format_string(source: &str, mode: &Mode) -> Result<String, SqlbenchError> {
    let converted = mode.comma_position.apply(source);
    let result = format_sql_all(&converted, &mode.format_options());

    if mode.should_safety_check() {
        safety_check(source, &result)?;
    }

    Ok(result)
}

/// Run the formatter on a collection of files.
pub fn run(files: &[PathBuf], mode: &Mode) -> Report {
    let matching_paths = get_matching_paths(files, mode);
    let progress = progress_bar(matching_paths.len(), mode);
    let mut report = Report::new();

    let format_one = |path: &PathBuf| {
        let result = format_file(path, mode);
        progress.inc(1);
        result
    };

    if mode.single_process || matching_paths.len() <= 1 {
        for path in &matching_paths {
            report.add(format_one(path));
        }
    } else {
        use rayon::prelude::*;

        // 0 lets rayon pick one thread per core.
        match rayon::ThreadPoolBuilder::new()
            .num_threads(mode.threads)
            .build()
        {
            Ok(pool) => {
                let results: Vec<FileResult> =
                    pool.install(|| matching_paths.par_iter().map(format_one).collect());
                for result in results {
                    report.add(result);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "thread pool unavailable, formatting sequentially");
                for path in &matching_paths {
                    report.add(format_one(path));
                }
            }
        }
    }

    progress.finish_and_clear();
    report
}

fn progress_bar(len: usize, mode: &Mode) -> ProgressBar {
    if !mode.show_progress(len) {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}

/// Format a single file.
fn format_file(path: &Path, mode: &Mode) -> FileResult {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => return FileResult::error(path, format!("Read error: {}", e)),
    };

    let formatted = match format_string(&source, mode) {
        Ok(f) => f,
        Err(e) => return FileResult::error(path, e.to_string()),
    };

    if source == formatted {
        tracing::debug!(path = %path.display(), "unchanged");
        return FileResult::unchanged(path);
    }

    if mode.check || mode.diff {
        if mode.diff {
            if let Err(e) = print_diff(path, &source, &formatted, mode.color()) {
                tracing::warn!(error = %e, "could not write diff");
            }
        }
        return FileResult::changed(path);
    }

    match std::fs::write(path, &formatted) {
        Ok(_) => {
            tracing::debug!(path = %path.display(), "reformatted");
            FileResult::changed(path)
        }
        Err(e) => FileResult::error(path, format!("Write error: {}", e)),
    }
}

/// Get all SQL file paths that match the given inputs.
///
/// Directories are walked recursively. Arguments containing glob
/// metacharacters are expanded. Anything matching an `exclude` pattern is
/// dropped. The result is sorted and free of duplicates.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let extensions = mode.sql_extensions();
    let exclude = build_exclude_set(&mode.exclude);
    let mut result = HashSet::new();

    for path in expand_globs(paths) {
        if is_excluded(&path, &exclude) {
            continue;
        }
        if path.is_file() {
            if is_sql_file(&path, extensions) {
                result.insert(path);
            }
        } else if path.is_dir() {
            collect_sql_files(&path, extensions, &exclude, &mut result);
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

fn expand_globs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        let text = path.to_string_lossy();
        if !text.contains(&['*', '?', '['][..]) {
            expanded.push(path.clone());
            continue;
        }
        match glob::glob(&text) {
            Ok(entries) => expanded.extend(entries.flatten()),
            Err(e) => {
                tracing::warn!(pattern = %text, error = %e, "invalid glob pattern");
                expanded.push(path.clone());
            }
        }
    }
    expanded
}

fn build_exclude_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!(pattern = %pattern, error = %e, "ignoring exclude pattern"),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Excluded when either the whole path or its final component matches.
fn is_excluded(path: &Path, exclude: &GlobSet) -> bool {
    if exclude.is_empty() {
        return false;
    }
    exclude.is_match(path) || path.file_name().is_some_and(|name| exclude.is_match(name))
}

/// Check if a file has a SQL extension.
fn is_sql_file(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Recursively collect SQL files from a directory.
fn collect_sql_files(
    dir: &Path,
    extensions: &[&str],
    exclude: &GlobSet,
    result: &mut HashSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden || is_excluded(&path, exclude) {
            continue;
        }

        if path.is_dir() {
            collect_sql_files(&path, extensions, exclude, result);
        } else if is_sql_file(&path, extensions) {
            result.insert(path);
        }
    }
}

/// The formatter only moves whitespace, commas and terminators between
/// lines and upper-cases keywords, so the code characters of both texts must
/// agree in order once whitespace and `--` tails are removed.
fn safety_check(original: &str, formatted: &str) -> Result<(), SqlbenchError> {
    let before = code_chars(original);
    let after = code_chars(formatted);

    if let Some(pos) = before.iter().zip(&after).position(|(a, b)| a != b) {
        return Err(SqlbenchError::Equivalence(format!(
            "formatted text differs from the source at code character {}: {:?} became {:?}",
            pos, before[pos], after[pos]
        )));
    }
    if before.len() != after.len() {
        return Err(SqlbenchError::Equivalence(format!(
            "code length mismatch: source has {} characters, formatted has {}",
            before.len(),
            after.len()
        )));
    }
    Ok(())
}

fn code_chars(text: &str) -> Vec<char> {
    split_lines(text)
        .into_iter()
        .flat_map(|line| strip_line_comment(line).chars())
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Print a diff between original and formatted content to stderr.
fn print_diff(path: &Path, original: &str, formatted: &str, color: bool) -> std::io::Result<()> {
    use similar::{ChangeTag, TextDiff};

    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let stream = StandardStream::stderr(choice);
    let mut out = stream.lock();

    writeln!(out, "--- {}", path.display())?;
    writeln!(out, "+++ {}", path.display())?;

    let diff = TextDiff::from_lines(original, formatted);
    for change in diff.iter_all_changes() {
        let (sign, fg) = match change.tag() {
            ChangeTag::Delete => ("-", Some(Color::Red)),
            ChangeTag::Insert => ("+", Some(Color::Green)),
            ChangeTag::Equal => (" ", None),
        };
        out.set_color(ColorSpec::new().set_fg(fg))?;
        write!(out, "{}{}", sign, change)?;
        if change.missing_newline() {
            writeln!(out)?;
        }
    }
    out.reset()
}
