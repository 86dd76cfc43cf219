use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sqlbench::{CommaPosition, Mode};

/// sqlbench - line-oriented SQL reformatter.
/// Aligns JOIN/ON blocks, normalizes derived-table joins, merges SELECT TOP
/// and puts statement terminators on their own line.
#[derive(Parser, Debug)]
#[command(name = "sqlbench", version, about)]
struct Cli {
    /// Files, directories or glob patterns to format. Use "-" to read from stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Spaces per indentation level (1-8).
    #[arg(short = 'i', long)]
    indent_size: Option<usize>,

    /// Where list commas go.
    #[arg(long, value_enum)]
    comma_position: Option<CommaPosition>,

    /// Check formatting without writing changes.
    #[arg(long)]
    check: bool,

    /// Show formatting diff.
    #[arg(long)]
    diff: bool,

    /// Skip safety equivalence check (faster).
    #[arg(long)]
    fast: bool,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long)]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progressbar: bool,

    /// Force color output.
    #[arg(long)]
    force_color: bool,

    /// Disable color output.
    #[arg(long)]
    no_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to config file (sqlbench.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn is_stdin(&self) -> bool {
        self.files.len() == 1 && self.files[0].to_string_lossy() == "-"
    }

    /// Command-line values layered over the loaded config.
    fn into_mode(self, base: Mode) -> Mode {
        Mode {
            indent_size: self.indent_size.unwrap_or(base.indent_size),
            comma_position: self.comma_position.unwrap_or(base.comma_position),
            check: self.check,
            diff: self.diff,
            fast: self.fast || base.fast,
            exclude: if self.exclude.is_empty() {
                base.exclude
            } else {
                self.exclude
            },
            verbose: self.verbose,
            quiet: self.quiet,
            no_progressbar: self.no_progressbar,
            no_color: self.no_color,
            force_color: self.force_color,
            threads: self.threads,
            single_process: self.single_process,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,sqlbench=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match try_main(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };
    std::process::exit(code);
}

fn try_main(cli: Cli) -> anyhow::Result<i32> {
    let is_stdin = cli.is_stdin();
    let files = if is_stdin { Vec::new() } else { cli.files.clone() };

    let base_mode = sqlbench::load_config(&files, cli.config.as_deref())
        .context("Configuration error")?;
    let mode = cli.into_mode(base_mode);

    if is_stdin {
        return format_stdin(&mode);
    }

    let report = sqlbench::run(&files, &mode);
    report
        .print(mode.check, mode.verbose, mode.quiet, mode.color())
        .context("writing report")?;
    Ok(report.exit_code(mode.check))
}

/// Format stdin to stdout. Under `--check` nothing is printed and the exit
/// code tells whether the input would change.
fn format_stdin(mode: &Mode) -> anyhow::Result<i32> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("Error reading stdin")?;

    let formatted = sqlbench::format_string(&source, mode)?;
    if mode.check {
        return Ok(i32::from(formatted != source));
    }
    print!("{}", formatted);
    Ok(0)
}
