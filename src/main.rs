use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use diffscan::cli::{self, Commands, OutputFormat};
use diffscan::fingerprint::{cache_key, hunk_hash};
use diffscan::{Diff, FileDiff, LineInfo, Parser};

fn main() -> Result<()> {
    init_logging();
    let args = cli::parse_args();

    let diff = read_diff(args.file.as_deref())?;

    match args.command {
        Commands::Stats => handle_stats(&diff, args.format)?,
        Commands::Files => handle_files(&diff, args.format)?,
        Commands::Hunks => handle_hunks(&diff, args.format)?,
        Commands::Added => print_lines(&diff.added_lines(), args.format)?,
        Commands::Removed => print_lines(&diff.removed_lines(), args.format)?,
        Commands::Key => {
            let key = cache_key(&diff).context("Failed to serialize diff")?;
            println!("{}", key);
        }
        Commands::Dump => handle_dump(&diff, args.format)?,
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Read and parse the diff from `path`, or stdin when no path is given.
fn read_diff(path: Option<&Path>) -> Result<Diff> {
    let parser = Parser::new();
    let parsed = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            parser.parse_reader(BufReader::new(file))
        }
        None => parser.parse_reader(io::stdin().lock()),
    };
    let diff = parsed.context("Failed to parse diff")?;

    tracing::debug!(files = diff.files.len(), "diff loaded");
    Ok(diff)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn handle_stats(diff: &Diff, format: OutputFormat) -> Result<()> {
    let stats = diff.stats();
    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text => {
            println!("Files:         {}", stats.files);
            println!("Lines added:   {}", stats.lines_added);
            println!("Lines removed: {}", stats.lines_removed);
        }
    }
    Ok(())
}

/// One-letter status in the style of `git diff --name-status`.
fn file_status(file: &FileDiff) -> char {
    if file.is_new {
        'A'
    } else if file.is_deleted {
        'D'
    } else if file.is_renamed {
        'R'
    } else if file.is_copied {
        'C'
    } else {
        'M'
    }
}

fn handle_files(diff: &Diff, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&diff.modified_files())?,
        OutputFormat::Text => {
            for file in &diff.files {
                let mut line = format!("{} {}", file_status(file), file.display_path());
                if file.is_renamed || file.is_copied {
                    line.push_str(&format!(" ({}% similar)", file.similarity));
                }
                if file.is_binary {
                    line.push_str(" [binary]");
                }
                if file.is_mode_change() {
                    line.push_str(&format!(" [mode {} -> {}]", file.old_mode, file.new_mode));
                }
                println!("{}", line);
            }
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct HunkSummary<'a> {
    file: &'a str,
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
    has_changes: bool,
    hash: String,
}

fn handle_hunks(diff: &Diff, format: OutputFormat) -> Result<()> {
    let summaries: Vec<HunkSummary<'_>> = diff
        .files
        .iter()
        .flat_map(|file| {
            file.hunks.iter().map(move |hunk| HunkSummary {
                file: &file.new_path,
                old_start: hunk.old_start,
                old_count: hunk.old_count,
                new_start: hunk.new_start,
                new_count: hunk.new_count,
                has_changes: hunk.has_changes(),
                hash: hunk_hash(hunk),
            })
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&summaries)?,
        OutputFormat::Text => {
            for hunk in &summaries {
                println!(
                    "{} @@ -{},{} +{},{} @@ {}{}",
                    hunk.file,
                    hunk.old_start,
                    hunk.old_count,
                    hunk.new_start,
                    hunk.new_count,
                    &hunk.hash[..12],
                    if hunk.has_changes { "" } else { " (no changes)" }
                );
            }
        }
    }
    Ok(())
}

fn print_lines(lines: &[LineInfo], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(lines)?,
        OutputFormat::Text => {
            for line in lines {
                println!("{}:{}: {}", line.file, line.line, line.content);
            }
        }
    }
    Ok(())
}

fn handle_dump(diff: &Diff, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(diff)?,
        OutputFormat::Text => {
            for file in &diff.files {
                println!("{} {}", file_status(file), file.display_path());
                for hunk in &file.hunks {
                    println!(
                        "@@ -{},{} +{},{} @@",
                        hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
                    );
                    for line in &hunk.lines {
                        println!("{:>5} {}{}", line.number, line.kind.marker(), line.content);
                    }
                }
            }
        }
    }
    Ok(())
}
