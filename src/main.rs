//! relink - reconcile an archived source tree against its current layout.
//!
//! Usage:
//!   relink reconcile --archive DIR --current DIR   Full run, writes JSON/CSV/Markdown
//!   relink top --archive DIR --current DIR -n 20   Largest archived files only
//!   relink --help                                  Show help

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use relink_analyze::{Category, Reconciler, ScannedTrees, TopConfig, TopFileEntry};
use relink_core::{ReconcileConfig, RenameRule, SimilarityMode};
use relink_report::ReportWriter;

#[derive(Parser)]
#[command(
    name = "relink",
    version,
    about = "Reconcile an archived source tree against its restructured successor",
    long_about = "relink finds, for every file of an archived snapshot, where that file \
                  lives in the current tree: at the same path, at the same path in a \
                  different case, or as a same-named file elsewhere with similar content."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile every archived file and write the reports
    Reconcile {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Reconcile only the largest archived files
    Top {
        #[command(flatten)]
        run: RunArgs,

        /// Number of files to report
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Root of the archived snapshot
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Root of the current tree
    #[arg(long)]
    current: Option<PathBuf>,

    /// Prefix under which archived paths are expected (e.g. "resources/js")
    #[arg(long)]
    prefix: Option<String>,

    /// Directory the reports are written to
    #[arg(short, long, default_value = "reports")]
    out_dir: PathBuf,

    /// Extensions to include, replacing the configured list (e.g. ".vue")
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Directory names to skip, replacing the configured list
    #[arg(long = "exclude", value_name = "NAME")]
    excluded: Vec<String>,

    /// Extra legacy rename rule, tried after the configured ones
    #[arg(long = "rename", value_name = "FROM=TO")]
    renames: Vec<String>,

    /// Use the cheaper multiset similarity estimate
    #[arg(long)]
    quick: bool,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// TOML file with any subset of the settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Reconcile { run } => run_reconcile(&run),
        Command::Top { run, top } => run_top(&run, top),
    }
}

/// Log to stderr so stdout only carries the summaries.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Merge the config file, if any, with explicit flags.
fn build_config(args: &RunArgs) -> Result<ReconcileConfig> {
    let mut config = match &args.config {
        Some(path) => ReconcileConfig::from_toml_file(path)?,
        None => ReconcileConfig::new(PathBuf::new(), PathBuf::new()),
    };

    if let Some(archive) = &args.archive {
        config.archive_root = archive.clone();
    }
    if let Some(current) = &args.current {
        config.current_root = current.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.target_prefix = prefix.clone();
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    if !args.excluded.is_empty() {
        config.excluded_dirs = args.excluded.clone();
    }
    for rule in &args.renames {
        config.rename_rules.push(RenameRule::parse(rule)?);
    }
    if args.quick {
        config.similarity = SimilarityMode::Quick;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }

    Ok(config)
}

fn scan(reconciler: &Reconciler) -> Result<ScannedTrees> {
    let config = reconciler.config();
    eprintln!(
        "Scanning {} and {}...",
        config.archive_root.display(),
        config.current_root.display()
    );

    let trees = reconciler.scan().context("Scan failed")?;
    let caveats = trees.caveats();
    if !caveats.is_empty() {
        eprintln!(
            "Skipped unreadable directories: {} in archive, {} in current tree",
            caveats.archive_skipped_dirs, caveats.current_skipped_dirs
        );
    }
    Ok(trees)
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.set_message("resolving");
    Ok(pb)
}

/// Full run: reconcile everything and write the three reports.
fn run_reconcile(args: &RunArgs) -> Result<()> {
    let reconciler = Reconciler::new(build_config(args)?)?;
    let trees = scan(&reconciler)?;

    let pb = progress_bar(trees.archive.files.len())?;
    let report = reconciler.report(&trees, |_| pb.inc(1));
    pb.finish_and_clear();

    let paths = ReportWriter::new(&args.out_dir)
        .write_reports(&report)
        .context("Failed to write reports")?;

    println!();
    println!("{}", "─".repeat(60));
    println!(" Integration report - {} archived files", report.total);
    println!("{}", "─".repeat(60));
    for (category, count) in report.summary.iter() {
        println!("   {:<18} {:>8}", category.to_string(), count);
    }
    println!();
    for path in paths.iter() {
        println!(" Wrote {}", path.display());
    }

    Ok(())
}

/// Top-N run: resolve the largest archived files and describe them.
fn run_top(args: &RunArgs, limit: usize) -> Result<()> {
    let reconciler = Reconciler::new(build_config(args)?)?;
    let trees = scan(&reconciler)?;

    let top = TopConfig::builder().limit(limit).build()?;
    let pb = progress_bar(limit.min(trees.archive.files.len()))?;
    let entries = reconciler.top_files(&trees, &top, |_| pb.inc(1));
    pb.finish_and_clear();

    println!();
    println!("{}", "─".repeat(70));
    println!(" Largest {} archived files", entries.len());
    println!("{}", "─".repeat(70));
    for entry in &entries {
        print_entry(entry);
    }

    let path = ReportWriter::new(&args.out_dir)
        .write_top_report(&entries)
        .context("Failed to write report")?;
    println!();
    println!(" Wrote {}", path.display());

    Ok(())
}

fn print_entry(entry: &TopFileEntry) {
    println!(
        " {:>3}. {:<50} {:>10}  {}",
        entry.rank,
        truncate(&entry.archive_rel, 50),
        entry.size_human,
        entry.purpose
    );

    let target = entry.target_rel.as_deref().unwrap_or("");
    match entry.category {
        Category::Exact | Category::CaseInsensitive => {
            println!("      {} -> {}", entry.category, target);
        }
        Category::BasenameSimilar => {
            println!(
                "      {} ({:.4}) -> {}",
                entry.category,
                entry.similarity.unwrap_or(0.0),
                target
            );
            if !entry.candidates.is_empty() {
                println!("      candidates: {}", entry.candidates.join(", "));
            }
        }
        Category::Missing => println!("      {}", entry.category),
    }
}

/// Truncate a string to max chars, keeping the end of the path visible.
fn truncate(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(len - max_len + 1).collect();
        format!("…{tail}")
    }
}
