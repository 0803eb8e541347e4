//! CLI entry point for `listsift`.

use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use listsift::config::{self, Config};
use listsift::export::bodies::BodyWriter;
use listsift::export::catalog::CatalogWriter;
use listsift::pipeline::{extract_file, extract_stream, ExtractOptions, ExtractStats};

#[derive(Parser)]
#[command(
    name = "listsift",
    version,
    about = "Extract messages from mailing-list archive dumps"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract messages into an NDJSON catalog and a TSV bodies file
    Extract {
        /// Archive text files to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Catalog output path (one JSON object per message)
        #[arg(short, long, default_value = "catalog.jsonl")]
        catalog: PathBuf,

        /// Bodies output path (one id<TAB>body line per message)
        #[arg(short, long, default_value = "bodies.tsv")]
        bodies: PathBuf,

        /// Lower inclusive bound for accepted Date years
        #[arg(long)]
        min_year: Option<i32>,

        /// Upper inclusive bound for accepted Date years
        #[arg(long)]
        max_year: Option<i32>,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Segment inputs and report counts without writing output
    Stats {
        /// Archive text files to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config();

    let log_level = match cli.verbose {
        0 => cfg.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    setup_logging(&log_level, &cfg);

    match cli.command {
        Commands::Extract {
            inputs,
            catalog,
            bodies,
            min_year,
            max_year,
            quiet,
        } => cmd_extract(&inputs, &catalog, &bodies, min_year, max_year, quiet, &cfg),
        Commands::Stats { inputs, json } => cmd_stats(&inputs, json, &cfg),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "listsift.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Options for one input file: config defaults, flag overrides, and the
/// archive name recorded in every record.
fn options_for(input: &Path, min_year: Option<i32>, max_year: Option<i32>, cfg: &Config) -> ExtractOptions {
    let bounds = (
        min_year.unwrap_or(cfg.extract.min_year),
        max_year.unwrap_or(cfg.extract.max_year),
    );
    let archive = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    ExtractOptions {
        year_bounds: bounds,
        extras: vec![("archive".to_string(), archive)],
    }
}

/// Extract all inputs into the two sinks.
fn cmd_extract(
    inputs: &[PathBuf],
    catalog_path: &Path,
    bodies_path: &Path,
    min_year: Option<i32>,
    max_year: Option<i32>,
    quiet: bool,
    cfg: &Config,
) -> anyhow::Result<()> {
    let catalog_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(catalog_path)?;
    let bodies_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(bodies_path)?;
    let mut catalog = CatalogWriter::new(BufWriter::new(catalog_file));
    let mut bodies = BodyWriter::new(BufWriter::new(bodies_file));

    let start = Instant::now();
    let mut total = ExtractStats::default();

    for input in inputs {
        let options = options_for(input, min_year, max_year, cfg);

        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(std::fs::metadata(input).map(|m| m.len()).unwrap_or(0));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(&format!(
                        "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{eta}})",
                        input.display()
                    ))
                    .expect("valid template")
                    .progress_chars("#>-"),
            );
            pb
        };

        let stats = extract_file(
            input,
            &options,
            &mut catalog,
            &mut bodies,
            Some(&|current, total_bytes| {
                pb.set_length(total_bytes);
                pb.set_position(current);
            }),
        )?;
        pb.finish_and_clear();

        println!(
            "  {}: {} message(s), {} block(s) skipped",
            input.display(),
            stats.messages,
            stats.skipped
        );
        total.messages += stats.messages;
        total.skipped += stats.skipped;
    }

    println!(
        "  Wrote {} message(s) from {} file(s) in {:.1?} → {} + {}",
        total.messages,
        inputs.len(),
        start.elapsed(),
        catalog_path.display(),
        bodies_path.display()
    );
    Ok(())
}

/// Segment and count each input, discarding the records.
fn cmd_stats(inputs: &[PathBuf], json: bool, cfg: &Config) -> anyhow::Result<()> {
    let mut report: Vec<(String, ExtractStats)> = Vec::new();

    for input in inputs {
        let options = options_for(input, None, None, cfg);
        let file = std::fs::File::open(input)?;
        let reader = std::io::BufReader::with_capacity(cfg.performance.read_buffer_size, file);
        let mut catalog = CatalogWriter::new(std::io::sink());
        let mut bodies = BodyWriter::new(std::io::sink());
        let stats = extract_stream(reader, &options, &mut catalog, &mut bodies)?;
        report.push((input.display().to_string(), stats));
    }

    if json {
        let entries: Vec<serde_json::Value> = report
            .iter()
            .map(|(path, stats)| {
                serde_json::json!({
                    "file": path,
                    "messages": stats.messages,
                    "skipped": stats.skipped,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (path, stats) in &report {
            println!(
                "  {path}: {} message(s), {} block(s) skipped",
                stats.messages, stats.skipped
            );
        }
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "listsift", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
