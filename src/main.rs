//! CLI entry point for `emlrename`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use emlrename::config::{self, Config};
use emlrename::folder::{self, FolderSummary, ProcessOptions, RunSummary, SanitizePolicy};
use emlrename::naming::build_filename;
use emlrename::normalize::{normalize_fields, Rules};
use emlrename::parser::date::canonical_timestamp;
use emlrename::parser::eml::parse_message;

const LINE: &str = "------------------------------------------------------------";

#[derive(Parser)]
#[command(
    name = "emlrename",
    version,
    about = "Rename .eml files after their date, subject, sender and recipient"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the standard location
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename every message file in one or more folders
    Rename {
        #[arg(required = true, value_name = "DIR")]
        dirs: Vec<PathBuf>,
        /// Compute and log the new names without renaming anything
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Skip the filename sanitizing pre-pass
        #[arg(long)]
        no_sanitize: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Only run the filename sanitizing pass
    Sanitize {
        #[arg(required = true, value_name = "DIR")]
        dirs: Vec<PathBuf>,
    },
    /// Show what a folder contains
    Summary {
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show the name a single message file would get
    Preview {
        file: PathBuf,
    },
    /// Show where the config file and diagnostic log live
    Config {
        /// Write the current settings to the config file if none exists yet
        #[arg(long)]
        init: bool,
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

    let config = match cli.config.as_deref() {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Rename {
            dirs,
            dry_run,
            no_sanitize,
            json,
        } => cmd_rename(&dirs, dry_run, no_sanitize, json, &config),
        Commands::Sanitize { dirs } => cmd_sanitize(&dirs, &config),
        Commands::Summary { dir, json } => cmd_summary(&dir, json, &config),
        Commands::Preview { file } => cmd_preview(&file, &config),
        Commands::Config { init } => cmd_config(init, cli.config.as_deref(), &config),
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

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, config::LOG_FILE_NAME);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Sanitize, summarize and rename each folder in turn.
fn cmd_rename(
    dirs: &[PathBuf],
    dry_run: bool,
    no_sanitize: bool,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let options = ProcessOptions::from_config(config, dry_run);
    let mut summaries = Vec::with_capacity(dirs.len());

    for dir in dirs {
        if !json {
            println!("{LINE}");
        }
        if !dry_run && !no_sanitize {
            let count = folder::sanitize_filenames(dir, SanitizePolicy::from(&config.sanitize))?;
            if !json {
                println!("Names of {count} files were sanitized.");
            }
        }
        if !json {
            print!("{}", FolderSummary::scan(dir, &options.extension)?);
        }

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Renaming [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("valid template")
                .progress_chars("#>-"),
        );

        let summary = folder::process_folder(
            dir,
            &options,
            Some(&|current, total| {
                pb.set_length(total as u64);
                pb.set_position(current as u64);
            }),
        )?;
        pb.finish_and_clear();

        if !json {
            print_run_table(dir, &summary);
        }
        summaries.push(summary);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("\nAll done!\n{LINE}");
    }
    Ok(())
}

fn cmd_sanitize(dirs: &[PathBuf], config: &Config) -> anyhow::Result<()> {
    let policy = SanitizePolicy::from(&config.sanitize);
    for dir in dirs {
        let count = folder::sanitize_filenames(dir, policy)?;
        println!("{}: names of {count} files were sanitized.", dir.display());
    }
    Ok(())
}

fn cmd_summary(dir: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let summary = FolderSummary::scan(dir, &config.general.extension)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

/// Print the normalized fields and resulting name for one file.
fn cmd_preview(file: &Path, config: &Config) -> anyhow::Result<()> {
    let rules = Rules::from_config(config);
    let record = parse_message(file)?;
    let timestamp = canonical_timestamp(record.date.as_deref(), &rules);
    let fields = normalize_fields(&record, &timestamp.text, &rules);
    let name = build_filename(
        &fields,
        config.limits.max_filename_len,
        &config.general.extension,
    );

    println!();
    println!("  {:<10} {}", "Date", fields.date);
    println!("  {:<10} {}", "Subject", fields.subject);
    println!("  {:<10} {}", "From", fields.from);
    println!("  {:<10} {}", "To", fields.to);
    println!("  {:<10} {}", "New name", name);
    if !timestamp.is_known() {
        println!("  (no usable Date: header)");
    }
    println!();
    Ok(())
}

/// Print the config and log locations, optionally writing a starter config.
fn cmd_config(init: bool, explicit: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(config::config_file_path);

    if init {
        if let Some(existing) = path.as_deref().filter(|p| p.exists()) {
            anyhow::bail!("Config file already exists: {}", existing.display());
        }
        let written = match explicit {
            Some(path) => {
                config::save_config_to(config, path)?;
                path.to_path_buf()
            }
            None => config::save_config(config)?,
        };
        println!("Wrote {}", written.display());
    }

    match path {
        Some(path) => println!("  {:<12} {}", "Config", path.display()),
        None => println!("  {:<12} (none)", "Config"),
    }
    println!(
        "  {:<12} {}",
        "Log",
        config::log_file_path(config).display()
    );
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "emlrename", &mut std::io::stdout());
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

/// Print the totals of one run.
fn print_run_table(dir: &Path, summary: &RunSummary) {
    let verb = if summary.dry_run {
        "Would rename"
    } else {
        "Renamed"
    };
    println!();
    println!("  {:<22} {}", "Folder", dir.display());
    println!("  {:<22} {}", "E-mail files found", summary.files_found);
    println!("  {:<22} {}", "Unopenable", summary.unopenable.len());
    println!("  {:<22} {}", "Unparseable", summary.unparseable.len());
    println!("  {:<22} {}", "Unique senders", summary.senders.len());
    println!("  {:<22} {}", "Unique recipients", summary.recipients.len());
    println!("  {:<22} {}", verb, summary.renamed);
    println!("  {:<22} {}", "Already named", summary.unchanged);
    println!("  {:<22} {}", "Without date", summary.undated);
    println!("  {:<22} {}", "Failed", summary.failures.len());
    for failure in &summary.failures {
        println!("    {failure}");
    }
    println!();
}
