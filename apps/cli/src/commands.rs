//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use nbpress_compose::{unmatched_overrides, validate_settings};
use nbpress_core::{PublishConfig, clean_notebook_file, locate_notebooks, publish_notebook};
use nbpress_notebook::CleanOptions;
use nbpress_shared::{AppConfig, init_config, load_config, validate_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nbpress — publish documentation notebooks for the hosted runtime.
#[derive(Parser)]
#[command(
    name = "nbpress",
    version,
    about = "Filter, rewrite, and compose documentation notebooks into publishable form.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Publish every notebook under the source tree.
    Publish {
        /// Source root containing the docs tree (defaults to the working
        /// directory).
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Clean notebook files without publishing them.
    Clean {
        /// Notebook files to clean.
        files: Vec<PathBuf>,

        /// Also drop cell ids.
        #[arg(long)]
        strip_ids: bool,

        /// Also drop stdout stream outputs.
        #[arg(long)]
        strip_stdout: bool,

        /// Write to a `.copy` sibling instead of rewriting in place.
        #[arg(long)]
        copy: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nbpress=info",
        1 => "nbpress=debug",
        _ => "nbpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Publish { root } => cmd_publish(root),
        Command::Clean {
            files,
            strip_ids,
            strip_stdout,
            copy,
        } => cmd_clean(&files, strip_ids, strip_stdout, copy),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// publish
// ---------------------------------------------------------------------------

fn cmd_publish(root: Option<PathBuf>) -> Result<()> {
    // Validate configuration and the compiled-in sequence tables before
    // touching any file.
    let config = load_config()?;
    validate_config(&config)?;
    validate_settings()?;

    let root = match root {
        Some(p) => p,
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    let publish_config = PublishConfig::from_app(&root, &config);
    let notebooks = locate_notebooks(&root, &config.output.subdir)?;

    if notebooks.is_empty() {
        println!("No notebooks found under {}", root.display());
        return Ok(());
    }

    let identities: Vec<String> = notebooks.iter().map(|coords| coords.identity()).collect();
    for stale in unmatched_overrides(&identities) {
        warn!(identity = stale, "override entry matches no notebook in this tree");
    }

    info!(
        root = %root.display(),
        count = notebooks.len(),
        "publishing notebooks"
    );

    let spinner = new_spinner();
    let total = notebooks.len();
    let mut published = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (index, coords) in notebooks.iter().enumerate() {
        spinner.set_message(format!("Publishing [{}/{total}] {coords}", index + 1));

        match publish_notebook(&publish_config, coords) {
            Ok(result) => {
                if result.injected {
                    published += 1;
                } else {
                    skipped += 1;
                }
            }
            Err(e) => {
                // One broken notebook must not block the rest of the batch.
                warn!(notebook = %coords, error = %e, "publication failed");
                failed += 1;
            }
        }
    }

    spinner.finish_and_clear();

    println!();
    println!("  Publication complete");
    println!("  Published:     {published}");
    println!("  Pass-through:  {skipped}");
    println!("  Failed:        {failed}");
    println!();

    if failed > 0 {
        return Err(eyre!("{failed} of {total} notebooks failed"));
    }
    Ok(())
}

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

// ---------------------------------------------------------------------------
// clean
// ---------------------------------------------------------------------------

fn cmd_clean(files: &[PathBuf], strip_ids: bool, strip_stdout: bool, copy: bool) -> Result<()> {
    if files.is_empty() {
        return Err(eyre!("no files given"));
    }

    let config = load_config()?;
    let options = CleanOptions {
        strip_cell_ids: strip_ids || config.filter.strip_cell_ids,
        strip_stdout: strip_stdout || config.filter.strip_stdout,
    };
    let in_place = resolve_in_place(copy, config.output.in_place);

    let (changed, failed) = clean_files(files, &options, in_place);

    info!(total = files.len(), changed, failed, "clean complete");
    if failed > 0 {
        return Err(eyre!("{failed} of {} files failed", files.len()));
    }
    Ok(())
}

/// The configured output mode applies unless `--copy` forces a sibling write.
fn resolve_in_place(copy: bool, configured_in_place: bool) -> bool {
    !copy && configured_in_place
}

/// Clean each file in turn; a failing file is reported and skipped.
fn clean_files(files: &[PathBuf], options: &CleanOptions, in_place: bool) -> (usize, usize) {
    let mut changed = 0usize;
    let mut failed = 0usize;
    for file in files {
        match clean_notebook_file(file, options, in_place) {
            Ok(result) if result.changed => {
                changed += 1;
                println!("cleaned {}", result.output_path.display());
            }
            Ok(_) => println!("already clean {}", file.display()),
            Err(e) => {
                warn!(file = %file.display(), error = %e, "clean failed");
                failed += 1;
            }
        }
    }
    (changed, failed)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
