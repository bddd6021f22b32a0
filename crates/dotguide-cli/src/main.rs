use clap::{Parser, Subcommand};
use dotguide_config::{Config, ReportFormat};
use dotguide_engine::{Analyzer, JsonSchema, io};
use std::path::PathBuf;
use std::process::ExitCode;

mod browse;
mod check;

#[derive(Parser)]
#[command(name = "dotguide")]
#[command(about = "Checks dot-directive guide documents before they are posted to Discord")]
#[command(version)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report problems in guide files
    Check {
        /// Guide files or folders to scan (defaults to the configured guides folder)
        paths: Vec<PathBuf>,

        /// Output format: text or json
        #[arg(short, long)]
        format: Option<ReportFormat>,
    },

    /// Browse a folder of guides and their diagnostics in the terminal
    Browse {
        /// Guides folder (defaults to the configured guides folder)
        folder: Option<PathBuf>,
    },
}

/// Guide errors were found.
const EXIT_ERRORS: u8 = 1;
/// Files or configuration could not be read.
const EXIT_IO: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = Config::config_path();
    log::debug!("Config path: {}", config_path.display());
    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            return ExitCode::from(EXIT_IO);
        }
    };

    let analyzer = Analyzer::new(JsonSchema::discord_embed(), config.limits.clone());

    match cli.command {
        Commands::Check { paths, format } => {
            let paths = if paths.is_empty() {
                match config.guides_path.clone() {
                    Some(path) => vec![path],
                    None => return missing_guides_path(&config_path),
                }
            } else {
                paths
            };
            run_check(&analyzer, &paths, format.unwrap_or(config.format))
        }
        Commands::Browse { folder } => {
            let from_config = folder.is_none();
            let Some(guides_path) = folder.or(config.guides_path) else {
                return missing_guides_path(&config_path);
            };

            if let Err(e) = io::validate_guides_dir(&guides_path) {
                let source = if from_config {
                    format!(" from config file '{}'", config_path.display())
                } else {
                    String::new()
                };
                eprintln!(
                    "Error: Guides path '{}'{source} is invalid: {e}",
                    guides_path.display()
                );
                return ExitCode::from(EXIT_IO);
            }

            match browse::run(guides_path, analyzer) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e:?}");
                    ExitCode::from(EXIT_IO)
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run_check(analyzer: &Analyzer<'_>, paths: &[PathBuf], format: ReportFormat) -> ExitCode {
    let reports = match check::collect_guides(paths)
        .and_then(|files| check::check_files(analyzer, &files))
    {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_IO);
        }
    };

    match check::render(&reports, format) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_IO);
        }
    }

    log::debug!("checked {} guide files", reports.len());
    if check::has_errors(&reports) {
        ExitCode::from(EXIT_ERRORS)
    } else {
        ExitCode::SUCCESS
    }
}

fn missing_guides_path(config_path: &std::path::Path) -> ExitCode {
    eprintln!("Error: No guides path provided and none configured");
    eprintln!(
        "Pass a path or set guides_path in {}",
        config_path.display()
    );
    ExitCode::from(EXIT_IO)
}
