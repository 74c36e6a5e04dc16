//! `specsync` command line entry point.
//!
//! # Responsibility
//! - Run a synchronization over a JSON element model with an INI config and
//!   a SQLite catalog.
//! - Build single article codes and print the resolved settings for quick
//!   manual checks.

use clap::{Parser, Subcommand};
use specsync_core::article::builder::build_article;
use specsync_core::config::settings::{parse_thickness_mm, DEFAULT_COATING, DEFAULT_THICKNESS_MM};
use specsync_core::service::classify::default_accessory_markers;
use specsync_core::{
    default_log_level, init_logging, AccessoryLog, CatalogStore, InMemoryModel, LogConfig,
    SpecConfig, SpecSynchronizer, SyncOptions,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_IO_ERROR: u8 = 3;
const EXIT_PARSE_ERROR: u8 = 4;

const SUGGESTION_LIMIT: u32 = 5;

#[derive(Parser)]
#[command(name = "specsync")]
#[command(about = "Article code synthesis and specification sync for cable-tray models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize specification fields of every element in a JSON model
    #[command(after_help = "\
Examples:
  specsync sync --config GERP_param_map.ini --catalog gerpaas.db --model model.json
  specsync sync --config map.ini --catalog gerpaas.db --model model.json -o synced.json --json")]
    Sync {
        /// INI file with [FamilyMap] and [Combobocks_Setting]
        #[arg(long)]
        config: PathBuf,

        /// SQLite parts catalog (opened read-only)
        #[arg(long)]
        catalog: PathBuf,

        /// JSON element model
        #[arg(long)]
        model: PathBuf,

        /// Where to write the updated model (defaults to --model)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Thickness override, e.g. `1,2 мм`
        #[arg(long)]
        thickness: Option<String>,

        /// Coating override, e.g. `Занурення`
        #[arg(long)]
        coating: Option<String>,

        /// Accessory raw-data log file
        #[arg(long, value_name = "PATH")]
        accessory_log: Option<PathBuf>,

        /// Absolute directory for rolling log files
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,

        /// trace|debug|info|warn|error
        #[arg(long)]
        log_level: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build one article code
    #[command(after_help = "\
Examples:
  specsync article --base GE-KT2- --width 200 --height 100 --thickness 1,2
  specsync article --base GE-DK- --width 200 --height 0 --coating Занурення --angle 45")]
    Article {
        /// Base template, e.g. `GE-KT2-`
        #[arg(long)]
        base: String,

        /// Width in millimeters
        #[arg(long, allow_negative_numbers = true)]
        width: i64,

        /// Height in millimeters
        #[arg(long, allow_negative_numbers = true)]
        height: i64,

        /// Thickness, e.g. `1,2 мм`
        #[arg(long)]
        thickness: Option<String>,

        /// Coating name
        #[arg(long)]
        coating: Option<String>,

        /// Angle in degrees
        #[arg(long, allow_negative_numbers = true)]
        angle: Option<f64>,

        /// Catalog to resolve the description from
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the resolved coating/thickness selection
    Settings {
        /// INI configuration file
        #[arg(long)]
        config: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync {
            config,
            catalog,
            model,
            output,
            thickness,
            coating,
            accessory_log,
            log_dir,
            log_level,
            json,
        } => cmd_sync(SyncArgs {
            config,
            catalog,
            model,
            output,
            thickness,
            coating,
            accessory_log,
            log_dir,
            log_level,
            json,
        }),
        Commands::Article {
            base,
            width,
            height,
            thickness,
            coating,
            angle,
            catalog,
        } => cmd_article(base, width, height, thickness, coating, angle, catalog),
        Commands::Settings { config, json } => cmd_settings(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message }) => {
            eprintln!("error: {message}");
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
}

impl CliError {
    fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_IO_ERROR,
            message: msg.into(),
        }
    }

    fn parse(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_PARSE_ERROR,
            message: msg.into(),
        }
    }

    fn run(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
        }
    }
}

struct SyncArgs {
    config: PathBuf,
    catalog: PathBuf,
    model: PathBuf,
    output: Option<PathBuf>,
    thickness: Option<String>,
    coating: Option<String>,
    accessory_log: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
    json: bool,
}

fn cmd_sync(args: SyncArgs) -> Result<(), CliError> {
    if let Some(dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(&LogConfig::new(level, dir).with_stderr_warnings())
            .map_err(|err| CliError::run(format!("logging: {err}")))?;
    }

    let config = SpecConfig::load(&args.config);
    let mut settings = config.settings;
    if let Some(raw) = &args.thickness {
        settings = settings.with_thickness_text(raw);
    }
    if let Some(coating) = args.coating {
        settings = settings.with_coating(coating);
    }

    let catalog = CatalogStore::open(&args.catalog);
    let mut model = read_model(&args.model)?;

    let options = SyncOptions {
        accessory_markers: default_accessory_markers(),
        accessory_log: args.accessory_log.map(AccessoryLog::new),
    };
    let summary = SpecSynchronizer::new(&config.mapping, &catalog, &settings)
        .with_options(options)
        .run(&mut model)
        .map_err(|err| CliError::run(err.to_string()))?;

    let output = args.output.as_deref().unwrap_or(args.model.as_path());
    write_model(output, &model)?;

    if args.json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|err| CliError::run(format!("summary serialization failed: {err}")))?;
        println!("{text}");
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn cmd_article(
    base: String,
    width: i64,
    height: i64,
    thickness: Option<String>,
    coating: Option<String>,
    angle: Option<f64>,
    catalog: Option<PathBuf>,
) -> Result<(), CliError> {
    let thickness_mm = thickness
        .as_deref()
        .map_or(DEFAULT_THICKNESS_MM, parse_thickness_mm);
    let coating = coating.unwrap_or_else(|| DEFAULT_COATING.to_string());

    let article = build_article(&base, width, height, thickness_mm, &coating, angle);
    if article.is_empty() {
        return Err(CliError::parse("base template is empty"));
    }
    println!("{article}");

    let Some(path) = catalog else {
        return Ok(());
    };
    let store = CatalogStore::open(&path);
    let lookup = store.find_exact(&article);
    match (lookup.match_count, lookup.entry) {
        (1, Some(entry)) => println!("{}", entry.description),
        (0, _) => {
            eprintln!("not found in catalog");
            let prefix = article.rsplit_once('-').map_or(article.as_str(), |(head, _)| head);
            for entry in store.find_by_prefix(prefix, Some(SUGGESTION_LIMIT)) {
                eprintln!("  similar: {}  {}", entry.article, entry.description);
            }
        }
        (count, _) => eprintln!("ambiguous: {count} catalog rows"),
    }
    Ok(())
}

fn cmd_settings(config: PathBuf, json: bool) -> Result<(), CliError> {
    let config = SpecConfig::try_load(&config).map_err(|err| CliError::io(err.to_string()))?;
    let settings = &config.settings;

    if json {
        let text = serde_json::to_string_pretty(settings)
            .map_err(|err| CliError::run(format!("settings serialization failed: {err}")))?;
        println!("{text}");
        return Ok(());
    }

    println!("thickness_mm = {}", settings.thickness_mm);
    println!("coating = {}", settings.coating);
    println!("thickness_options = {}", settings.thickness_options.join(" | "));
    println!("coating_options = {}", settings.coating_options.join(" | "));
    println!("families = {}", config.mapping.len());
    Ok(())
}

fn read_model(path: &Path) -> Result<InMemoryModel, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| CliError::io(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&text).map_err(|err| CliError::parse(format!("{}: {err}", path.display())))
}

fn write_model(path: &Path, model: &InMemoryModel) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(model)
        .map_err(|err| CliError::run(format!("model serialization failed: {err}")))?;
    std::fs::write(path, text).map_err(|err| CliError::io(format!("{}: {err}", path.display())))
}
