// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polyglot::app_config::{self, Config};
use polyglot::database::DatabaseConnection;
use polyglot::{
    AppError, ContentObject, MemoryContentProvider, ObjectKind, QueryCache, QueryService,
    SqliteStore, TranslationDetails,
};

/// CLI Wrapper for ObjectKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliObjectKind {
    ContentItem,
    TaxonomyTerm,
}

impl From<CliObjectKind> for ObjectKind {
    fn from(cli_kind: CliObjectKind) -> Self {
        match cli_kind {
            CliObjectKind::ContentItem => ObjectKind::ContentItem,
            CliObjectKind::TaxonomyTerm => ObjectKind::TaxonomyTerm,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Object selection shared by the lookup commands
#[derive(clap::Args, Debug)]
struct ObjectArgs {
    /// Object identifier
    id: i64,

    /// Object kind
    #[arg(short, long, value_enum, default_value = "content-item")]
    kind: CliObjectKind,

    /// Object type used when the object is not in the catalog
    #[arg(short = 't', long = "type", default_value = "post")]
    object_type: String,
}

/// Arguments of the `translate` command
#[derive(clap::Args, Debug)]
struct TranslateArgs {
    #[command(flatten)]
    object: ObjectArgs,

    /// Locale of the new translation
    locale: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or upgrade the translations table
    Init,

    /// Duplicate an original into a locale and link the copy
    Translate(TranslateArgs),

    /// List every translation of an original
    List(ObjectArgs),

    /// Show the link details of an object
    Details(ObjectArgs),

    /// Show the locale of an object
    Locale(ObjectArgs),

    /// List every link sharing the original of an object
    Siblings(ObjectArgs),

    /// Remove the links of an object
    Unlink(ObjectArgs),

    /// Print the front page slug of each locale
    Homes,

    /// Generate shell completions for polyglot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Inspect and maintain translation links between content objects
#[derive(Parser, Debug)]
#[command(name = "polyglot", version, about)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long = "config", default_value = "polyglot.json", global = true)]
    config_path: String,

    /// Database file, overrides the configuration
    #[arg(long, global = true, env = "POLYGLOT_DB")]
    db: Option<PathBuf>,

    /// JSON array of content objects used for titles and slugs
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = cli.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "polyglot", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, matches!(cli.command, Commands::Init))?;
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let service = build_service(&config, cli.db.as_deref(), cli.catalog.as_deref())?;

    run_command(&config, &service, cli.command)?;

    let (hits, misses, _) = service.cache_stats();
    log::debug!("Query cache: {} hit(s), {} miss(es)", hits, misses);

    Ok(())
}

fn run_command(config: &Config, service: &QueryService, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Init => {
            service.create_schema()?;
            info!("Schema is ready");
        }
        Commands::Translate(args) => {
            if !config.i18n.accepts_translation_locale(&args.locale) {
                return Err(AppError::InvalidArgument(format!(
                    "'{}' is not a translation locale of this site",
                    args.locale
                )));
            }

            let id = service.create_translation(
                args.object.id,
                &args.object.object_type,
                args.object.kind.into(),
                &args.locale,
            )?;
            println!("Created #{} as the {} translation of #{}", id, args.locale, args.object.id);
        }
        Commands::List(args) => {
            let records = service.find_all_translations_of_original_id(args.id, args.kind.into())?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Details(args) => {
            let object = resolve_object(service, &args);
            match service.find_details(&object)? {
                TranslationDetails::Stored(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?)
                }
                TranslationDetails::DefaultLocaleOriginal(record) => {
                    println!("# original in the default locale, not stored");
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                TranslationDetails::Untracked => {
                    println!("# no link stored and not in the default locale")
                }
            }
        }
        Commands::Locale(args) => {
            let object = resolve_object(service, &args);
            println!("{}", service.find_object_locale(&object)?);
        }
        Commands::Siblings(args) => {
            let object = resolve_object(service, &args);
            let records = service.find_original_translation_details(&object)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Unlink(args) => {
            let removed = service.unlink_translation(args.id, args.kind.into())?;
            println!("Removed {} link(s) of #{}", removed, args.id);
        }
        Commands::Homes => {
            let slugs = service.generate_locale_home_url_list()?;
            println!("{}", serde_json::to_string_pretty(&slugs)?);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the configuration, falling back to defaults when the file is missing.
///
/// With `write_default` the default configuration is saved to `config_path`.
fn load_config(config_path: &str, write_default: bool) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        warn!("Config file not found at '{}', using defaults.", config_path);
        let config = Config::default();

        if write_default {
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(config_path, config_json)
                .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        }

        config
    };

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn build_service(config: &Config, db_override: Option<&Path>, catalog: Option<&Path>) -> Result<QueryService> {
    let db = match db_override.or(config.database.path.as_deref()) {
        Some(path) => DatabaseConnection::new(path)?,
        None => DatabaseConnection::new_default()?,
    };

    let store = SqliteStore::new(db, &config.database.table_prefix);
    let content = match catalog {
        Some(path) => MemoryContentProvider::from_catalog_file(path)?,
        None => MemoryContentProvider::new(),
    };

    Ok(QueryService::new(
        Arc::new(store),
        Arc::new(content),
        Arc::new(config.i18n.clone()),
        Arc::new(config.site.clone()),
    )
    .with_cache(QueryCache::new(config.cache.enabled)))
}

/// Catalog object for the arguments, or a bare object when unknown
fn resolve_object(service: &QueryService, args: &ObjectArgs) -> ContentObject {
    let kind: ObjectKind = args.kind.into();

    service
        .find_cached_object_by_id(args.id)
        .filter(|object| object.kind == kind)
        .unwrap_or_else(|| ContentObject {
            id: args.id,
            kind,
            object_type: args.object_type.clone(),
            title: String::new(),
            slug: String::new(),
        })
}
