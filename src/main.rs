// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, MatcherProvider};
use crate::matchers::openai::OpenAiMatcher;
use crate::matchers::EntryMatcher;
use crate::sync::engine::ProgressCallback;
use crate::sync::SyncEngine;

mod app_config;
mod errors;
mod matchers;
mod subtitle_processor;
mod sync;

/// CLI Wrapper for MatcherProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliMatcherProvider {
    OpenAI,
    LMStudio,
}

impl From<CliMatcherProvider> for MatcherProvider {
    fn from(cli_provider: CliMatcherProvider) -> Self {
        match cli_provider {
            CliMatcherProvider::OpenAI => MatcherProvider::OpenAI,
            CliMatcherProvider::LMStudio => MatcherProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync target subtitle timing against a reference subtitle (default command)
    Sync(SyncArgs),

    /// Generate shell completions for anchorsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct SyncArgs {
    /// Reference subtitle file with trusted timing
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Target subtitle file whose timing needs correction
    #[arg(value_name = "TARGET")]
    target: PathBuf,

    /// Output file path (defaults to <target stem>.synced.srt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only estimate the run (entry counts, matcher calls), no syncing
    #[arg(short, long)]
    estimate: bool,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Matcher provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliMatcherProvider>,

    /// Model name to use for matching
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// anchorsync - AI anchor-point subtitle timing synchronization
///
/// Re-times a subtitle track whose text is correct but whose timestamps are
/// wrong, using a second track with trusted timing and an AI content matcher.
#[derive(Parser, Debug)]
#[command(name = "anchorsync")]
#[command(version = "0.3.0")]
#[command(about = "AI anchor-point subtitle timing synchronization")]
#[command(long_about = "anchorsync samples anchor groups from the target subtitle, matches them \
against a reference subtitle with an AI entry matcher, and re-times every entry \
through a piecewise-linear mapping.

EXAMPLES:
    anchorsync movie.en.srt movie.vi.srt                 # Sync using default config
    anchorsync -o fixed.srt movie.en.srt movie.vi.srt    # Explicit output path
    anchorsync -e movie.en.srt movie.vi.srt              # Estimate matcher calls only
    anchorsync -p lmstudio movie.en.srt movie.vi.srt     # Use a local LM Studio server
    anchorsync completions bash > anchorsync.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Reference subtitle file with trusted timing
    #[arg(value_name = "REFERENCE")]
    reference: Option<PathBuf>,

    /// Target subtitle file whose timing needs correction
    #[arg(value_name = "TARGET")]
    target: Option<PathBuf>,

    /// Output file path (defaults to <target stem>.synced.srt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only estimate the run (entry counts, matcher calls), no syncing
    #[arg(short, long)]
    estimate: bool,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Matcher provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliMatcherProvider>,

    /// Model name to use for matching
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:>5} {}\x1B[0m",
                color,
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

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "anchorsync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Sync(args)) => run_sync(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let reference = cli
                .reference
                .ok_or_else(|| anyhow!("REFERENCE is required when no subcommand is specified"))?;
            let target = cli
                .target
                .ok_or_else(|| anyhow!("TARGET is required when no subcommand is specified"))?;

            let sync_args = SyncArgs {
                reference,
                target,
                output: cli.output,
                estimate: cli.estimate,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_sync(sync_args).await
        }
    }
}

async fn run_sync(options: SyncArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let config = load_config(&options)?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    if !options.reference.is_file() {
        return Err(anyhow!("Reference file does not exist: {:?}", options.reference));
    }
    if !options.target.is_file() {
        return Err(anyhow!("Target file does not exist: {:?}", options.target));
    }

    let matcher: Arc<dyn EntryMatcher> = Arc::new(OpenAiMatcher::new(
        config.matcher.get_endpoint(),
        config.matcher.get_api_key(),
        config.matcher.get_model(),
        config.matcher.get_timeout_secs(),
    ));

    let engine = SyncEngine::new(config.sync.clone(), matcher);

    // Estimate mode: parse both tracks and report, no matcher calls
    if options.estimate {
        let estimate = engine.estimate(&options.reference, &options.target)?;
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.target));

    if output_path.exists() && !options.force_overwrite {
        return Err(anyhow!(
            "Output file already exists: {:?}. Use -f to force overwrite.",
            output_path
        ));
    }

    info!(
        "Using {} matcher (model={})",
        config.matcher.provider.display_name(),
        config.matcher.get_model()
    );

    // Progress bar over anchor groups; the total is known once sampling runs
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos}/{len} anchor groups ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let bar = progress_bar.clone();
    let progress: ProgressCallback = Arc::new(move |done, total| {
        if bar.length().unwrap_or(0) != total as u64 {
            bar.set_length(total as u64);
        }
        bar.set_position(done as u64);
    });

    let engine = engine.with_progress(progress);
    let report = engine
        .sync_files(&options.reference, &options.target, &output_path)
        .await;
    progress_bar.finish_and_clear();

    let report = report?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Load the configuration file, creating a default one when missing, and
/// apply CLI overrides
fn load_config(options: &SyncArgs) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.matcher.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.matcher.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .matcher
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

/// Default output path: `<target stem>.synced.srt` next to the target
fn default_output_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    target.with_file_name(format!("{}.synced.srt", stem))
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
