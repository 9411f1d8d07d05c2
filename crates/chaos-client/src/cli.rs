//! Command-line surface
//!
//! Precedence: flags, then `--config` file, then built-in defaults.

use chaos_core::{ChaosConfig, ConfigError};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Build the `crud-chaos` command
#[must_use]
pub fn command() -> Command {
    Command::new("crud-chaos")
        .version(chaos_core::VERSION)
        .about("Stateful chaos client for CRUD resource APIs")
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Target base address [default: http://localhost:8080]"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("collection")
                .long("collection")
                .value_name("NAME")
                .help("Resource collection path segment [default: books]"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Random seed for reproducibility"),
        )
        .arg(
            Arg::new("max-requests")
                .long("max-requests")
                .value_parser(value_parser!(u64))
                .help("Stop after this many iterations"),
        )
        .arg(
            Arg::new("valid-ratio")
                .long("valid-ratio")
                .value_parser(value_parser!(f64))
                .help("Probability of a valid operation [default: 0.75]"),
        )
        .arg(
            Arg::new("warmup")
                .long("warmup")
                .value_parser(value_parser!(u32))
                .help("Valid creates before the loop starts [default: 3]"),
        )
        .arg(
            Arg::new("report-every")
                .long("report-every")
                .value_parser(value_parser!(u64))
                .help("Progress line every N requests [default: 20]"),
        )
        .arg(
            Arg::new("min-delay-ms")
                .long("min-delay-ms")
                .value_parser(value_parser!(u64))
                .help("Lower pacing bound [default: 500]"),
        )
        .arg(
            Arg::new("max-delay-ms")
                .long("max-delay-ms")
                .value_parser(value_parser!(u64))
                .help("Upper pacing bound [default: 2000]"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_parser(value_parser!(u64))
                .help("Per-request timeout [default: 10000]"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit JSON log lines"),
        )
}

/// Whether JSON logging was requested
#[must_use]
pub fn log_json(matches: &ArgMatches) -> bool {
    matches.get_flag("log-json")
}

/// Merge defaults, the optional config file, and flags; then validate
///
/// # Errors
/// Config file I/O or parse failures, or a failed [`ChaosConfig::validate`].
pub fn resolve_config(matches: &ArgMatches) -> Result<ChaosConfig, ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ChaosConfig::load(path)?,
        None => ChaosConfig::default(),
    };

    if let Some(url) = matches.get_one::<String>("url") {
        config.base_url.clone_from(url);
    }
    if let Some(collection) = matches.get_one::<String>("collection") {
        config.collection.clone_from(collection);
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if let Some(max) = matches.get_one::<u64>("max-requests") {
        config.max_requests = Some(*max);
    }
    if let Some(ratio) = matches.get_one::<f64>("valid-ratio") {
        config.valid_ratio = *ratio;
    }
    if let Some(warmup) = matches.get_one::<u32>("warmup") {
        config.warmup_creates = *warmup;
    }
    if let Some(every) = matches.get_one::<u64>("report-every") {
        config.report_every = *every;
    }
    if let Some(min) = matches.get_one::<u64>("min-delay-ms") {
        config.min_delay_ms = *min;
    }
    if let Some(max) = matches.get_one::<u64>("max-delay-ms") {
        config.max_delay_ms = *max;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout-ms") {
        config.request_timeout_ms = *timeout;
    }

    config.validate()?;
    Ok(config)
}
