use chaos_client::cli;
use chaos_core::{ChaosConfig, ConfigError};
use pretty_assertions::assert_eq;
use std::io::Write;

fn resolve(args: &[&str]) -> Result<ChaosConfig, ConfigError> {
    let matches = cli::command()
        .try_get_matches_from(std::iter::once("crud-chaos").chain(args.iter().copied()))
        .unwrap();
    cli::resolve_config(&matches)
}

#[test]
fn no_flags_gives_defaults() {
    assert_eq!(resolve(&[]).unwrap(), ChaosConfig::default());
}

#[test]
fn flags_override_defaults() {
    let config = resolve(&[
        "--url",
        "http://127.0.0.1:9000",
        "--collection",
        "widgets",
        "--seed",
        "42",
        "--max-requests",
        "100",
        "--valid-ratio",
        "0.5",
        "--warmup",
        "0",
        "--report-every",
        "5",
        "--min-delay-ms",
        "10",
        "--max-delay-ms",
        "20",
        "--timeout-ms",
        "1500",
    ])
    .unwrap();

    let expected = ChaosConfig::new()
        .with_base_url("http://127.0.0.1:9000")
        .with_collection("widgets")
        .with_seed(42)
        .with_max_requests(100)
        .with_valid_ratio(0.5)
        .with_warmup_creates(0)
        .with_report_every(5)
        .with_delay_ms(10, 20)
        .with_request_timeout_ms(1500);
    assert_eq!(config, expected);
    assert_eq!(config.endpoint().collection_path(), "/widgets");
}

#[test]
fn flags_win_over_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
base_url = "http://books.internal:8080"
valid_ratio = 0.9
seed = 7
"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap();

    let config = resolve(&["--config", path, "--seed", "8"]).unwrap();

    assert_eq!(config.base_url, "http://books.internal:8080");
    assert!((config.valid_ratio - 0.9).abs() < f64::EPSILON);
    assert_eq!(config.seed, Some(8));
    assert_eq!(config.warmup_creates, 3);
}

#[test]
fn unknown_key_in_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "retries = 3").unwrap();
    let path = file.path().to_str().unwrap();

    assert!(matches!(resolve(&["--config", path]), Err(ConfigError::Parse(_))));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        resolve(&["--config", path.to_str().unwrap()]),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn out_of_range_ratio_is_rejected() {
    assert!(matches!(
        resolve(&["--valid-ratio", "1.5"]),
        Err(ConfigError::InvalidRatio(r)) if (r - 1.5).abs() < f64::EPSILON
    ));
}

#[test]
fn inverted_delay_is_rejected() {
    assert!(matches!(
        resolve(&["--min-delay-ms", "3000", "--max-delay-ms", "100"]),
        Err(ConfigError::InvertedDelay { min_ms: 3000, max_ms: 100 })
    ));
}

#[test]
fn non_http_url_is_rejected() {
    assert!(matches!(
        resolve(&["--url", "ftp://localhost"]),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn unparseable_url_fails_before_the_run() {
    for url in ["http://local host:8080", "http://localhost:notaport"] {
        assert!(
            matches!(resolve(&["--url", url]), Err(ConfigError::InvalidBaseUrl { .. })),
            "{url} accepted"
        );
    }
}

#[test]
fn log_json_flag() {
    let matches = cli::command()
        .try_get_matches_from(["crud-chaos", "--log-json"])
        .unwrap();
    assert!(cli::log_json(&matches));

    let matches = cli::command().try_get_matches_from(["crud-chaos"]).unwrap();
    assert!(!cli::log_json(&matches));
}

#[test]
fn non_numeric_seed_fails_parsing() {
    assert!(cli::command()
        .try_get_matches_from(["crud-chaos", "--seed", "abc"])
        .is_err());
}
