use anyhow::{Context, Result};
use clap::Parser;
use coinchatter_collect::{BatchDriver, CollectSettings};
use coinchatter_common::observability::{LogConfig, init_logging};
use coinchatter_common::{CoinchatterError, DateRange};
use coinchatter_config::{CoinchatterConfig, CoinchatterConfigLoader};
use coinchatter_social::twitter::TwitterApi;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "coinchatter.yaml";

/// Collect tweets mentioning tracked cryptocurrencies into per-segment snapshots.
#[derive(Debug, Parser)]
#[command(
    name = "coinchatter",
    after_help = "dates must be in YYYY-MM-DD format\n\
                  start-date must be earlier than end-date\n\
                  start-date is inclusive, end-date is exclusive"
)]
struct Cli {
    /// First day to collect (inclusive).
    start_date: String,
    /// Day to stop at (exclusive).
    end_date: String,
    /// YAML config file. Defaults to ./coinchatter.yaml when present.
    #[arg(long, env = "COINCHATTER_CONFIG")]
    config: Option<PathBuf>,
    /// Directory for snapshot files (overrides collect.output_dir).
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<CoinchatterConfig> {
    let loader = match &cli.config {
        Some(path) => CoinchatterConfigLoader::new().with_file(path),
        None => CoinchatterConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("loading configuration")
}

fn log_config(cfg: &CoinchatterConfig) -> LogConfig {
    LogConfig {
        log_dir: cfg.log.dir.clone(),
        emit_stderr: cfg.log.stderr,
        format: cfg.log.format,
        default_filter: cfg.log.filter.clone(),
        ..LogConfig::default()
    }
}

fn collect_settings(cli: &Cli, cfg: &CoinchatterConfig) -> CollectSettings {
    CollectSettings {
        language: cfg.collect.language.clone(),
        max_tweets_per_coin_per_hour: cfg.collect.max_tweets_per_coin_per_hour,
        segment_days: cfg.collect.segment_days,
        output_dir: cli
            .output_dir
            .clone()
            .unwrap_or_else(|| cfg.collect.output_dir.clone()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let log_path = init_logging(log_config(&cfg))?;
    let range = DateRange::parse(&cli.start_date, &cli.end_date)?;
    tracing::info!(
        start = %range.start,
        end = %range.end,
        log_file = %log_path.display(),
        "start date (inclusive), end date (exclusive)"
    );

    let token = cfg.twitter.bearer_token().ok_or_else(|| {
        CoinchatterError::Config(
            "missing Twitter bearer token (twitter.auth_token or COINCHATTER__TWITTER__AUTH_TOKEN)"
                .into(),
        )
    })?;
    let api = TwitterApi::with_base_url(&cfg.twitter.base_url, token.to_string())?
        .with_search_path(cfg.twitter.search_path.clone())
        .with_page_size(cfg.twitter.page_size)
        .with_timeout(Duration::from_secs(cfg.twitter.timeout_secs));

    let driver = BatchDriver::new(api, collect_settings(&cli, &cfg));
    let reports = driver.run(range).await?;

    let rows: usize = reports.iter().map(|r| r.rows).sum();
    tracing::info!(segments = reports.len(), rows, "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn requires_exactly_two_dates() {
        let err = Cli::try_parse_from(["coinchatter", "2022-01-01"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["coinchatter", "2022-01-01", "2022-01-02", "extra"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn cli_output_dir_overrides_config() {
        let cli = Cli::try_parse_from([
            "coinchatter",
            "2022-01-01",
            "2022-01-11",
            "--output-dir",
            "/data/snapshots",
        ])
        .unwrap();
        let cfg = CoinchatterConfig::default();
        let settings = collect_settings(&cli, &cfg);
        assert_eq!(settings.output_dir, PathBuf::from("/data/snapshots"));
        assert_eq!(settings.max_tweets_per_coin_per_hour, 100);
        assert_eq!(settings.segment_days, 10);
    }

    #[test]
    fn log_settings_carry_over_from_config() {
        let mut cfg = CoinchatterConfig::default();
        cfg.log.format = coinchatter_common::LogFormat::Json;
        cfg.log.filter = "debug".into();
        let log = log_config(&cfg);
        assert_eq!(log.format, coinchatter_common::LogFormat::Json);
        assert_eq!(log.default_filter, "debug");
        assert_eq!(log.app_name, "coinchatter");
    }
}
