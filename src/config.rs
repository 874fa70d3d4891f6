use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt::Display, str::FromStr};

use crate::services::{
    enumerator::DEFAULT_PAGE_SIZE,
    prober::DEFAULT_PROBE_LIMIT,
    reconciler::DEFAULT_TOLERANCE_BYTES,
    retry::RetrySettings,
    scan::ScanOptions,
    survey::{DEFAULT_DETAIL_OBJECT_LIMIT, DEFAULT_PREVIEW_SAMPLE_SIZE, SurveyOptions},
};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub page_size: usize,
    pub tolerance_bytes: u64,
    pub retry_attempts: u32,
    pub probe_limit: usize,
    pub detail_object_limit: usize,
    pub preview_sample_size: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Storage usage reconciliation service")]
pub struct Args {
    /// Host to bind to (overrides RECONCILE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides RECONCILE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Inventory snapshot database URL (overrides RECONCILE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Objects requested per listing page (overrides RECONCILE_PAGE_SIZE)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Byte difference still considered consistent (overrides RECONCILE_TOLERANCE_BYTES)
    #[arg(long)]
    pub tolerance_bytes: Option<u64>,

    /// Attempts per backend request (overrides RECONCILE_RETRY_ATTEMPTS)
    #[arg(long)]
    pub retry_attempts: Option<u32>,

    /// Cap on each hidden-object probe listing (overrides RECONCILE_PROBE_LIMIT)
    #[arg(long)]
    pub probe_limit: Option<usize>,

    /// Containers up to this size are listed in full by the account survey
    /// (overrides RECONCILE_DETAIL_OBJECT_LIMIT)
    #[arg(long)]
    pub detail_object_limit: Option<usize>,

    /// Objects sampled from larger containers by the account survey
    /// (overrides RECONCILE_PREVIEW_SAMPLE_SIZE)
    #[arg(long)]
    pub preview_sample_size: Option<usize>,

    /// Create the inventory schema and exit
    #[arg(long)]
    pub migrate: bool,
}

/// Read `name`, falling back to `default` when unset. Unparseable values are errors.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::merge(args)?, migrate))
    }

    /// CLI flags win over environment variables, which win over defaults.
    pub fn merge(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("RECONCILE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_or("RECONCILE_PORT", 3000u16)?;
        let env_db = env::var("RECONCILE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/inventory.db".into());
        let env_page_size = env_or("RECONCILE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let env_tolerance = env_or("RECONCILE_TOLERANCE_BYTES", DEFAULT_TOLERANCE_BYTES)?;
        let env_attempts = env_or(
            "RECONCILE_RETRY_ATTEMPTS",
            RetrySettings::default().max_attempts,
        )?;
        let env_probe_limit = env_or("RECONCILE_PROBE_LIMIT", DEFAULT_PROBE_LIMIT)?;
        let env_detail = env_or("RECONCILE_DETAIL_OBJECT_LIMIT", DEFAULT_DETAIL_OBJECT_LIMIT)?;
        let env_preview = env_or("RECONCILE_PREVIEW_SAMPLE_SIZE", DEFAULT_PREVIEW_SAMPLE_SIZE)?;

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            page_size: args.page_size.unwrap_or(env_page_size),
            tolerance_bytes: args.tolerance_bytes.unwrap_or(env_tolerance),
            retry_attempts: args.retry_attempts.unwrap_or(env_attempts),
            probe_limit: args.probe_limit.unwrap_or(env_probe_limit),
            detail_object_limit: args.detail_object_limit.unwrap_or(env_detail),
            preview_sample_size: args.preview_sample_size.unwrap_or(env_preview),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry(&self) -> RetrySettings {
        RetrySettings {
            max_attempts: self.retry_attempts,
            ..RetrySettings::default()
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            page_size: self.page_size,
            tolerance: self.tolerance_bytes,
            retry: self.retry(),
            probe_limit: self.probe_limit,
            ..ScanOptions::default()
        }
    }

    pub fn survey_options(&self) -> SurveyOptions {
        SurveyOptions {
            tolerance: self.tolerance_bytes,
            detail_object_limit: self.detail_object_limit,
            preview_sample_size: self.preview_sample_size,
            retry: self.retry(),
        }
    }
}
