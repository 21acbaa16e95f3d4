use clap::{Parser, ValueEnum};
use portal_generator::{GeneratorError, RandomGenerator};
use portal_shortener::ShortenerSettings;
use portal_sweeper::SweeperSettings;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "PORTAL_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "PORTAL_PUBLIC_BASE_URL";
pub const EXPECTED_MAPPINGS_ENV: &str = "PORTAL_EXPECTED_MAPPINGS";
pub const CODE_LENGTH_ENV: &str = "PORTAL_CODE_LENGTH";
pub const MAX_ALLOCATION_ATTEMPTS_ENV: &str = "PORTAL_MAX_ALLOCATION_ATTEMPTS";
pub const SWEEP_INTERVAL_SECS_ENV: &str = "PORTAL_SWEEP_INTERVAL_SECS";
pub const SWEEP_BATCH_SIZE_ENV: &str = "PORTAL_SWEEP_BATCH_SIZE";
pub const LOG_FORMAT_ENV: &str = "PORTAL_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_EXPECTED_MAPPINGS: &str = "1000000";
pub const DEFAULT_MAX_ALLOCATION_ATTEMPTS: &str = "8";
pub const DEFAULT_SWEEP_INTERVAL_SECS: &str = "60";
pub const DEFAULT_SWEEP_BATCH_SIZE: &str = "512";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "portal-gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base URL that short codes are appended to in responses.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    /// Expected number of stored mappings; sizes the generated code length.
    #[arg(long, env = EXPECTED_MAPPINGS_ENV, default_value = DEFAULT_EXPECTED_MAPPINGS)]
    pub expected_mappings: u64,

    /// Explicit code length, overriding `--expected-mappings`.
    #[arg(long, env = CODE_LENGTH_ENV)]
    pub code_length: Option<usize>,

    #[arg(
        long,
        env = MAX_ALLOCATION_ATTEMPTS_ENV,
        default_value = DEFAULT_MAX_ALLOCATION_ATTEMPTS,
    )]
    pub max_allocation_attempts: usize,

    #[arg(long, env = SWEEP_INTERVAL_SECS_ENV, default_value = DEFAULT_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: u64,

    #[arg(long, env = SWEEP_BATCH_SIZE_ENV, default_value = DEFAULT_SWEEP_BATCH_SIZE)]
    pub sweep_batch_size: usize,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn generator(&self) -> Result<RandomGenerator, GeneratorError> {
        match self.code_length {
            Some(length) => RandomGenerator::new(length),
            None => Ok(RandomGenerator::for_capacity(self.expected_mappings)),
        }
    }

    pub fn shortener_settings(&self) -> ShortenerSettings {
        ShortenerSettings::builder()
            .max_attempts(self.max_allocation_attempts)
            .build()
    }

    pub fn sweeper_settings(&self) -> SweeperSettings {
        SweeperSettings::builder()
            .interval(Duration::from_secs(self.sweep_interval_secs))
            .batch_size(self.sweep_batch_size)
            .build()
    }
}
