use anyhow::Context;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://chat.db?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// How often expired disappearing messages are swept.
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        let sweep_interval = parse_sweep_interval(std::env::var("SWEEP_INTERVAL_SECS").ok())?;

        Ok(Self {
            database_url,
            bind_address,
            sweep_interval,
        })
    }
}

fn parse_sweep_interval(value: Option<String>) -> anyhow::Result<Duration> {
    let secs = match value {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("SWEEP_INTERVAL_SECS is not a number: {}", raw))?,
        None => DEFAULT_SWEEP_INTERVAL_SECS,
    };

    if secs == 0 {
        anyhow::bail!("SWEEP_INTERVAL_SECS must be greater than zero");
    }

    Ok(Duration::from_secs(secs))
}
