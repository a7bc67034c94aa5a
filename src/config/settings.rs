use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// PostgreSQL connection configuration.
///
/// Either a full connection `url` (usually injected through `DATABASE_URL`)
/// or the discrete host/port/user fields. The url wins when both are present.
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_postgres_host")]
    pub host: String,
    #[serde(default = "default_postgres_port")]
    pub port: u16,
    #[serde(default = "default_postgres_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_postgres_database")]
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_user() -> String {
    "postgres".to_string()
}

fn default_postgres_database() -> String {
    "postgres".to_string()
}

fn default_pool_size() -> usize {
    16
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: default_postgres_host(),
            port: default_postgres_port(),
            user: default_postgres_user(),
            password: String::new(),
            database: default_postgres_database(),
            pool_size: default_pool_size(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
    /// Upper bound accepted for `?horizonte=` on the forecast endpoint.
    #[serde(default = "default_max_forecast_horizon")]
    pub max_forecast_horizon: usize,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_enable_cors() -> bool {
    true
}

fn default_max_forecast_horizon() -> usize {
    120
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            enable_cors: default_enable_cors(),
            max_forecast_horizon: default_max_forecast_horizon(),
        }
    }
}

/// Reference oil price feed.
///
/// The feed is a chart-style JSON endpoint returning daily closes; `{feed_url}/{symbol}`
/// is queried with `range` and a daily interval.
#[derive(Debug, Deserialize, Clone)]
pub struct PriceFeedSettings {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_range")]
    pub range: String,
    /// Periodic refresh while serving. 0 disables the job.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

fn default_feed_url() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}

fn default_symbol() -> String {
    "BZ=F".to_string()
}

fn default_range() -> String {
    "5y".to_string()
}

impl Default for PriceFeedSettings {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            symbol: default_symbol(),
            range: default_range(),
            refresh_interval_secs: 0,
        }
    }
}

/// Batch load configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct EtlSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Published well production CSV fetched by `download-production`.
    #[serde(default = "default_production_csv_url")]
    pub production_csv_url: String,
}

fn default_batch_size() -> usize {
    5_000
}

fn default_production_csv_url() -> String {
    "http://datos.energia.gob.ar/dataset/c5967a00-349c-493e-9097-f50f75990f1d/resource/2039e10f-2172-4d2b-a010-090956903271/download/produccin-de-pozos-de-gas-y-petrleo-2024.csv".to_string()
}

impl Default for EtlSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            production_csv_url: default_production_csv_url(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from an optional `config.yaml` at startup, then `PETROLENS_*`
/// environment variables (`__` separates nesting, e.g. `PETROLENS_SERVER__PORT`),
/// then `DATABASE_URL`. Every section may be omitted.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub prices: PriceFeedSettings,
    #[serde(default)]
    pub etl: EtlSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("PETROLENS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(s, std::env::var("DATABASE_URL").ok())
    }

    pub fn from_config(config: Config, database_url: Option<String>) -> Result<Self, ConfigError> {
        let mut settings: Settings = config.try_deserialize()?;

        if let Some(url) = database_url.map(|u| sanitize_database_url(&u)) {
            if !url.is_empty() {
                settings.postgres.url = Some(url);
            }
        }

        if settings.etl.batch_size == 0 {
            return Err(ConfigError::Message(
                "etl.batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(settings)
    }
}

/// Connection strings pasted into dashboards often carry stray quotes or
/// surrounding whitespace.
pub fn sanitize_database_url(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::builder().build().unwrap();
        let settings = Settings::from_config(config, None).unwrap();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.postgres.pool_size, 16);
        assert_eq!(settings.prices.symbol, "BZ=F");
        assert_eq!(settings.prices.refresh_interval_secs, 0);
        assert_eq!(settings.etl.batch_size, 5_000);
        assert!(settings.etl.production_csv_url.ends_with(".csv"));
        assert!(settings.postgres.url.is_none());
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let config = Config::builder()
            .set_override("server.max_forecast_horizon", 24)
            .unwrap()
            .set_override("prices.symbol", "CL=F")
            .unwrap()
            .build()
            .unwrap();
        let settings = Settings::from_config(config, None).unwrap();

        assert_eq!(settings.server.max_forecast_horizon, 24);
        assert_eq!(settings.server.port, 8000);
        assert!(settings.server.enable_cors);
        assert_eq!(settings.prices.symbol, "CL=F");
        assert_eq!(settings.prices.range, "5y");
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::builder()
            .set_override("server.port", 9000)
            .unwrap()
            .set_override("postgres.host", "db.internal")
            .unwrap()
            .build()
            .unwrap();
        let settings = Settings::from_config(config, None).unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.postgres.host, "db.internal");
        assert_eq!(settings.postgres.port, 5432);
    }

    #[test]
    fn test_database_url_is_sanitized_and_wins() {
        let config = Config::builder().build().unwrap();
        let settings = Settings::from_config(
            config,
            Some("  \"postgresql://u:p@host:5432/db\" \n".to_string()),
        )
        .unwrap();

        assert_eq!(
            settings.postgres.url.as_deref(),
            Some("postgresql://u:p@host:5432/db")
        );
    }

    #[test]
    fn test_blank_database_url_is_ignored() {
        let config = Config::builder().build().unwrap();
        let settings = Settings::from_config(config, Some("  ''  ".to_string())).unwrap();
        assert!(settings.postgres.url.is_none());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = Config::builder()
            .set_override("etl.batch_size", 0)
            .unwrap()
            .build()
            .unwrap();
        assert!(Settings::from_config(config, None).is_err());
    }
}
