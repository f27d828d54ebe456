use chrono::{Duration, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub collection: CollectionConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub endpoint_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delay between API requests to stay inside the remote rate limit.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Days back from today when no explicit range is given.
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Static UTC offset of the local timezone. A DST shift means changing
    /// this value; it is not derived from the calendar date.
    pub timezone_offset_hours: i32,
}

fn default_days_back() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_token_file() -> String {
    "token.json".into()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.api.endpoint_url.is_empty(),
            "api.endpoint_url must be non-empty"
        );
        anyhow::ensure!(
            self.api.request_timeout_secs > 0,
            "api.request_timeout_secs must be > 0, got {}",
            self.api.request_timeout_secs
        );
        anyhow::ensure!(
            self.collection.days_back > 0,
            "collection.days_back must be > 0, got {}",
            self.collection.days_back
        );
        anyhow::ensure!(
            (-23..=23).contains(&self.collection.timezone_offset_hours),
            "collection.timezone_offset_hours must be within -23..=23, got {}",
            self.collection.timezone_offset_hours
        );
        anyhow::ensure!(
            self.collection.start_date.is_some() == self.collection.end_date.is_some(),
            "collection.start_date and collection.end_date must be set together"
        );
        anyhow::ensure!(
            !self.storage.data_dir.is_empty(),
            "storage.data_dir must be non-empty"
        );
        anyhow::ensure!(
            !self.auth.token_file.is_empty(),
            "auth.token_file must be non-empty"
        );
        Ok(())
    }

    /// Date range for a run. Precedence: START_DATE/END_DATE environment
    /// variables, then the explicit config range, then days_back from today.
    pub fn date_range(&self, today: NaiveDate) -> anyhow::Result<(NaiveDate, NaiveDate)> {
        let env_start = std::env::var("START_DATE").ok();
        let env_end = std::env::var("END_DATE").ok();
        if let (Some(start), Some(end)) = (env_start.as_deref(), env_end.as_deref()) {
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")?;
            return Ok((start, end));
        }
        if let (Some(start), Some(end)) = (self.collection.start_date, self.collection.end_date) {
            return Ok((start, end));
        }
        let start = today - Duration::days(self.collection.days_back as i64);
        Ok((start, today))
    }
}
