use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clipquery_engine::{write_atomically, ClientSettings, PollSettings};
use clipquery_logging::{cq_info, cq_warn};
use serde::{Deserialize, Serialize};

use super::cli::GlobalArgs;

pub const DEFAULT_CONFIG_FILE: &str = "clipquery.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: Option<u32>,
    pub poll_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let poll = PollSettings::default();
        Self {
            api_base_url: client.base_url,
            poll_interval_ms: poll.interval.as_millis() as u64,
            max_poll_attempts: poll.max_attempts,
            poll_timeout_secs: poll.timeout.map(|t| t.as_secs()),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
        }
    }
}

impl AppConfig {
    /// Loads the config file, then applies command-line overrides.
    ///
    /// An explicitly named file must exist and parse. The implicit
    /// `./clipquery.ron` is skipped with a warning when it cannot be read.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = PathBuf::from(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(&implicit).unwrap_or_else(|err| {
                        cq_warn!("Ignoring {:?}: {:#}", implicit, err);
                        Self::default()
                    })
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = ron::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cq_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &GlobalArgs) {
        if let Some(url) = &args.api_url {
            self.api_base_url = url.clone();
        }
        if let Some(ms) = args.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(attempts) = args.max_poll_attempts {
            self.max_poll_attempts = Some(attempts);
        }
        if let Some(secs) = args.poll_timeout_secs {
            self.poll_timeout_secs = Some(secs);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.max_poll_attempts == Some(0) {
            bail!("max_poll_attempts must be greater than zero when set");
        }
        if self.poll_timeout_secs == Some(0) {
            bail!("poll_timeout_secs must be greater than zero when set");
        }
        Ok(())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
            timeout: self.poll_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&Self::default(), pretty)
            .context("serializing default config")?;
        write_atomically(path, &content, force)
            .with_context(|| format!("writing config file {}", path.display()))?;
        cq_info!("Wrote default config to {:?}", path);
        Ok(())
    }
}
