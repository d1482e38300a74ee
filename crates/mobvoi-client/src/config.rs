use crate::error::{MobvoiError, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Vendor account partition selecting which endpoint hosts apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Mainland,
    Global,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainland => "mainland",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = MobvoiError;

    /// Empty input falls back to mainland, matching accounts created before
    /// regions existed.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mainland" => Ok(Self::Mainland),
            "global" => Ok(Self::Global),
            other => Err(MobvoiError::Config(format!("unknown region '{other}'"))),
        }
    }
}

/// Account credentials. Never persisted or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub region: Region,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>, region: Region) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            region,
        }
    }

    /// The api key masked for logging.
    pub fn api_key_masked(&self) -> String {
        mask(&self.api_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key_masked())
            .field("api_secret", &"****")
            .field("region", &self.region)
            .finish()
    }
}

fn mask(value: &str) -> String {
    if value.len() > 8 && value.is_ascii() {
        format!("{}...{}", &value[..4], &value[value.len() - 4..])
    } else {
        "****".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct MobvoiConfig {
    pub credentials: Credentials,
    /// Overrides the catalog's text-to-speech host.
    pub tts_host: Option<String>,
    /// Overrides the catalog's avatar host.
    pub avatar_host: Option<String>,
    pub timeout: Duration,
}

impl MobvoiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let api_key = env::var("MOBVOI_APP_KEY")
            .map_err(|_| MobvoiError::Config("MOBVOI_APP_KEY not set".to_string()))?;

        let api_secret = env::var("MOBVOI_APP_SECRET")
            .map_err(|_| MobvoiError::Config("MOBVOI_APP_SECRET not set".to_string()))?;

        let region = env::var("MOBVOI_APP_REGION")
            .unwrap_or_default()
            .parse::<Region>()?;

        let timeout_seconds = parse_timeout(env::var("MOBVOI_TIMEOUT_SECONDS").ok().as_deref());

        Ok(Self {
            credentials: Credentials::new(api_key, api_secret, region),
            tts_host: non_empty(env::var("MOBVOI_TTS_HOST").ok()),
            avatar_host: non_empty(env::var("MOBVOI_AVATAR_HOST").ok()),
            timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// Create a new configuration with explicit credentials and default hosts
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            tts_host: None,
            avatar_host: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.credentials.region = region;
        self
    }

    pub fn with_tts_host(mut self, host: impl Into<String>) -> Self {
        self.tts_host = Some(host.into());
        self
    }

    pub fn with_avatar_host(mut self, host: impl Into<String>) -> Self {
        self.avatar_host = Some(host.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse the timeout override, keeping the default when absent or malformed.
fn parse_timeout(raw: Option<&str>) -> u64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_TIMEOUT_SECONDS,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(
                "Ignoring invalid MOBVOI_TIMEOUT_SECONDS={:?}; using {}s",
                value, DEFAULT_TIMEOUT_SECONDS
            );
            DEFAULT_TIMEOUT_SECONDS
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
