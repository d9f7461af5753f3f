use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the remote directory
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL, e.g. `http://localhost:3000`
    #[serde(default = "default_url")]
    pub url: String,
    /// Bearer token (service account or API key)
    #[serde(default)]
    pub token: Option<String>,
    /// `user:password`, used when no token is set
    #[serde(default)]
    pub basic_auth: Option<String>,
    /// Organization to act in
    #[serde(default)]
    pub org_id: Option<i64>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: None,
            basic_auth: None,
            org_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("TEAMSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
