use parley_shared::const_config::client::{
    CLIENT_API_PATH_SUFFIX, CLIENT_DEFAULT_API_URL, CLIENT_DEFAULT_CREDENTIALS_FILE,
    CLIENT_REQUEST_TIMEOUT,
};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::{path::PathBuf, time::Duration};

/// Name of the optional settings file (without extension) looked up in the
/// working directory
pub const CONFIG_FILE_STEM: &str = "parley";

#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the REST api, the event channel lives at the same
    /// address without the api path suffix
    pub api_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_ms: u64,
    pub credentials_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: CLIENT_DEFAULT_API_URL.to_string(),
            request_timeout_ms: CLIENT_REQUEST_TIMEOUT.as_millis() as u64,
            credentials_path: CLIENT_DEFAULT_CREDENTIALS_FILE.into(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Address of the event channel
    pub fn socket_url(&self) -> String {
        socket_url_from(&self.api_url)
    }
}

/// Strips the api path suffix (if any) from `api_url`
pub fn socket_url_from(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    trimmed
        .strip_suffix(CLIENT_API_PATH_SUFFIX)
        .unwrap_or(trimmed)
        .to_string()
}

/// Loads the configuration from (lowest priority first) the built in defaults,
/// the optional settings file and environment variables
///
/// Environment variables use a prefix of APP and '__' as separator. E.g.
/// `APP_API_URL=https://chat.example.com/api` sets `ClientConfig.api_url`
pub fn get_configuration(
    settings_file: Option<PathBuf>,
) -> Result<ClientConfig, config::ConfigError> {
    let defaults = ClientConfig::default();
    let file_source = match settings_file {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(CONFIG_FILE_STEM).required(false),
    };
    let settings = config::Config::builder()
        .set_default("api_url", defaults.api_url)?
        .set_default("request_timeout_ms", defaults.request_timeout_ms)?
        .set_default(
            "credentials_path",
            defaults.credentials_path.to_string_lossy().into_owned(),
        )?
        .add_source(file_source)
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<ClientConfig>()
}
