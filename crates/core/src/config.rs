use serde::Deserialize;

use crate::error::SdkResult;

/// Root SDK configuration. Loaded from environment variables with the
/// prefix `SEGMENT_SDK__` (nested keys separated by `__`).
#[derive(Debug, Clone, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Capacity of the channel carrying segmentation events to the host.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_event_buffer_size() -> usize {
    256
}
fn default_log_filter() -> String {
    "segment_sdk=info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SdkConfig {
    /// Load configuration from the process environment.
    pub fn load() -> SdkResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment. `None` reads the real environment.
    pub fn load_from(
        vars: Option<std::collections::HashMap<String, String>>,
    ) -> SdkResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("SEGMENT_SDK")
                .separator("__")
                .try_parsing(true)
                .source(vars),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
