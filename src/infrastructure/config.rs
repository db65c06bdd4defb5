use crate::domain::sensor::SensorType;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_window_hours")]
    pub default_window_hours: u32,
    /// 0 disables background polling
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_sensors")]
    pub sensors: Vec<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_window_hours: default_window_hours(),
            poll_interval_secs: default_poll_interval_secs(),
            sensors: default_sensors(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageSettings {
    /// JSON file for local preferences; in-memory when absent
    pub path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_window_hours() -> u32 {
    24
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_sensors() -> Vec<String> {
    SensorType::ALL.iter().map(|s| s.ui_id().to_string()).collect()
}

impl DashboardSettings {
    pub fn sensor_types(&self) -> anyhow::Result<Vec<SensorType>> {
        self.sensors
            .iter()
            .map(|id| {
                SensorType::from_ui_id(id)
                    .ok_or_else(|| anyhow::anyhow!("Unknown sensor in configuration: {id}"))
            })
            .collect()
    }
}

/// `config/dashboard.{toml,...}` overlaid with `DASHBOARD__SECTION__KEY`
/// environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
