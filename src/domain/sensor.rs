// Sensor catalogue and identifier mapping
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Ph,
    Temperature,
    Conductivity,
    WaterLevel,
}

impl SensorType {
    pub const ALL: [SensorType; 4] = [
        SensorType::Ph,
        SensorType::Temperature,
        SensorType::Conductivity,
        SensorType::WaterLevel,
    ];

    /// Identifier used by the dashboard (routes, local storage keys).
    pub fn ui_id(self) -> &'static str {
        match self {
            SensorType::Ph => "ph",
            SensorType::Temperature => "temperatura",
            SensorType::Conductivity => "conductividad",
            SensorType::WaterLevel => "nivel_agua",
        }
    }

    /// Identifier understood by the backend API. Also the metric key in
    /// historical payloads.
    pub fn backend_name(self) -> &'static str {
        match self {
            SensorType::Ph => "ph",
            SensorType::Temperature => "temperature",
            SensorType::Conductivity => "conductivity",
            SensorType::WaterLevel => "water_level",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SensorType::Ph => "pH",
            SensorType::Temperature => "Temperatura",
            SensorType::Conductivity => "Conductividad",
            SensorType::WaterLevel => "Nivel de agua",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorType::Ph => "pH",
            SensorType::Temperature => "°C",
            SensorType::Conductivity => "µS/cm",
            SensorType::WaterLevel => "m",
        }
    }

    pub fn line_color(self) -> &'static str {
        match self {
            SensorType::Ph => "#3b82f6",
            SensorType::Temperature => "#f97316",
            SensorType::Conductivity => "#14b8a6",
            SensorType::WaterLevel => "#0ea5e9",
        }
    }

    /// Only pH and conductivity have a forecast model behind them.
    pub fn supports_forecast(self) -> bool {
        matches!(self, SensorType::Ph | SensorType::Conductivity)
    }

    pub fn from_ui_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.ui_id() == id)
    }
}
