// Local durable key/value storage for per-sensor preferences
use crate::domain::sensor::SensorType;
use crate::error::DashboardError;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), DashboardError>;
}

pub fn enabled_key(sensor: SensorType) -> String {
    format!("prediction_{}_enabled", sensor.ui_id())
}

pub fn config_key(sensor: SensorType) -> String {
    format!("prediction_{}_config", sensor.ui_id())
}

/// Process-lifetime store, used when no storage file is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
