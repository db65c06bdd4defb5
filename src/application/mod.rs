// Application layer - Use cases, chart state and repository ports
pub mod chart_cell;
pub mod config_store;
pub mod dashboard_service;
pub mod local_store;
pub mod overlay;
pub mod poller;
pub mod range_controller;
pub mod sensor_repository;

#[cfg(test)]
pub mod testing;
