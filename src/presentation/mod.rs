// Presentation layer - HTTP surface over the chart engine
pub mod app_state;
pub mod handlers;
