// Domain layer - Pure types and functions, no I/O
pub mod dashboard;
pub mod labels;
pub mod model_config;
pub mod range;
pub mod sensor;
pub mod telemetry;
pub mod threshold;
