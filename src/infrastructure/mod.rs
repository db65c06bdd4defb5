// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_store;
pub mod http_repository;
pub mod json_mapper;
