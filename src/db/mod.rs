//! Database module
//!
//! This module provides registry persistence including:
//! - Database connection pool management
//! - Plugin repository
//! - Database migrations
//! - Data models and schemas

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;

pub use manager::DatabaseManager;
pub use models::PluginRecord;
pub use repository::PluginRepository;
