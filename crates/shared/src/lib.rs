//! Shared types and configuration for LedgerBank.
//!
//! This crate provides common types used across all other crates:
//! - Typed numeric IDs for type-safe entity references
//! - Pagination types for transaction history
//! - Configuration management
//! - Tracing subscriber bootstrap for binaries

pub mod config;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
