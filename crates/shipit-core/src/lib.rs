//! Core types and configuration for shipit.
//!
//! This crate defines the `shipit.toml` schema ([`ShipConfig`]),
//! source root discovery ([`SourceLayout`]), and shared error types.

pub mod config;
pub mod error;
pub mod layout;

pub use config::{ArchiveConfig, BuildConfig, CONFIG_FILE, ShipConfig, SourceConfig};
pub use error::{Error, Result};
pub use layout::SourceLayout;
