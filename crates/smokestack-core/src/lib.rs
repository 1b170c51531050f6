//! Core types and configuration for smokestack.
//!
//! This crate defines the `smokestack.toml` schema ([`SmokestackConfig`]),
//! container image references ([`ImageRef`]), and shared error types.

pub mod config;
pub mod error;
pub mod image;

pub use config::{
    CONFIG_FILE_NAME, EngineConfig, ReadinessStrategy, ReapConfig, SmokeConfig, SmokestackConfig,
};
pub use error::{Error, Result};
pub use image::ImageRef;
