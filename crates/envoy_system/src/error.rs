//! Error types for the envoy system

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

use crate::types::EnvoyKey;

/// Configuration errors, surfaced when the lifecycle manager is constructed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Spawn interval must be at least 1 second")]
    ZeroSpawnInterval,

    #[error("Minimum envoy count {min} is greater than maximum {max}")]
    InvalidCountRange { min: usize, max: usize },

    #[error("Maximum envoy count {max} exceeds the {available} configured spawn zones")]
    NotEnoughZones { max: usize, available: usize },

    #[error("Spawn zone {0} is configured more than once")]
    DuplicateZone(EnvoyKey),

    #[error("Spawn zone at index {0} has an empty world name")]
    EmptyWorldName(usize),

    #[error("Announcement threshold must be greater than zero")]
    ZeroThreshold,

    #[error("Announcement thresholds must be strictly descending ({previous} followed by {next})")]
    ThresholdsNotDescending { previous: u64, next: u64 },
}

/// Envoy snapshot storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to create file {0}: {1}")]
    FileCreate(PathBuf, IoError),

    #[error("Failed to write to file {0}: {1}")]
    FileWrite(PathBuf, IoError),

    #[error("Failed to sync file {0}: {1}")]
    FileSync(PathBuf, IoError),

    #[error("Failed to rename file from {0} to {1}: {2}")]
    FileRename(PathBuf, PathBuf, IoError),

    #[error("Failed to create directory {0}: {1}")]
    DirectoryCreate(PathBuf, IoError),

    #[error("Failed to serialize envoy snapshot: {0}")]
    Serialization(serde_json::Error),

    #[error("Failed to deserialize file {0}: {1}")]
    Deserialization(PathBuf, serde_json::Error),

    #[error("Unsupported envoy snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Reward collaborator errors
#[derive(Debug, Error)]
pub enum RewardError {
    #[error("No rewards are configured")]
    EmptyPool,

    #[error("Reward delivery failed: {0}")]
    Delivery(String),
}

/// Top-level error for the envoy system
#[derive(Debug, Error)]
pub enum EnvoyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Reward error: {0}")]
    Reward(#[from] RewardError),
}

pub type EnvoyResult<T> = Result<T, EnvoyError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type RewardResult<T> = Result<T, RewardError>;
