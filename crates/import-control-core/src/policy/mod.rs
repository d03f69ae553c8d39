//! Import-control policies driven by TOML configuration.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! ImportControl (policy tree)
//! ```

pub mod config_dto;
pub mod loader;

use crate::tree::ImportControl;

/// Errors from parsing TOML and loading a policy.
#[derive(Debug, thiserror::Error)]
pub enum LoadPolicyError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Policy validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),
}

/// Parses TOML content and builds the policy from its `[import-control]` table.
///
/// # Errors
///
/// Returns an error if TOML parsing fails, the table is missing, or any
/// rule or node fails validation.
pub fn load_policy_from_toml(content: &str) -> Result<ImportControl, LoadPolicyError> {
    let dto: config_dto::PolicyDocumentDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}
