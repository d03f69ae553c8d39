//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to an [`ImportControl`](crate::ImportControl) tree by
//! the loader.

use serde::Deserialize;

/// A TOML document that may carry an `[import-control]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyDocumentDto {
    /// The policy root.
    #[serde(rename = "import-control", default)]
    pub import_control: Option<RootDto>,
}

/// TOML representation of the root package.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RootDto {
    /// Root package, e.g. `com.example`.
    pub pkg: String,
    /// Whether `pkg` is a regex.
    #[serde(default)]
    pub regex: bool,
    /// Strategy for unmatched imports (default: "disallowed").
    #[serde(default)]
    pub strategy_on_mismatch: Option<String>,
    /// Rules in priority order.
    #[serde(default)]
    pub rules: Vec<RuleDto>,
    /// Nested packages.
    #[serde(default)]
    pub subpackage: Vec<SubpackageDto>,
    /// File nodes of the root package.
    #[serde(default)]
    pub file: Vec<FileDto>,
}

/// TOML representation of a subpackage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SubpackageDto {
    /// One package segment, or a regex when `regex` is set.
    pub name: String,
    /// Whether `name` is a regex.
    #[serde(default)]
    pub regex: bool,
    /// Strategy for unmatched imports (default: "delegate-to-parent").
    #[serde(default)]
    pub strategy_on_mismatch: Option<String>,
    /// Rules in priority order.
    #[serde(default)]
    pub rules: Vec<RuleDto>,
    /// Nested packages.
    #[serde(default)]
    pub subpackage: Vec<SubpackageDto>,
    /// File nodes of this package.
    #[serde(default)]
    pub file: Vec<FileDto>,
}

/// TOML representation of a file node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDto {
    /// File name without extension, or a regex when `regex` is set.
    pub name: String,
    /// Whether `name` is a regex.
    #[serde(default)]
    pub regex: bool,
    /// Strategy for unmatched imports (default: "delegate-to-parent").
    #[serde(default)]
    pub strategy_on_mismatch: Option<String>,
    /// Rules in priority order.
    #[serde(default)]
    pub rules: Vec<RuleDto>,
}

/// TOML representation of an allow/disallow rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuleDto {
    /// "allow" or "disallow".
    pub access: String,
    /// Package pattern (mutually exclusive with `class`).
    #[serde(default)]
    pub pkg: Option<String>,
    /// Class pattern (mutually exclusive with `pkg`).
    #[serde(default)]
    pub class: Option<String>,
    /// Package rules only: direct members, no sub-packages.
    #[serde(default)]
    pub exact_match: bool,
    /// Only applies to the node it is declared on.
    #[serde(default)]
    pub local_only: bool,
    /// Whether the pattern is a regex.
    #[serde(default)]
    pub regex: bool,
}
