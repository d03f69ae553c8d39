//! # import-control-ts
//!
//! Tree-sitter based import-control checks for Java and Kotlin.
//!
//! This crate connects source files to an `import-control-core` policy. It
//! reuses `import-control-core` types (`Violation`, `Severity`, `Location`)
//! and adds:
//!
//! - [`LanguageExtractor`] trait for pluggable language support
//! - [`JavaExtractor`] and [`KotlinExtractor`] for package/import extraction
//! - [`CheckConfig`] for the `[analyzer]` settings plus the policy
//! - [`ImportControlCheck`] for evaluating a file's imports

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod extractor;
pub mod java;
pub mod kotlin;

pub use config::{CheckConfig, ConfigError};
pub use engine::ImportControlCheck;
pub use extractor::{ExtractError, FileAnalysis, ImportInfo, LanguageExtractor, PackageInfo};
pub use java::JavaExtractor;
pub use kotlin::KotlinExtractor;

/// All built-in extractors.
#[must_use]
pub fn extractors() -> Vec<Box<dyn LanguageExtractor>> {
    vec![Box::new(JavaExtractor::new()), Box::new(KotlinExtractor::new())]
}
