//! # import-control-core
//!
//! Hierarchical import access control.
//!
//! A policy is a tree of packages (and individual files), each carrying an
//! ordered list of allow/disallow rules and a strategy for imports none of
//! its rules match. Checking an import is two steps:
//!
//! 1. [`ImportControl::locate_finest`] finds the most specific node owning
//!    the importing file.
//! 2. [`ImportControl::check_access`] walks that node's rules, then its
//!    ancestors as the strategies dictate.
//!
//! ## Example
//!
//! ```
//! use import_control_core::{Decision, ImportControl, MismatchStrategy, PkgImportRule};
//!
//! let mut policy = ImportControl::new("com.example", false, MismatchStrategy::Disallowed)?;
//! let root = policy.root();
//! policy.add_rule(root, PkgImportRule::new(true, false, "java.util", false, false)?.into())?;
//!
//! assert_eq!(policy.evaluate("com.example.app", "Main", "java.util.List"), Decision::Allowed);
//! assert_eq!(policy.evaluate("com.example.app", "Main", "java.sql.Date"), Decision::Disallowed);
//! assert_eq!(policy.evaluate("org.other", "Main", "java.util.List"), Decision::UnknownPackage);
//! # Ok::<(), import_control_core::PolicyError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod error;
mod guard;
mod rule;
mod tree;
mod types;

/// TOML policy loading.
pub mod policy;

pub use access::{AccessResult, MismatchStrategy, ParseStrategyError};
pub use error::PolicyError;
pub use guard::{Guard, GuardList};
pub use policy::{load_policy_from_toml, LoadPolicyError};
pub use rule::{ClassImportRule, ImportRule, PkgImportRule};
pub use tree::{Decision, ImportControl, NodeId, NodeKind, NodeRef};
pub use types::{
    LintResult, Location, ParseSeverityError, Severity, Suggestion, Violation, ViolationDiagnostic,
};
