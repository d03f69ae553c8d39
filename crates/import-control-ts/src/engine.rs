//! Import-control check engine.
//!
//! Evaluates every import of a [`FileAnalysis`] against an
//! [`ImportControl`] policy, producing [`Violation`]s from
//! import-control-core.

use std::sync::Arc;

use import_control_core::{
    AccessResult, ImportControl, Location, Severity, Suggestion, Violation,
};
use regex::Regex;

use crate::config::CheckConfig;
use crate::extractor::FileAnalysis;

/// Violation code for a denied import.
pub const DISALLOWED: (&str, &str) = ("IC001", "import-control-disallowed");
/// Violation code for a package the policy does not cover.
pub const UNKNOWN_PACKAGE: (&str, &str) = ("IC002", "import-control-unknown-package");
/// Violation code for a run without a policy.
pub const MISSING_POLICY: (&str, &str) = ("IC003", "import-control-missing-policy");

/// Checks files against an import-control policy.
///
/// Holds no per-file state; one engine may serve many threads.
#[derive(Debug, Clone)]
pub struct ImportControlCheck {
    policy: Option<Arc<ImportControl>>,
    path: Regex,
    severity: Severity,
}

impl ImportControlCheck {
    /// Create an engine from a validated config.
    #[must_use]
    pub fn new(config: &CheckConfig) -> Self {
        Self {
            policy: config.policy.clone(),
            path: config.path.clone(),
            severity: config.severity,
        }
    }

    /// The policy in use, if any.
    #[must_use]
    pub fn policy(&self) -> Option<&ImportControl> {
        self.policy.as_deref()
    }

    /// Check a single file analysis for import-control violations.
    #[must_use]
    pub fn check(&self, analysis: &FileAnalysis) -> Vec<Violation> {
        let file_path = analysis.file_path.to_string_lossy();
        if !self.path.is_match(&file_path) {
            tracing::trace!(file = %file_path, "outside checked path");
            return Vec::new();
        }
        let Some(package) = &analysis.package else {
            return Vec::new();
        };
        let package_location = Location::new(
            analysis.file_path.clone(),
            package.line,
            package.column + 1,
        );

        let Some(policy) = self.policy.as_deref() else {
            return vec![Violation::new(
                MISSING_POLICY.0,
                MISSING_POLICY.1,
                self.severity,
                package_location,
                "Missing an import control file.",
            )
            .with_suggestion(Suggestion::new(
                "add an [import-control] table to the configuration",
            ))];
        };

        let file = analysis.file_stem();
        let Some(node) = policy.locate_finest(&package.path, file) else {
            return vec![Violation::new(
                UNKNOWN_PACKAGE.0,
                UNKNOWN_PACKAGE.1,
                self.severity,
                package_location,
                format!("Import control file does not handle this package: {}.", package.path),
            )];
        };
        tracing::debug!(
            file = %file_path,
            package = %package.path,
            node = node.index(),
            "resolved policy node"
        );

        analysis
            .imports
            .iter()
            .filter(|imp| {
                policy.check_access(node, &package.path, file, &imp.path) != AccessResult::Allowed
            })
            .map(|imp| {
                Violation::new(
                    DISALLOWED.0,
                    DISALLOWED.1,
                    self.severity,
                    Location::new(analysis.file_path.clone(), imp.line, imp.column + 1)
                        .with_span(imp.offset, imp.length),
                    format!("Disallowed import - {}.", imp.path),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ImportInfo, PackageInfo};
    use std::path::PathBuf;

    const POLICY: &str = r#"
[import-control]
pkg = "com.example"
rules = [
  { access = "disallow", class = "java.sql.DriverManager" },
  { access = "allow", pkg = "java" },
]

[[import-control.subpackage]]
name = "domain"
strategy-on-mismatch = "disallowed"
rules = [{ access = "allow", pkg = "java.util" }]

[[import-control.file]]
name = "Main"
strategy-on-mismatch = "allowed"
"#;

    fn engine(toml: &str) -> ImportControlCheck {
        ImportControlCheck::new(&CheckConfig::parse(toml).expect("config should parse"))
    }

    fn analysis(path: &str, package: Option<&str>, imports: &[&str]) -> FileAnalysis {
        FileAnalysis {
            file_path: PathBuf::from(path),
            package: package.map(|p| PackageInfo {
                line: 1,
                column: 0,
                path: p.to_string(),
            }),
            imports: imports
                .iter()
                .enumerate()
                .map(|(i, p)| ImportInfo {
                    line: i + 3,
                    column: 0,
                    offset: 0,
                    length: 0,
                    path: (*p).to_string(),
                    is_static: false,
                })
                .collect(),
        }
    }

    fn codes(violations: &[Violation]) -> Vec<(&str, usize)> {
        violations
            .iter()
            .map(|v| (v.code.as_str(), v.location.line))
            .collect()
    }

    #[test]
    fn reports_disallowed_imports_in_source_order() {
        let e = engine(POLICY);
        let a = analysis(
            "src/com/example/domain/User.java",
            Some("com.example.domain"),
            &["java.util.List", "java.io.File", "org.slf4j.Logger", "java.util.Map"],
        );
        let v = e.check(&a);
        assert_eq!(codes(&v), vec![("IC001", 4), ("IC001", 5)]);
        assert_eq!(v[0].message, "Disallowed import - java.io.File.");
        assert_eq!(v[0].rule, "import-control-disallowed");
        assert_eq!(v[0].severity, Severity::Error);
    }

    #[test]
    fn delegating_node_uses_parent_rules() {
        let e = engine(
            r#"
[import-control]
pkg = "com.example"
rules = [
  { access = "disallow", class = "java.sql.DriverManager" },
  { access = "allow", pkg = "java" },
]

[[import-control.subpackage]]
name = "app"
"#,
        );
        let a = analysis(
            "App.java",
            Some("com.example.app"),
            &["java.sql.DriverManager", "java.sql.Connection"],
        );
        assert_eq!(codes(&e.check(&a)), vec![("IC001", 3)]);
    }

    #[test]
    fn file_node_strategy_applies_to_that_file_only() {
        let e = engine(POLICY);
        let main = analysis("src/Main.java", Some("com.example"), &["org.slf4j.Logger"]);
        assert!(e.check(&main).is_empty());
        let other = analysis("src/Other.java", Some("com.example"), &["org.slf4j.Logger"]);
        assert_eq!(codes(&e.check(&other)), vec![("IC001", 3)]);
    }

    #[test]
    fn unknown_package_is_reported_once() {
        let e = engine(POLICY);
        let a = analysis("A.java", Some("org.other"), &["java.util.List", "x.Y"]);
        let v = e.check(&a);
        assert_eq!(codes(&v), vec![("IC002", 1)]);
        assert_eq!(
            v[0].message,
            "Import control file does not handle this package: org.other."
        );
    }

    #[test]
    fn missing_policy_is_reported() {
        let e = engine("[analyzer]\nseverity = \"warning\"\n");
        let a = analysis("A.java", Some("com.example"), &["java.util.List"]);
        let v = e.check(&a);
        assert_eq!(codes(&v), vec![("IC003", 1)]);
        assert_eq!(v[0].severity, Severity::Warning);
        assert!(v[0].suggestion.is_some());
    }

    #[test]
    fn files_without_package_are_skipped() {
        let e = engine(POLICY);
        assert!(e.check(&analysis("A.java", None, &["x.Y"])).is_empty());
    }

    #[test]
    fn path_filter_skips_other_files() {
        let mut toml = String::from("[analyzer]\npath = \".*/main/.*\"\n");
        toml.push_str(POLICY);
        let e = engine(&toml);
        let outside = analysis("src/test/A.java", Some("org.other"), &["x.Y"]);
        assert!(e.check(&outside).is_empty());
        let inside = analysis("src/main/A.java", Some("org.other"), &["x.Y"]);
        assert_eq!(e.check(&inside).len(), 1);
    }

    #[test]
    fn path_filter_matches_a_substring() {
        let mut toml = String::from("[analyzer]\npath = \"main\"\n");
        toml.push_str(POLICY);
        let e = engine(&toml);
        let inside = analysis("src/main/java/A.java", Some("org.other"), &["x.Y"]);
        assert_eq!(codes(&e.check(&inside)), vec![("IC002", 1)]);
        let outside = analysis("src/test/java/A.java", Some("org.other"), &["x.Y"]);
        assert!(e.check(&outside).is_empty());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImportControlCheck>();

        let e = engine(POLICY);
        let a = analysis("D.java", Some("com.example.domain"), &["java.io.File"]);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| e.check(&a).len())).collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), 1);
            }
        });
    }
}
