//! Allow/disallow rules matched against fully-qualified import paths.
//!
//! Two shapes exist:
//!
//! - [`PkgImportRule`] covers a package prefix: `org.hibernate` matches
//!   `org.hibernate.Session` and `org.hibernate.type.Type`, never
//!   `org.hibernateutil.X` and never the bare `org.hibernate`.
//! - [`ClassImportRule`] covers exactly one fully-qualified name.
//!
//! Regex patterns are compiled once, at construction. All matching is
//! anchored to the full import string.

use regex::Regex;

use crate::access::AccessResult;
use crate::error::PolicyError;

/// Compiles `^(?:body)...$` and maps failures to [`PolicyError::InvalidRegex`].
fn compile(pattern: &str, template: impl FnOnce(&str) -> String) -> Result<Regex, PolicyError> {
    Regex::new(&template(pattern)).map_err(|e| PolicyError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// A rule granting or denying access to everything under a package.
#[derive(Debug, Clone)]
pub struct PkgImportRule {
    allow: bool,
    local_only: bool,
    pattern: String,
    exact_match: bool,
    regex: Option<Regex>,
}

impl PkgImportRule {
    /// Creates a package rule.
    ///
    /// With `exact_match` only direct members of the package are covered,
    /// sub-packages are not.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or, with `regex`, does not
    /// compile.
    pub fn new(
        allow: bool,
        local_only: bool,
        pattern: impl Into<String>,
        exact_match: bool,
        regex: bool,
    ) -> Result<Self, PolicyError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(PolicyError::EmptyPattern);
        }
        let regex = if regex {
            let compiled = if exact_match {
                compile(&pattern, |p| format!(r"^(?:{p})\.[^.]*$"))?
            } else {
                compile(&pattern, |p| format!(r"^(?:{p})\..*$"))?
            };
            Some(compiled)
        } else {
            None
        };
        Ok(Self {
            allow,
            local_only,
            pattern,
            exact_match,
            regex,
        })
    }

    /// Verifies an import against this rule.
    #[must_use]
    pub fn verify_import(&self, import: &str) -> AccessResult {
        let matched = match &self.regex {
            Some(re) => re.is_match(import),
            None => import
                .strip_prefix(self.pattern.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|member| !self.exact_match || !member.contains('.')),
        };
        if matched {
            AccessResult::from_allow(self.allow)
        } else {
            AccessResult::Unknown
        }
    }
}

/// A rule granting or denying access to a single class.
#[derive(Debug, Clone)]
pub struct ClassImportRule {
    allow: bool,
    local_only: bool,
    pattern: String,
    regex: Option<Regex>,
}

impl ClassImportRule {
    /// Creates a class rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or, with `regex`, does not
    /// compile.
    pub fn new(
        allow: bool,
        local_only: bool,
        pattern: impl Into<String>,
        regex: bool,
    ) -> Result<Self, PolicyError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(PolicyError::EmptyPattern);
        }
        let regex = if regex {
            Some(compile(&pattern, |p| format!("^(?:{p})$"))?)
        } else {
            None
        };
        Ok(Self {
            allow,
            local_only,
            pattern,
            regex,
        })
    }

    /// Verifies an import against this rule.
    #[must_use]
    pub fn verify_import(&self, import: &str) -> AccessResult {
        let matched = match &self.regex {
            Some(re) => re.is_match(import),
            None => import == self.pattern,
        };
        if matched {
            AccessResult::from_allow(self.allow)
        } else {
            AccessResult::Unknown
        }
    }
}

/// One allow/disallow entry in a node's ordered rule list.
#[derive(Debug, Clone)]
pub enum ImportRule {
    /// Package-prefix rule.
    Package(PkgImportRule),
    /// Exact class rule.
    Class(ClassImportRule),
}

impl ImportRule {
    /// Verifies an import: `Allowed`/`Disallowed` on match, `Unknown` otherwise.
    #[must_use]
    pub fn verify_import(&self, import: &str) -> AccessResult {
        match self {
            Self::Package(rule) => rule.verify_import(import),
            Self::Class(rule) => rule.verify_import(import),
        }
    }

    /// Whether a match grants access.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        match self {
            Self::Package(rule) => rule.allow,
            Self::Class(rule) => rule.allow,
        }
    }

    /// Whether the rule only applies to the node it is declared on.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        match self {
            Self::Package(rule) => rule.local_only,
            Self::Class(rule) => rule.local_only,
        }
    }

    /// Whether the pattern is a regular expression.
    #[must_use]
    pub fn is_regex(&self) -> bool {
        match self {
            Self::Package(rule) => rule.regex.is_some(),
            Self::Class(rule) => rule.regex.is_some(),
        }
    }

    /// Whether sub-packages are excluded. Always `false` for class rules.
    #[must_use]
    pub fn is_exact_match(&self) -> bool {
        match self {
            Self::Package(rule) => rule.exact_match,
            Self::Class(_) => false,
        }
    }

    /// The pattern as configured.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Package(rule) => &rule.pattern,
            Self::Class(rule) => &rule.pattern,
        }
    }
}

impl From<PkgImportRule> for ImportRule {
    fn from(rule: PkgImportRule) -> Self {
        Self::Package(rule)
    }
}

impl From<ClassImportRule> for ImportRule {
    fn from(rule: ClassImportRule) -> Self {
        Self::Class(rule)
    }
}
