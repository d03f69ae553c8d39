//! Flat guard lists.
//!
//! A [`GuardList`] is the non-hierarchical form of import control: one
//! ordered list of guards, first match wins, no package tree and no
//! mismatch strategy. Callers that need a verdict for unmatched imports
//! pass their own default to [`GuardList::check_access_or`].

use crate::access::AccessResult;
use crate::error::PolicyError;
use crate::rule::{ClassImportRule, ImportRule, PkgImportRule};

/// A single allow/disallow predicate over import paths.
#[derive(Debug, Clone)]
pub struct Guard(ImportRule);

impl Guard {
    /// Creates a guard covering a package.
    ///
    /// # Errors
    ///
    /// See [`PkgImportRule::new`].
    pub fn package(
        allow: bool,
        local_only: bool,
        pkg: &str,
        exact_match: bool,
        regex: bool,
    ) -> Result<Self, PolicyError> {
        PkgImportRule::new(allow, local_only, pkg, exact_match, regex).map(|r| Self(r.into()))
    }

    /// Creates a guard covering one class.
    ///
    /// # Errors
    ///
    /// See [`ClassImportRule::new`].
    pub fn class(
        allow: bool,
        local_only: bool,
        class: &str,
        regex: bool,
    ) -> Result<Self, PolicyError> {
        ClassImportRule::new(allow, local_only, class, regex).map(|r| Self(r.into()))
    }

    /// Verifies an import against the wrapped rule.
    #[must_use]
    pub fn verify_import(&self, import: &str) -> AccessResult {
        self.0.verify_import(import)
    }

    /// Whether the guard only applies to the package it is declared for.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.0.is_local_only()
    }

    /// Borrows the wrapped rule.
    #[must_use]
    pub fn rule(&self) -> &ImportRule {
        &self.0
    }
}

impl From<ImportRule> for Guard {
    fn from(rule: ImportRule) -> Self {
        Self(rule)
    }
}

/// An ordered, flat list of guards.
#[derive(Debug, Clone, Default)]
pub struct GuardList {
    guards: Vec<Guard>,
}

impl GuardList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a guard; earlier guards take priority.
    pub fn push(&mut self, guard: Guard) {
        self.guards.push(guard);
    }

    /// Returns the first decided verdict, or `Unknown` if nothing matched.
    #[must_use]
    pub fn check_access(&self, import: &str) -> AccessResult {
        self.guards
            .iter()
            .map(|g| g.verify_import(import))
            .find(|r| !r.is_unknown())
            .unwrap_or(AccessResult::Unknown)
    }

    /// Like [`check_access`](Self::check_access) but replaces `Unknown` with `default`.
    #[must_use]
    pub fn check_access_or(&self, import: &str, default: AccessResult) -> AccessResult {
        self.check_access(import).or_else(|| default)
    }

    /// Number of guards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Returns `true` if the list has no guards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl FromIterator<Guard> for GuardList {
    fn from_iter<I: IntoIterator<Item = Guard>>(iter: I) -> Self {
        Self {
            guards: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> GuardList {
        [
            Guard::class(true, false, "java.util.Date", false).unwrap(),
            Guard::package(false, false, "java.util", false, false).unwrap(),
            Guard::package(true, false, "java", false, false).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn first_matching_guard_wins() {
        let guards = list();
        assert_eq!(guards.check_access("java.util.Date"), AccessResult::Allowed);
        assert_eq!(guards.check_access("java.util.List"), AccessResult::Disallowed);
        assert_eq!(guards.check_access("java.io.File"), AccessResult::Allowed);
    }

    #[test]
    fn unmatched_import_is_unknown() {
        assert_eq!(list().check_access("org.slf4j.Logger"), AccessResult::Unknown);
    }

    #[test]
    fn caller_default_applies_only_to_unknown() {
        let guards = list();
        assert_eq!(
            guards.check_access_or("org.slf4j.Logger", AccessResult::Disallowed),
            AccessResult::Disallowed
        );
        assert_eq!(
            guards.check_access_or("java.io.File", AccessResult::Disallowed),
            AccessResult::Allowed
        );
    }

    #[test]
    fn empty_list_knows_nothing() {
        let guards = GuardList::new();
        assert!(guards.is_empty());
        assert_eq!(guards.check_access("a.B"), AccessResult::Unknown);
    }

    #[test]
    fn guard_exposes_local_only() {
        let g = Guard::package(true, true, "a", false, false).unwrap();
        assert!(g.is_local_only());
        assert_eq!(g.rule().pattern(), "a");
    }
}
