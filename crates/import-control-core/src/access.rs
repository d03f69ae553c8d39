//! Access verdicts and mismatch strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of matching an import against a rule, a node, or a whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessResult {
    /// The import is permitted.
    Allowed,
    /// The import is forbidden.
    Disallowed,
    /// No information; the next rule or layer decides.
    Unknown,
}

impl AccessResult {
    /// Maps a rule's `allow` flag to its verdict when the rule matched.
    #[must_use]
    pub fn from_allow(allow: bool) -> Self {
        if allow {
            Self::Allowed
        } else {
            Self::Disallowed
        }
    }

    /// Returns `true` for [`AccessResult::Unknown`].
    #[must_use]
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    /// Keeps a decided verdict, otherwise asks `f` for one.
    ///
    /// Earlier layers take precedence: once a verdict is `Allowed` or
    /// `Disallowed`, `f` is never called.
    #[must_use]
    pub fn or_else(self, f: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Unknown => f(),
            decided => decided,
        }
    }
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "allowed"),
            Self::Disallowed => write!(f, "disallowed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// What a node does when none of its own rules matched an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MismatchStrategy {
    /// Reject the import.
    #[default]
    Disallowed,
    /// Accept the import.
    Allowed,
    /// Ask the parent node. On the root this behaves like `Disallowed`.
    DelegateToParent,
}

impl fmt::Display for MismatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disallowed => write!(f, "disallowed"),
            Self::Allowed => write!(f, "allowed"),
            Self::DelegateToParent => write!(f, "delegate-to-parent"),
        }
    }
}

/// Error returned when parsing an unknown mismatch strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy `{0}`, expected: allowed, disallowed, delegate-to-parent")]
pub struct ParseStrategyError(pub String);

impl FromStr for MismatchStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disallowed" => Ok(Self::Disallowed),
            "allowed" => Ok(Self::Allowed),
            "delegate-to-parent" => Ok(Self::DelegateToParent),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_allow_maps_flag() {
        assert_eq!(AccessResult::from_allow(true), AccessResult::Allowed);
        assert_eq!(AccessResult::from_allow(false), AccessResult::Disallowed);
    }

    #[test]
    fn or_else_keeps_decided_verdict() {
        let r = AccessResult::Disallowed.or_else(|| panic!("must not be called"));
        assert_eq!(r, AccessResult::Disallowed);
    }

    #[test]
    fn or_else_falls_through_unknown() {
        let r = AccessResult::Unknown.or_else(|| AccessResult::Allowed);
        assert_eq!(r, AccessResult::Allowed);
    }

    #[test]
    fn strategy_round_trips_through_display() {
        for s in [
            MismatchStrategy::Allowed,
            MismatchStrategy::Disallowed,
            MismatchStrategy::DelegateToParent,
        ] {
            assert_eq!(s.to_string().parse::<MismatchStrategy>(), Ok(s));
        }
    }

    #[test]
    fn strategy_rejects_unknown_name() {
        let err = "delegate".parse::<MismatchStrategy>().unwrap_err();
        assert!(err.to_string().contains("delegate"));
    }
}
