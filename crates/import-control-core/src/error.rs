//! Errors raised while building a policy tree.

use miette::Diagnostic;

/// A policy could not be constructed.
///
/// Every variant is a configuration problem: once construction succeeds,
/// queries against the tree cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum PolicyError {
    /// A regular expression in a rule or node name does not compile.
    #[error("invalid regex `{pattern}`: {reason}")]
    #[diagnostic(
        code(import_control::invalid_regex),
        help("patterns use the `regex` crate syntax; escape literal dots as `\\.`")
    )]
    InvalidRegex {
        /// The pattern as written in the configuration.
        pattern: String,
        /// Compiler error message.
        reason: String,
    },

    /// A rule pattern is empty.
    #[error("rule pattern must not be empty")]
    #[diagnostic(code(import_control::empty_pattern))]
    EmptyPattern,

    /// A package or file node name is empty.
    #[error("node name must not be empty")]
    #[diagnostic(code(import_control::empty_name))]
    EmptyName,

    /// A literal file name contains a package separator.
    #[error("file name `{name}` must not contain `.`")]
    #[diagnostic(
        code(import_control::dotted_file_name),
        help("file nodes match the source file name without its extension")
    )]
    DottedFileName {
        /// The rejected name.
        name: String,
    },

    /// Children were attached to a file node.
    #[error("node `{name}` is a file node and cannot have children")]
    #[diagnostic(code(import_control::file_parent))]
    FileParent {
        /// Full name of the file node.
        name: String,
    },

    /// A node id does not belong to this tree.
    #[error("node #{0} does not exist in this policy")]
    #[diagnostic(code(import_control::unknown_node))]
    UnknownNode(usize),
}
