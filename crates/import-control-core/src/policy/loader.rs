//! DTO → [`ImportControl`] conversion with validation.

use crate::access::MismatchStrategy;
use crate::error::PolicyError;
use crate::rule::{ClassImportRule, ImportRule, PkgImportRule};
use crate::tree::{ImportControl, NodeId};

use super::config_dto::{FileDto, PolicyDocumentDto, RootDto, RuleDto, SubpackageDto};

/// Errors during DTO → tree conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document has no `[import-control]` table.
    #[error("missing `[import-control]` table")]
    MissingRoot,

    /// The tree rejected a name or pattern.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "import-control.subpackage[0].name").
        context: String,
        /// The underlying policy error.
        source: PolicyError,
    },

    /// Unknown `access` string.
    #[error("{context}: unknown access `{value}`, expected: allow, disallow")]
    UnknownAccess {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown `strategy-on-mismatch` string.
    #[error("{context}: {source}")]
    UnknownStrategy {
        /// Where the error occurred.
        context: String,
        /// The parse error.
        source: crate::access::ParseStrategyError,
    },

    /// The `pkg` and `class` fields are both set or both missing.
    #[error("{context}: exactly one of `pkg` or `class` must be set")]
    AmbiguousTarget {
        /// The offending rule.
        context: String,
    },

    /// `exact-match` was set on a class rule.
    #[error("{context}: `exact-match` only applies to `pkg` rules")]
    ExactMatchOnClass {
        /// The offending rule.
        context: String,
    },
}

const ROOT_CONTEXT: &str = "import-control";

/// Converts a parsed document into a policy tree.
///
/// # Errors
///
/// Returns [`LoadError::MissingRoot`] without an `[import-control]` table,
/// otherwise the first validation error encountered.
pub fn load(dto: PolicyDocumentDto) -> Result<ImportControl, LoadError> {
    dto.import_control.map_or(Err(LoadError::MissingRoot), load_root)
}

/// Converts the `[import-control]` table into a policy tree.
///
/// # Errors
///
/// Returns the first validation error encountered; no partial tree is built.
pub fn load_root(dto: RootDto) -> Result<ImportControl, LoadError> {
    let strategy = parse_strategy(
        dto.strategy_on_mismatch.as_deref(),
        MismatchStrategy::Disallowed,
        ROOT_CONTEXT,
    )?;
    let mut tree = ImportControl::new(&dto.pkg, dto.regex, strategy).map_err(|e| {
        LoadError::Validation {
            context: format!("{ROOT_CONTEXT}.pkg"),
            source: e,
        }
    })?;
    let root = tree.root();
    populate(
        &mut tree,
        root,
        &dto.rules,
        &dto.subpackage,
        &dto.file,
        ROOT_CONTEXT,
    )?;
    tracing::debug!(nodes = tree.len(), "import-control policy loaded");
    Ok(tree)
}

/// Adds rules, then subpackages, then files below `node`.
fn populate(
    tree: &mut ImportControl,
    node: NodeId,
    rules: &[RuleDto],
    subpackages: &[SubpackageDto],
    files: &[FileDto],
    ctx: &str,
) -> Result<(), LoadError> {
    add_rules(tree, node, rules, ctx)?;

    for (i, sub) in subpackages.iter().enumerate() {
        let ctx = format!("{ctx}.subpackage[{i}]");
        let strategy = parse_strategy(
            sub.strategy_on_mismatch.as_deref(),
            MismatchStrategy::DelegateToParent,
            &ctx,
        )?;
        let child = tree
            .add_package(node, &sub.name, sub.regex, strategy)
            .map_err(|e| LoadError::Validation {
                context: format!("{ctx}.name"),
                source: e,
            })?;
        populate(tree, child, &sub.rules, &sub.subpackage, &sub.file, &ctx)?;
    }

    for (i, file) in files.iter().enumerate() {
        let ctx = format!("{ctx}.file[{i}]");
        let strategy = parse_strategy(
            file.strategy_on_mismatch.as_deref(),
            MismatchStrategy::DelegateToParent,
            &ctx,
        )?;
        let child = tree
            .add_file(node, &file.name, file.regex, strategy)
            .map_err(|e| LoadError::Validation {
                context: format!("{ctx}.name"),
                source: e,
            })?;
        add_rules(tree, child, &file.rules, &ctx)?;
    }

    Ok(())
}

fn add_rules(
    tree: &mut ImportControl,
    node: NodeId,
    rules: &[RuleDto],
    ctx: &str,
) -> Result<(), LoadError> {
    for (i, dto) in rules.iter().enumerate() {
        let context = format!("{ctx}.rules[{i}]");
        let rule = convert_rule(dto, &context)?;
        tree.add_rule(node, rule)
            .map_err(|e| LoadError::Validation { context, source: e })?;
    }
    Ok(())
}

fn convert_rule(dto: &RuleDto, context: &str) -> Result<ImportRule, LoadError> {
    let allow = parse_access(&dto.access, context)?;
    let validation = |e| LoadError::Validation {
        context: context.to_string(),
        source: e,
    };
    match (&dto.pkg, &dto.class) {
        (Some(pkg), None) => {
            PkgImportRule::new(allow, dto.local_only, pkg, dto.exact_match, dto.regex)
                .map(ImportRule::from)
                .map_err(validation)
        }
        (None, Some(class)) => {
            if dto.exact_match {
                return Err(LoadError::ExactMatchOnClass {
                    context: context.to_string(),
                });
            }
            ClassImportRule::new(allow, dto.local_only, class, dto.regex)
                .map(ImportRule::from)
                .map_err(validation)
        }
        _ => Err(LoadError::AmbiguousTarget {
            context: context.to_string(),
        }),
    }
}

fn parse_access(value: &str, context: &str) -> Result<bool, LoadError> {
    match value {
        "allow" => Ok(true),
        "disallow" => Ok(false),
        _ => Err(LoadError::UnknownAccess {
            context: context.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_strategy(
    value: Option<&str>,
    default: MismatchStrategy,
    context: &str,
) -> Result<MismatchStrategy, LoadError> {
    value.map_or(Ok(default), |v| {
        v.parse().map_err(|e| LoadError::UnknownStrategy {
            context: context.to_string(),
            source: e,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Decision, NodeKind};

    fn parse_and_load(toml_str: &str) -> Result<ImportControl, LoadError> {
        let dto: PolicyDocumentDto = toml::from_str(toml_str).unwrap();
        load(dto)
    }

    // -- Happy path --

    #[test]
    fn load_full_policy() {
        let tree = parse_and_load(
            r#"
[import-control]
pkg = "com.example"
rules = [
  { access = "disallow", pkg = "org.springframework" },
  { access = "allow", class = "java.io.File", local-only = true },
  { access = "allow", pkg = "java" },
]

[[import-control.subpackage]]
name = "common"
rules = [{ access = "allow", pkg = "org.hibernate" }]

[[import-control.subpackage.subpackage]]
name = "api|web"
regex = true
strategy-on-mismatch = "allowed"

[[import-control.file]]
name = "Main"
rules = [{ access = "allow", pkg = "java.nio", exact-match = true }]
"#,
        )
        .unwrap();

        assert_eq!(tree.len(), 4);
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.strategy(), MismatchStrategy::Disallowed);
        assert_eq!(root.rules().len(), 3);

        let children: Vec<_> = root.children().collect();
        assert_eq!(children[0].full_name(), "com.example.common");
        assert_eq!(children[0].strategy(), MismatchStrategy::DelegateToParent);
        assert_eq!(children[1].kind(), NodeKind::File);

        assert_eq!(
            tree.evaluate("com.example.common", "A", "org.hibernate.Session"),
            Decision::Allowed
        );
        assert_eq!(
            tree.evaluate("com.example.common.web", "A", "anything.At.All"),
            Decision::Allowed
        );
        assert_eq!(
            tree.evaluate("com.example.common", "A", "org.springframework.Bean"),
            Decision::Disallowed
        );
        assert_eq!(
            tree.evaluate("com.example", "A", "java.io.File"),
            Decision::Allowed
        );
        assert_eq!(
            tree.evaluate("com.example", "Main", "java.nio.Path"),
            Decision::Allowed
        );
    }

    #[test]
    fn subpackages_precede_files() {
        let tree = parse_and_load(
            r#"
[import-control]
pkg = "com.example"

[[import-control.file]]
name = "Util"

[[import-control.subpackage]]
name = "util"
"#,
        )
        .unwrap();
        let kinds: Vec<_> = tree
            .node(tree.root())
            .unwrap()
            .children()
            .map(|c| c.kind())
            .collect();
        assert_eq!(kinds, vec![NodeKind::Package, NodeKind::File]);
    }

    #[test]
    fn root_strategy_can_delegate() {
        let tree = parse_and_load(
            r#"
[import-control]
pkg = "com.example"
strategy-on-mismatch = "delegate-to-parent"
"#,
        )
        .unwrap();
        assert_eq!(
            tree.evaluate("com.example", "A", "java.util.List"),
            Decision::Disallowed
        );
    }

    // -- Error cases --

    #[test]
    fn load_rejects_missing_root() {
        assert!(matches!(parse_and_load(""), Err(LoadError::MissingRoot)));
    }

    #[test]
    fn load_rejects_unknown_access() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"
rules = [{ access = "permit", pkg = "java" }]
"#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, LoadError::UnknownAccess { .. }));
        assert!(err.to_string().starts_with("import-control.rules[0]"));
    }

    #[test]
    fn load_rejects_unknown_strategy() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"

[[import-control.subpackage]]
name = "a"
strategy-on-mismatch = "maybe"
"#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, LoadError::UnknownStrategy { .. }));
        assert!(err.to_string().contains("import-control.subpackage[0]"));
    }

    #[test]
    fn load_rejects_both_pkg_and_class() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"
rules = [{ access = "allow", pkg = "java", class = "java.io.File" }]
"#,
        );
        assert!(matches!(result, Err(LoadError::AmbiguousTarget { .. })));
    }

    #[test]
    fn load_rejects_neither_pkg_nor_class() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"
rules = [{ access = "allow" }]
"#,
        );
        assert!(matches!(result, Err(LoadError::AmbiguousTarget { .. })));
    }

    #[test]
    fn load_rejects_exact_match_on_class() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"
rules = [{ access = "allow", class = "java.io.File", exact-match = true }]
"#,
        );
        assert!(matches!(result, Err(LoadError::ExactMatchOnClass { .. })));
    }

    #[test]
    fn load_rejects_invalid_regex_with_path() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"

[[import-control.subpackage]]
name = "ok"

[[import-control.subpackage.file]]
name = "Main"
rules = [{ access = "allow", pkg = "org.(", regex = true }]
"#,
        );
        let err = result.unwrap_err();
        match &err {
            LoadError::Validation { context, source } => {
                assert_eq!(context, "import-control.subpackage[0].file[0].rules[0]");
                assert!(matches!(source, PolicyError::InvalidRegex { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_rejects_dotted_file_name() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = "com.example"

[[import-control.file]]
name = "Main.java"
"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::Validation {
                source: PolicyError::DottedFileName { .. },
                ..
            })
        ));
    }

    #[test]
    fn misspelled_keys_fail_to_parse() {
        for toml_str in [
            "[import-control]\npkg = \"a\"\nstrategy_on_mismatch = \"allowed\"\n",
            "[import-control]\npkg = \"a\"\nrules = [{ access = \"allow\", pkg = \"b\", local_only = true }]\n",
            "[import-control]\npkg = \"a\"\n[[import-control.subpackage]]\nname = \"b\"\nstrategy = \"allowed\"\n",
            "[import-control]\npkg = \"a\"\n[[import-control.file]]\nname = \"B\"\nrule = []\n",
        ] {
            let err = toml::from_str::<PolicyDocumentDto>(toml_str).unwrap_err();
            assert!(err.to_string().contains("unknown field"), "{err}");
        }
    }

    #[test]
    fn load_rejects_empty_root() {
        let result = parse_and_load(
            r#"
[import-control]
pkg = ""
"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::Validation {
                source: PolicyError::EmptyName,
                ..
            })
        ));
    }
}
