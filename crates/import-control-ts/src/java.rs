//! Java language extractor using Tree-sitter.
//!
//! Imports keep the text a policy rule is matched against:
//!
//! | Source                                  | Path                     |
//! |-----------------------------------------|--------------------------|
//! | `import java.util.List;`                | `java.util.List`         |
//! | `import javax.swing.border.*;`          | `javax.swing.border.*`   |
//! | `import static java.awt.Button.ABORT;`  | `java.awt.Button.ABORT`  |

use tree_sitter::{Language, Node, Parser};

use crate::extractor::{
    node_text, ExtractError, FileAnalysis, ImportInfo, LanguageExtractor, PackageInfo,
};

/// Extracts imports and the package declaration from Java source.
pub struct JavaExtractor {
    language: Language,
}

impl JavaExtractor {
    /// Creates a new Java extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn is_name(node: &Node<'_>) -> bool {
        matches!(node.kind(), "scoped_identifier" | "identifier")
    }

    /// Name rebuilt from its `identifier` leaves, so comments and
    /// whitespace between segments are dropped.
    fn dotted_name(node: &Node<'_>, src: &[u8]) -> String {
        fn collect<'a>(node: &Node<'_>, src: &'a [u8], parts: &mut Vec<&'a str>) {
            if node.kind() == "identifier" {
                parts.push(node_text(node, src));
                return;
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect(&child, src, parts);
            }
        }

        let mut parts = Vec::new();
        collect(node, src, &mut parts);
        parts.join(".")
    }

    fn extract_package(node: &Node<'_>, src: &[u8]) -> Option<PackageInfo> {
        let mut cursor = node.walk();
        let name = node.children(&mut cursor).find(Self::is_name)?;
        Some(PackageInfo {
            line: node.start_position().row + 1,
            column: node.start_position().column,
            path: Self::dotted_name(&name, src),
        })
    }

    fn extract_import(node: &Node<'_>, src: &[u8]) -> Option<ImportInfo> {
        let mut path = None;
        let mut is_static = false;
        let mut wildcard = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => wildcard = true,
                _ if path.is_none() && Self::is_name(&child) => {
                    path = Some(Self::dotted_name(&child, src));
                }
                _ => {}
            }
        }
        let mut path = path?;
        if wildcard {
            path.push_str(".*");
        }
        Some(ImportInfo {
            line: node.start_position().row + 1,
            column: node.start_position().column,
            offset: node.start_byte(),
            length: node.end_byte() - node.start_byte(),
            path,
            is_static,
        })
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for JavaExtractor {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".java"]
    }

    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|source| ExtractError::Language {
                language: "java",
                source,
            })?;

        let src = source.as_bytes();
        let tree = parser
            .parse(src, None)
            .ok_or(ExtractError::Parse { language: "java" })?;
        let root = tree.root_node();

        let mut result = FileAnalysis::default();
        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            match node.kind() {
                "package_declaration" => {
                    result.package = Self::extract_package(&node, src);
                }
                "import_declaration" => {
                    if let Some(imp) = Self::extract_import(&node, src) {
                        result.imports.push(imp);
                    }
                }
                _ => {}
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(src: &str) -> FileAnalysis {
        JavaExtractor::new().analyze(src).unwrap()
    }

    const SOURCE: &str = "\
package com.kazgroup.courtlink.common;

import java.util.List;
import javax.swing.border.*;
import static java.awt.Button.ABORT;

public class Repo {}
";

    #[test]
    fn extracts_package() {
        let a = analyze(SOURCE);
        let pkg = a.package.unwrap();
        assert_eq!(pkg.path, "com.kazgroup.courtlink.common");
        assert_eq!(pkg.line, 1);
    }

    #[test]
    fn extracts_plain_wildcard_and_static_imports() {
        let a = analyze(SOURCE);
        let imports: Vec<_> = a
            .imports
            .iter()
            .map(|i| (i.path.as_str(), i.line, i.is_static))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("java.util.List", 3, false),
                ("javax.swing.border.*", 4, false),
                ("java.awt.Button.ABORT", 5, true),
            ]
        );
    }

    #[test]
    fn import_span_covers_statement() {
        let a = analyze(SOURCE);
        let first = &a.imports[0];
        assert_eq!(
            &SOURCE[first.offset..first.offset + first.length],
            "import java.util.List;"
        );
    }

    #[test]
    fn comments_inside_names_are_dropped() {
        let a = analyze("package com. /* x */ example;\nimport java./*y*/util . List;\n");
        assert_eq!(a.package.map(|p| p.path), Some("com.example".to_string()));
        assert_eq!(a.imports[0].path, "java.util.List");
    }

    #[test]
    fn default_package_has_no_declaration() {
        let a = analyze("import java.util.List;\nclass A {}\n");
        assert!(a.package.is_none());
        assert_eq!(a.imports.len(), 1);
    }

    #[test]
    fn handles_java_extension() {
        let j = JavaExtractor::new();
        assert!(j.handles(std::path::Path::new("src/Main.java")));
        assert!(!j.handles(std::path::Path::new("src/Main.kt")));
    }
}
