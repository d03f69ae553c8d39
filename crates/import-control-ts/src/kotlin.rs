//! Kotlin language extractor using Tree-sitter.

use tree_sitter::{Language, Node, Parser};

use crate::extractor::{
    node_text, ExtractError, FileAnalysis, ImportInfo, LanguageExtractor, PackageInfo,
};

/// Extracts imports and the package header from Kotlin source.
pub struct KotlinExtractor {
    language: Language,
}

impl KotlinExtractor {
    /// Creates a new Kotlin extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_kotlin_ng::LANGUAGE.into(),
        }
    }

    /// Join identifier children of a `qualified_identifier` node with dots.
    fn qualified_id(node: &Node<'_>, src: &[u8]) -> String {
        let mut parts = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "identifier" {
                parts.push(node_text(&child, src));
            }
        }
        parts.join(".")
    }

    fn extract_package(node: &Node<'_>, src: &[u8]) -> Option<PackageInfo> {
        let mut cursor = node.walk();
        let id = node
            .children(&mut cursor)
            .find(|c| c.kind() == "qualified_identifier")?;
        Some(PackageInfo {
            line: node.start_position().row + 1,
            column: node.start_position().column,
            path: Self::qualified_id(&id, src),
        })
    }

    /// `import a.b.C`, `import a.b.*`; an `as` alias does not change the path.
    fn extract_import(node: &Node<'_>, src: &[u8]) -> Option<ImportInfo> {
        let mut path = None;
        let mut wildcard = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "qualified_identifier" if path.is_none() => {
                    path = Some(Self::qualified_id(&child, src));
                }
                "*" | ".*" => wildcard = true,
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
            is_static: false,
        })
    }
}

impl Default for KotlinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for KotlinExtractor {
    fn language_id(&self) -> &'static str {
        "kotlin"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".kt", ".kts"]
    }

    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|source| ExtractError::Language {
                language: "kotlin",
                source,
            })?;

        let src = source.as_bytes();
        let tree = parser
            .parse(src, None)
            .ok_or(ExtractError::Parse { language: "kotlin" })?;
        let root = tree.root_node();

        let mut result = FileAnalysis::default();
        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            match node.kind() {
                "package_header" => {
                    result.package = Self::extract_package(&node, src);
                }
                "import" => {
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
        KotlinExtractor::new().analyze(src).unwrap()
    }

    #[test]
    fn extracts_package() {
        let a = analyze("package com.example.domain.model\n");
        assert_eq!(
            a.package.as_ref().map(|p| p.path.as_str()),
            Some("com.example.domain.model")
        );
        assert_eq!(a.package.map(|p| p.line), Some(1));
    }

    #[test]
    fn extracts_imports_in_order() {
        let a = analyze(
            "package com.example.app\nimport com.example.domain.User\nimport com.example.infra.Repo\n",
        );
        let paths: Vec<_> = a.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["com.example.domain.User", "com.example.infra.Repo"]);
        assert_eq!(a.imports[0].line, 2);
        assert_eq!(a.imports[0].column, 0);
        assert!(!a.imports[0].is_static);
    }

    #[test]
    fn alias_keeps_original_path() {
        let a = analyze("package a\nimport java.util.Date as JDate\n");
        assert_eq!(a.imports[0].path, "java.util.Date");
    }

    #[test]
    fn wildcard_import_keeps_star() {
        let a = analyze("package a\nimport java.util.*\n");
        let paths: Vec<_> = a.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["java.util.*"]);
    }

    #[test]
    fn empty_source() {
        let a = analyze("");
        assert!(a.package.is_none());
        assert!(a.imports.is_empty());
    }

    #[test]
    fn handles_kotlin_extensions() {
        let k = KotlinExtractor::new();
        assert!(k.handles(std::path::Path::new("src/Main.kt")));
        assert!(k.handles(std::path::Path::new("build.gradle.kts")));
        assert!(!k.handles(std::path::Path::new("src/Main.java")));
    }
}
