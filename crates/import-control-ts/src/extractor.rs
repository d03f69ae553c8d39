//! Language-agnostic extraction types and trait.
//!
//! `LanguageExtractor` is the extension point for adding new languages.
//! Implement it to teach import-control how to extract the package
//! declaration and imports of a source file via Tree-sitter.

use std::path::{Path, PathBuf};

/// Package declaration extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within line).
    pub column: usize,
    /// Fully qualified package path (e.g., `com.example.domain.model`).
    pub path: String,
}

/// A single import statement extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within line).
    pub column: usize,
    /// Byte offset of the statement in the file.
    pub offset: usize,
    /// Length of the statement in bytes.
    pub length: usize,
    /// Imported path as written, e.g. `java.util.List` or `javax.swing.*`.
    pub path: String,
    /// Java `import static`.
    pub is_static: bool,
}

/// Result of analyzing a single source file with Tree-sitter.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    /// Path as discovered.
    pub file_path: PathBuf,
    /// Package declaration, if present.
    pub package: Option<PackageInfo>,
    /// Imports in source order.
    pub imports: Vec<ImportInfo>,
}

impl FileAnalysis {
    /// File name without extension; file nodes of a policy match on it.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Sets the path this analysis belongs to.
    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = path.as_ref().to_path_buf();
        self
    }
}

/// Errors raised while parsing a source file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The grammar is incompatible with the linked tree-sitter runtime.
    #[error("failed to load {language} grammar: {source}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Runtime error.
        source: tree_sitter::LanguageError,
    },
    /// The parser produced no tree.
    #[error("failed to parse {language} source")]
    Parse {
        /// Language identifier.
        language: &'static str,
    },
}

/// Trait for language-specific Tree-sitter extraction.
///
/// The extractor receives raw source text and returns a [`FileAnalysis`]
/// with an empty `file_path`; callers attach the path.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"java"`, `"kotlin"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".kt", ".kts"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extract the package declaration and imports from source code.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or parsing fails.
    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError>;

    /// Whether this extractor handles `path`, judged by extension.
    fn handles(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.extensions().iter().any(|ext| name.ends_with(ext))
    }
}

pub(crate) fn node_text<'a>(node: &tree_sitter::Node<'_>, src: &'a [u8]) -> &'a str {
    src.get(node.start_byte()..node.end_byte())
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_strips_extension() {
        let a = FileAnalysis::default().with_path("src/com/example/Main.java");
        assert_eq!(a.file_stem(), "Main");
        let a = FileAnalysis::default().with_path("build.gradle.kts");
        assert_eq!(a.file_stem(), "build.gradle");
    }

    #[test]
    fn file_stem_of_empty_path_is_empty() {
        assert_eq!(FileAnalysis::default().file_stem(), "");
    }
}
