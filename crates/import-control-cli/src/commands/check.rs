//! Check command.
//!
//! Discovers Java and Kotlin sources below the configured root, extracts
//! their imports with Tree-sitter and evaluates them against the policy.

use anyhow::{Context, Result};
use import_control_core::LintResult;
use import_control_ts::{extractors, CheckConfig, ImportControlCheck, LanguageExtractor};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command; returns `false` when errors were found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    exclude: &[String],
    source: &ConfigSource,
) -> Result<bool> {
    let result = check_project(path, exclude, source)?;
    super::output::print(&result, format, path)?;
    Ok(!result.has_errors())
}

/// Checks every supported file of the project at `path`.
pub fn check_project(path: &Path, exclude: &[String], source: &ConfigSource) -> Result<LintResult> {
    let mut config = load_config(source)?;
    config
        .add_excludes(exclude.iter().map(String::as_str))
        .context("Invalid --exclude pattern")?;

    let engine = ImportControlCheck::new(&config);
    let extractors = extractors();

    let root = if config.root.is_absolute() {
        config.root.clone()
    } else {
        path.join(&config.root)
    };

    let files = discover_files(&root, path, &config, &extractors)?;
    tracing::info!("Checking {} files", files.len());

    let mut result = LintResult::new();

    for file_path in &files {
        let Some(extractor) = extractors.iter().find(|e| e.handles(file_path)) else {
            continue;
        };

        let text = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;

        let analysis = match extractor.analyze(&text) {
            Ok(analysis) => analysis.with_path(file_path.strip_prefix(path).unwrap_or(file_path)),
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", file_path.display());
                continue;
            }
        };

        result.violations.extend(engine.check(&analysis));
        result.files_checked += 1;
    }

    result.sort();
    let (errors, warnings, _) = result.count_by_severity();
    tracing::debug!(errors, warnings, files = result.files_checked, "check finished");
    Ok(result)
}

fn load_config(source: &ConfigSource) -> Result<CheckConfig> {
    let Some(p) = source.path() else {
        anyhow::bail!("No import-control.toml found. Run `import-control init` to create one.");
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", p.display());
    }
    CheckConfig::from_file(p).with_context(|| format!("Failed to load {}", p.display()))
}

fn discover_files(
    root: &Path,
    project: &Path,
    config: &CheckConfig,
    extractors: &[Box<dyn LanguageExtractor>],
) -> Result<Vec<PathBuf>> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || !extractors.iter().any(|e| e.handles(path)) {
            continue;
        }

        let rel = path.strip_prefix(project).unwrap_or(path);
        if config.is_excluded(rel) {
            tracing::debug!("Excluded {}", rel.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
