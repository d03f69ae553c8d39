//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# import-control configuration

[analyzer]
# Directory searched for .java/.kt/.kts sources (default: current directory)
# root = "./src"

# Glob patterns to exclude from the check
exclude = ["**/build/**", "**/generated/**"]

# Only files whose path matches this regex are checked
# path = ".*/main/.*"

# Severity of reported violations: error, warning, info
# severity = "error"

# The policy tree. Rules are tried in order; the first match wins.
# When no rule matches, strategy-on-mismatch decides:
#   disallowed | allowed | delegate-to-parent (ask the enclosing package)

[import-control]
pkg = "com.example"
strategy-on-mismatch = "disallowed"
rules = [
  { access = "disallow", class = "java.sql.DriverManager" },
  { access = "allow", pkg = "java" },
  { access = "allow", pkg = "kotlin" },
]

[[import-control.subpackage]]
name = "domain"
rules = [{ access = "disallow", pkg = "java.sql" }]

[[import-control.subpackage]]
name = "infra"
rules = [{ access = "allow", pkg = "org.springframework" }]

# Rules for a single file of a package, matched by file name
# [[import-control.file]]
# name = "Application"
# rules = [{ access = "allow", pkg = "org.springframework.boot" }]
"#;

/// Config file written by `init`.
pub const CONFIG_FILE: &str = "import-control.toml";

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set `pkg` to your root package and adjust the rules");
    println!("  2. Run: import-control check");

    Ok(())
}
