//! CLI command handlers. Each command is in its own file.

mod exec;
mod update_metapackage;
mod update_readme;

pub use exec::run_exec;
pub use update_metapackage::run_update_metapackage;
pub use update_readme::run_update_readme;

use anyhow::{Context, Result};
use rex_core::versions::PackageVersion;

/// Parse `NAME=VERSION` pairs from the command line.
pub(crate) fn parse_package_versions(specs: &[String]) -> Result<Vec<PackageVersion>> {
    let mut parsed = Vec::with_capacity(specs.len());
    for spec in specs {
        let (name, version) = spec
            .split_once('=')
            .with_context(|| format!("expected NAME=VERSION, got `{}`", spec))?;
        parsed.push(PackageVersion {
            name: name.to_string(),
            version: version.to_string(),
        });
    }
    Ok(parsed)
}
