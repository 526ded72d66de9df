//! Update-metapackage command: bump the release package and its dependencies.

use anyhow::Result;
use rex_core::config::RexConfig;
use rex_core::metapackage;
use rex_core::repo;

use super::parse_package_versions;

/// Check out the versions repository, update the metapackage's YAML
/// dependency list and spec file, and publish the update per the config
/// flags.
pub fn run_update_metapackage(
    cfg: &RexConfig,
    metapackage_name: &str,
    packages: &[String],
) -> Result<()> {
    let parsed = parse_package_versions(packages)?;

    let repo = repo::setup_versions_repository(cfg)?;
    metapackage::update_metapackage(&repo, metapackage_name, &parsed)?;
    tracing::info!(metapackage_name, "updated metapackage");

    repo::publish_updates(cfg, &repo, "Update package dependencies")?;
    Ok(())
}
