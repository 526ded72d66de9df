//! Update-readme command: regenerate the README versions table.

use anyhow::Result;
use rex_core::config::RexConfig;
use rex_core::repo;
use rex_core::versions;

use super::parse_package_versions;

/// Check out the versions repository, splice the versions table into its
/// README, and publish the update per the config flags.
pub fn run_update_readme(cfg: &RexConfig, packages: &[String]) -> Result<()> {
    let parsed = parse_package_versions(packages)?;

    let repo = repo::setup_versions_repository(cfg)?;
    versions::update_versions_in_readme(&repo, &parsed)?;
    tracing::info!(
        "updated versions table in {}",
        repo.path().join("README.md").display()
    );

    repo::publish_updates(cfg, &repo, "Update README versions table")?;
    Ok(())
}
