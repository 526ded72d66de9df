//! Release-package (metapackage) update workflow.
//!
//! Rewrites the metapackage's YAML install-dependency list and its RPM
//! spec file (version tag, milestone macro, dependency lines) from a
//! completed versions-repository checkout. Pure text manipulation, in the
//! same register as [`crate::versions::replace_file_section`]; repository
//! handling and publication live in [`crate::repo`].

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::repo::GitRepository;
use crate::versions::{read_version_and_milestone, replace_file_section, PackageVersion};

/// Start of the install-dependency block in the metapackage YAML file.
/// The block runs to the end of the file.
const YAML_DEPENDENCIES_DELIMITER: &str = "    install_dependencies:";

/// Render the YAML install-dependency block for the given packages.
pub fn render_install_dependencies(packages: &[PackageVersion]) -> String {
    let mut block = format!("{YAML_DEPENDENCIES_DELIMITER}\n");
    for package in packages {
        block.push_str(&format!("     - {}\n", package.name));
    }
    block
}

/// Rewrite `Requires(post): <name> = <version>` lines in a spec file.
///
/// Lines whose package name appears in `packages` get the new version;
/// dependency lines for unknown packages and all other lines are kept
/// as-is. The file is only rewritten when at least one line changed.
pub fn replace_spec_dependencies(
    spec_path: &Path,
    packages: &[PackageVersion],
) -> Result<()> {
    let dependency_re = Regex::new(r"^Requires\(post\): (?P<name>\S+) = \S+")?;
    let text = fs::read_to_string(spec_path)
        .with_context(|| format!("reading {}", spec_path.display()))?;

    let mut out = String::with_capacity(text.len());
    let mut updated = false;
    for line in text.split_inclusive('\n') {
        let rewritten = dependency_re.captures(line).and_then(|caps| {
            let name = &caps["name"];
            packages.iter().find(|p| p.name == name).map(|p| {
                tracing::debug!(name, version = %p.version, "updating dependency line");
                format!("Requires(post): {} = {}\n", p.name, p.version)
            })
        });
        match rewritten {
            Some(new_line) => {
                updated = true;
                out.push_str(&new_line);
            }
            None => out.push_str(line),
        }
    }

    if updated {
        fs::write(spec_path, out)
            .with_context(|| format!("writing {}", spec_path.display()))?;
    }
    Ok(())
}

/// Point the spec's `Version:` tag at `version`, preserving alignment.
pub fn update_spec_version(spec_path: &Path, version: &str) -> Result<()> {
    let re = Regex::new(r"^(?P<prefix>Version:\s*)\S+")?;
    rewrite_matching_lines(spec_path, &re, version)
}

/// Replace the value of a `%define <name> <value>` macro.
pub fn replace_macro_definition(spec_path: &Path, name: &str, value: &str) -> Result<()> {
    let re = Regex::new(&format!(
        r"^(?P<prefix>%define\s+{}\s+)\S+",
        regex::escape(name)
    ))?;
    rewrite_matching_lines(spec_path, &re, value)
}

fn rewrite_matching_lines(path: &Path, re: &Regex, value: &str) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        match re.captures(line) {
            Some(caps) => {
                out.push_str(&caps["prefix"]);
                out.push_str(value);
                out.push('\n');
            }
            None => out.push_str(line),
        }
    }

    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

/// Update the metapackage from NAME=VERSION pairs.
///
/// Rewrites the YAML install-dependency list, points the spec's version
/// at the checkout's `VERSION` file (milestone suffix feeds the
/// `milestone` macro, `%nil` when absent), and updates the spec's
/// dependency lines.
pub fn update_metapackage(
    repo: &GitRepository,
    metapackage_name: &str,
    packages: &[PackageVersion],
) -> Result<()> {
    tracing::info!(
        "updating release package dependencies: {}",
        packages
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let package_dir = repo.path().join(metapackage_name);
    let yaml_path = package_dir.join(format!("{metapackage_name}.yaml"));
    replace_file_section(
        &yaml_path,
        &render_install_dependencies(packages),
        YAML_DEPENDENCIES_DELIMITER,
        None,
    )?;

    let version_milestone = read_version_and_milestone(repo)?;
    if version_milestone.is_empty() {
        bail!("VERSION file has no version entry");
    }
    let (version, milestone) = match version_milestone.split_once('-') {
        Some((version, milestone)) => (version.to_string(), milestone.to_string()),
        None => (version_milestone, "%nil".to_string()),
    };

    let spec_path = package_dir.join(format!("{metapackage_name}.spec"));
    update_spec_version(&spec_path, &version)?;
    replace_macro_definition(&spec_path, "milestone", &milestone)?;
    replace_spec_dependencies(&spec_path, packages)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, version: &str) -> PackageVersion {
        PackageVersion {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Checkout-shaped directory without a git binary: clone_or_open only
    /// probes for `.git`.
    fn fake_checkout() -> (tempfile::TempDir, GitRepository) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let repo = GitRepository::clone_or_open("unused", dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn renders_dependency_block_with_delimiter_header() {
        let block = render_install_dependencies(&[pkg("kernel", "6.8.1"), pkg("qemu", "8.2.0")]);
        assert_eq!(
            block,
            "    install_dependencies:\n     - kernel\n     - qemu\n"
        );
    }

    #[test]
    fn rewrites_known_dependency_lines_and_keeps_unknown_ones() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("release.spec");
        fs::write(
            &spec,
            "Name: release\n\
             Requires(post): kernel = 6.0.0\n\
             Requires(post): other = 1.0.0\n\
             %description\n",
        )
        .unwrap();

        replace_spec_dependencies(&spec, &[pkg("kernel", "6.8.1")]).unwrap();

        let got = fs::read_to_string(&spec).unwrap();
        assert!(got.contains("Requires(post): kernel = 6.8.1\n"));
        assert!(got.contains("Requires(post): other = 1.0.0\n"));
        assert!(got.contains("Name: release\n"));
    }

    #[test]
    fn spec_without_dependency_lines_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("release.spec");
        let original = "Name: release\n%description\n";
        fs::write(&spec, original).unwrap();

        replace_spec_dependencies(&spec, &[pkg("kernel", "6.8.1")]).unwrap();

        assert_eq!(fs::read_to_string(&spec).unwrap(), original);
    }

    #[test]
    fn version_tag_update_preserves_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("release.spec");
        fs::write(&spec, "Name: release\nVersion:        1.0\nRelease: 1\n").unwrap();

        update_spec_version(&spec, "2.0").unwrap();

        let got = fs::read_to_string(&spec).unwrap();
        assert!(got.contains("Version:        2.0\n"));
        assert!(got.contains("Release: 1\n"));
    }

    #[test]
    fn macro_definition_value_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("release.spec");
        fs::write(&spec, "%define milestone alpha\n%define other x\n").unwrap();

        replace_macro_definition(&spec, "milestone", "beta").unwrap();

        let got = fs::read_to_string(&spec).unwrap();
        assert!(got.contains("%define milestone beta\n"));
        assert!(got.contains("%define other x\n"));
    }

    #[test]
    fn full_update_rewrites_yaml_and_spec_from_version_file() {
        let (dir, repo) = fake_checkout();
        let package_dir = dir.path().join("release");
        fs::create_dir(&package_dir).unwrap();
        fs::write(
            dir.path().join("VERSION"),
            "# file format: 1\n3.0-beta\n",
        )
        .unwrap();
        fs::write(
            package_dir.join("release.yaml"),
            "release:\n    install_dependencies:\n     - stale\n",
        )
        .unwrap();
        fs::write(
            package_dir.join("release.spec"),
            "Name: release\n\
             Version: 1.0\n\
             %define milestone alpha\n\
             Requires(post): kernel = 6.0.0\n",
        )
        .unwrap();

        update_metapackage(&repo, "release", &[pkg("kernel", "6.8.1")]).unwrap();

        let yaml = fs::read_to_string(package_dir.join("release.yaml")).unwrap();
        assert_eq!(
            yaml,
            "release:\n    install_dependencies:\n     - kernel\n"
        );

        let spec = fs::read_to_string(package_dir.join("release.spec")).unwrap();
        assert!(spec.contains("Version: 3.0\n"));
        assert!(spec.contains("%define milestone beta\n"));
        assert!(spec.contains("Requires(post): kernel = 6.8.1\n"));
    }

    #[test]
    fn version_without_milestone_suffix_uses_nil_macro() {
        let (dir, repo) = fake_checkout();
        let package_dir = dir.path().join("release");
        fs::create_dir(&package_dir).unwrap();
        fs::write(dir.path().join("VERSION"), "# file format: 1\n3.0\n").unwrap();
        fs::write(
            package_dir.join("release.yaml"),
            "release:\n    install_dependencies:\n",
        )
        .unwrap();
        fs::write(
            package_dir.join("release.spec"),
            "Version: 1.0\n%define milestone alpha\n",
        )
        .unwrap();

        update_metapackage(&repo, "release", &[]).unwrap();

        let spec = fs::read_to_string(package_dir.join("release.spec")).unwrap();
        assert!(spec.contains("Version: 3.0\n"));
        assert!(spec.contains("%define milestone %nil\n"));
    }
}
