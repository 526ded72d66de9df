//! Package version table generation and README splicing.
//!
//! Pure text manipulation over a completed repository checkout: render
//! the supported-software HTML table and splice it between delimiters in
//! the checkout's README.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::repo::GitRepository;

/// Name/version pair rendered into the README table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub name: String,
    pub version: String,
}

/// Render the supported-software versions as an HTML table.
pub fn render_version_table(packages: &[PackageVersion]) -> String {
    let mut table = String::from(
        "<table>\n<thead>\n<th>Software</th>\n<th>Version</th>\n</thead>\n<tbody>\n",
    );
    for package in packages {
        table.push_str(&format!(
            "<tr>\n<td>{}</td>\n<td>{}</td>\n</tr>\n",
            package.name, package.version
        ));
    }
    table.push_str("</tbody>\n</table>\n");
    table
}

/// Replace the delimiter-bounded region of a file with `new_contents`.
///
/// The line containing `start_delimiter` is replaced by `new_contents`;
/// subsequent lines up to and including the line containing
/// `end_delimiter` are dropped. With `end_delimiter = None` the
/// replacement extends to the end of the file. A file without the start
/// delimiter is left unchanged.
pub fn replace_file_section(
    path: &Path,
    new_contents: &str,
    start_delimiter: &str,
    end_delimiter: Option<&str>,
) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut out = String::with_capacity(text.len() + new_contents.len());
    let mut in_section = false;
    for line in text.split_inclusive('\n') {
        if in_section {
            if let Some(end) = end_delimiter {
                if line.contains(end) {
                    in_section = false;
                }
            }
        } else if line.contains(start_delimiter) {
            out.push_str(new_contents);
            match end_delimiter {
                Some(_) => in_section = true,
                None => break,
            }
        } else {
            out.push_str(line);
        }
    }

    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

/// Regenerate the versions table in the checkout's `README.md`.
pub fn update_versions_in_readme(
    repo: &GitRepository,
    packages: &[PackageVersion],
) -> Result<()> {
    tracing::info!(
        "generating versions table for packages: {}",
        packages
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let table = render_version_table(packages);
    let readme = repo.path().join("README.md");
    replace_file_section(&readme, &table, "<table>", Some("</table>"))
}

/// Read `<version>-<milestone>` from the checkout's `VERSION` file.
/// The first line carries file format information and is skipped.
pub fn read_version_and_milestone(repo: &GitRepository) -> Result<String> {
    let path = repo.path().join("VERSION");
    let text =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.lines().nth(1).unwrap_or("").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn renders_table_with_one_row_per_package() {
        let packages = vec![
            PackageVersion {
                name: "kernel".to_string(),
                version: "6.8.1".to_string(),
            },
            PackageVersion {
                name: "qemu".to_string(),
                version: "8.2.0".to_string(),
            },
        ];
        let table = render_version_table(&packages);
        assert!(table.starts_with("<table>\n"));
        assert!(table.ends_with("</table>\n"));
        assert!(table.contains("<th>Software</th>"));
        assert!(table.contains("<td>kernel</td>\n<td>6.8.1</td>"));
        assert!(table.contains("<td>qemu</td>\n<td>8.2.0</td>"));
    }

    #[test]
    fn replaces_bounded_section_keeping_surroundings() {
        let f = write_file("before\n<table>\nold row\n</table>\nafter\n");
        replace_file_section(f.path(), "NEW\n", "<table>", Some("</table>")).unwrap();
        let got = fs::read_to_string(f.path()).unwrap();
        assert_eq!(got, "before\nNEW\nafter\n");
    }

    #[test]
    fn missing_end_delimiter_replaces_to_end_of_file() {
        let f = write_file("keep\nSTART here\nbody\nmore body\n");
        replace_file_section(f.path(), "replacement\n", "START", None).unwrap();
        let got = fs::read_to_string(f.path()).unwrap();
        assert_eq!(got, "keep\nreplacement\n");
    }

    #[test]
    fn unterminated_section_drops_the_remainder() {
        let f = write_file("keep\n<table>\nrow\nno closing tag\n");
        replace_file_section(f.path(), "NEW\n", "<table>", Some("</table>")).unwrap();
        let got = fs::read_to_string(f.path()).unwrap();
        assert_eq!(got, "keep\nNEW\n");
    }

    #[test]
    fn file_without_start_delimiter_is_unchanged() {
        let original = "nothing to see\nhere\n";
        let f = write_file(original);
        replace_file_section(f.path(), "NEW\n", "<table>", Some("</table>")).unwrap();
        let got = fs::read_to_string(f.path()).unwrap();
        assert_eq!(got, original);
    }

    #[test]
    fn version_and_milestone_come_from_the_second_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let repo = GitRepository::clone_or_open("unused", dir.path()).unwrap();

        fs::write(dir.path().join("VERSION"), "# file format: 1\n2.5-alpha\n").unwrap();
        assert_eq!(read_version_and_milestone(&repo).unwrap(), "2.5-alpha");

        // A header-only file yields an empty value.
        fs::write(dir.path().join("VERSION"), "# file format: 1\n").unwrap();
        assert_eq!(read_version_and_milestone(&repo).unwrap(), "");
    }

    #[test]
    fn repeated_sections_are_each_replaced() {
        let f = write_file("<table>\na\n</table>\nmiddle\n<table>\nb\n</table>\n");
        replace_file_section(f.path(), "X\n", "<table>", Some("</table>")).unwrap();
        let got = fs::read_to_string(f.path()).unwrap();
        assert_eq!(got, "X\nmiddle\nX\n");
    }
}
