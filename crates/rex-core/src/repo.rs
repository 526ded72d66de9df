//! Git repository checkout helper built on the command executor.
//!
//! Provides clone-or-open plus branch checkout for the packages metadata
//! repository. The helper itself never retries; callers wrap the flaky
//! steps (cloning over the network) with [`crate::retry`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::RexConfig;
use crate::exec::{self, CommandLine, ExecError, ExecOptions};
use crate::retry::retry_on_error;

/// Failure of a repository operation.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("git operation failed: {0}")]
    Git(#[from] ExecError),
    #[error("no versions repository URL configured")]
    MissingUrl,
    #[error("required parameter missing: {0}")]
    MissingParameter(&'static str),
}

/// Handle to a local git checkout.
#[derive(Debug)]
pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    /// Clone `url` into `path`, or open the existing checkout when the
    /// directory already holds one.
    pub fn clone_or_open(url: &str, path: &Path) -> Result<Self, RepoError> {
        if path.join(".git").exists() {
            tracing::debug!(path = %path.display(), "opening existing repository");
        } else {
            tracing::info!(url, path = %path.display(), "cloning repository");
            git(&["clone", url, &path.to_string_lossy()], None)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Root of the working tree.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check out a branch (or any committish).
    pub fn checkout(&self, branch: &str) -> Result<(), RepoError> {
        git(&["checkout", branch], Some(&self.path))?;
        Ok(())
    }

    /// Stage all changes and commit them with the given author identity.
    pub fn commit_changes(
        &self,
        message: &str,
        user_name: &str,
        user_email: &str,
    ) -> Result<(), RepoError> {
        git(&["add", "--all"], Some(&self.path))?;
        git(
            &[
                "-c",
                &format!("user.name={user_name}"),
                "-c",
                &format!("user.email={user_email}"),
                "commit",
                "-m",
                message,
            ],
            Some(&self.path),
        )?;
        Ok(())
    }

    /// Push the current HEAD to `branch` on the given remote.
    pub fn push_head(&self, remote_url: &str, branch: &str) -> Result<(), RepoError> {
        git(
            &["push", remote_url, &format!("HEAD:{branch}")],
            Some(&self.path),
        )?;
        Ok(())
    }
}

fn git(args: &[&str], cwd: Option<&Path>) -> Result<exec::Output, ExecError> {
    let mut argv = vec!["git".to_string()];
    argv.extend(args.iter().map(|s| s.to_string()));
    let opts = ExecOptions {
        cwd: cwd.map(Path::to_path_buf),
        ..ExecOptions::default()
    };
    exec::run_command(&CommandLine::Args(argv), &opts)
}

/// Directory name for a checkout, derived from the repository URL.
fn repo_dir_name(url: &str) -> String {
    let name = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim_end_matches(".git");
    if name.is_empty() {
        "repository".to_string()
    } else {
        name.to_string()
    }
}

/// Clone-or-open the packages metadata repository under the configured
/// work dir and check out the configured branch.
///
/// The clone-or-open step is wrapped with the bounded retry policy:
/// network clones are the canonical flaky operation in this toolkit.
pub fn setup_versions_repository(cfg: &RexConfig) -> Result<GitRepository, RepoError> {
    if cfg.versions_repo_url.is_empty() {
        return Err(RepoError::MissingUrl);
    }

    let path = cfg
        .work_dir
        .join("repositories")
        .join(repo_dir_name(&cfg.versions_repo_url));

    let repo = retry_on_error(&cfg.retry_policy(), || {
        GitRepository::clone_or_open(&cfg.versions_repo_url, &path)
    })?;

    repo.checkout(&cfg.versions_repo_branch).map_err(|e| {
        tracing::error!("failed to checkout versions repository");
        e
    })?;

    Ok(repo)
}

/// Commit pending updates in the checkout and push them, as the config
/// flags dictate.
///
/// A no-op when `commit_updates` is off. Committing requires the updater
/// identity; pushing additionally requires the push repository URL.
pub fn publish_updates(
    cfg: &RexConfig,
    repo: &GitRepository,
    message: &str,
) -> Result<(), RepoError> {
    if !cfg.commit_updates {
        return Ok(());
    }

    // Validate everything up front, before touching the repository.
    let name = cfg
        .updater_name
        .as_deref()
        .ok_or(RepoError::MissingParameter("updater_name"))?;
    let email = cfg
        .updater_email
        .as_deref()
        .ok_or(RepoError::MissingParameter("updater_email"))?;
    let push_url = if cfg.push_updates {
        Some(
            cfg.push_repo_url
                .as_deref()
                .ok_or(RepoError::MissingParameter("push_repo_url"))?,
        )
    } else {
        None
    };

    repo.commit_changes(message, name, email)?;

    if let Some(url) = push_url {
        tracing::info!(url, branch = %cfg.push_repo_branch, "pushing updates");
        repo.push_head(url, &cfg.push_repo_branch)?;
    }

    Ok(())
}
