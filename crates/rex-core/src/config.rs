use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{RetryPolicy, TimeoutPolicy};

/// Bounded retry parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Flat delay between attempts, in seconds.
    pub delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay_secs: 5,
        }
    }
}

/// Timeout escalation parameters (optional `[timeout]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Flat delay between attempts, in seconds.
    pub delay_secs: u64,
    /// Timeout of the first attempt, in seconds. Doubled on each retry.
    pub initial_timeout_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay_secs: 5,
            initial_timeout_secs: 120,
        }
    }
}

/// Global configuration loaded from `~/.config/rex/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RexConfig {
    /// Directory for repository checkouts and other working state.
    pub work_dir: PathBuf,
    /// Packages metadata git repository URL.
    pub versions_repo_url: String,
    /// Branch of the packages metadata repository to check out.
    pub versions_repo_branch: String,
    /// HTTP proxy handed to spawned commands. Per-call injection only;
    /// the rex process environment is never mutated.
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// Commit README/metapackage updates to the local checkout.
    #[serde(default)]
    pub commit_updates: bool,
    /// Push committed updates to `push_repo_url`. Requires
    /// `commit_updates` and a configured push target.
    #[serde(default)]
    pub push_updates: bool,
    /// Repository URL used for pushing updates.
    #[serde(default)]
    pub push_repo_url: Option<String>,
    /// Branch pushed to on the push repository.
    #[serde(default = "default_push_branch")]
    pub push_repo_branch: String,
    /// Author name for update commits.
    #[serde(default)]
    pub updater_name: Option<String>,
    /// Author email for update commits.
    #[serde(default)]
    pub updater_email: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
    /// Optional timeout escalation policy; if missing, built-in defaults
    /// are used.
    #[serde(default)]
    pub timeout: Option<TimeoutSettings>,
}

impl Default for RexConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("workspace"),
            versions_repo_url: String::new(),
            versions_repo_branch: "master".to_string(),
            http_proxy: None,
            commit_updates: false,
            push_updates: false,
            push_repo_url: None,
            push_repo_branch: default_push_branch(),
            updater_name: None,
            updater_email: None,
            retry: None,
            timeout: None,
        }
    }
}

fn default_push_branch() -> String {
    "master".to_string()
}

impl RexConfig {
    /// Effective bounded-retry policy: config override or built-in defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        match &self.retry {
            Some(r) => RetryPolicy {
                max_retries: r.max_retries,
                delay_between: Duration::from_secs(r.delay_secs),
            },
            None => RetryPolicy::default(),
        }
    }

    /// Effective timeout-escalation policy: config override or built-in
    /// defaults.
    pub fn timeout_policy(&self) -> TimeoutPolicy {
        match &self.timeout {
            Some(t) => TimeoutPolicy {
                max_retries: t.max_retries,
                delay_between: Duration::from_secs(t.delay_secs),
                initial_timeout: Duration::from_secs(t.initial_timeout_secs),
            },
            None => TimeoutPolicy::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rex")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RexConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RexConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RexConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RexConfig::default();
        assert_eq!(cfg.work_dir, PathBuf::from("workspace"));
        assert_eq!(cfg.versions_repo_branch, "master");
        assert!(cfg.http_proxy.is_none());
        assert!(cfg.retry.is_none());
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RexConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RexConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.work_dir, cfg.work_dir);
        assert_eq!(parsed.versions_repo_branch, cfg.versions_repo_branch);
    }

    #[test]
    fn missing_sections_fall_back_to_builtin_policies() {
        let toml = r#"
            work_dir = "/tmp/rex"
            versions_repo_url = "https://example.com/versions.git"
            versions_repo_branch = "main"
        "#;
        let cfg: RexConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
        assert_eq!(cfg.timeout_policy(), TimeoutPolicy::default());
    }

    #[test]
    fn publication_flags_default_to_off() {
        let toml = r#"
            work_dir = "workspace"
            versions_repo_url = "https://example.com/versions.git"
            versions_repo_branch = "master"
        "#;
        let cfg: RexConfig = toml::from_str(toml).unwrap();
        assert!(!cfg.commit_updates);
        assert!(!cfg.push_updates);
        assert_eq!(cfg.push_repo_branch, "master");
        assert!(cfg.updater_name.is_none());
    }

    #[test]
    fn publication_settings_are_parsed() {
        let toml = r#"
            work_dir = "workspace"
            versions_repo_url = "https://example.com/versions.git"
            versions_repo_branch = "master"
            commit_updates = true
            push_updates = true
            push_repo_url = "https://example.com/push.git"
            push_repo_branch = "main"
            updater_name = "Build Bot"
            updater_email = "bot@example.com"
        "#;
        let cfg: RexConfig = toml::from_str(toml).unwrap();
        assert!(cfg.commit_updates);
        assert!(cfg.push_updates);
        assert_eq!(cfg.push_repo_url.as_deref(), Some("https://example.com/push.git"));
        assert_eq!(cfg.push_repo_branch, "main");
        assert_eq!(cfg.updater_name.as_deref(), Some("Build Bot"));
        assert_eq!(cfg.updater_email.as_deref(), Some("bot@example.com"));
    }

    #[test]
    fn config_toml_retry_and_timeout_sections() {
        let toml = r#"
            work_dir = "workspace"
            versions_repo_url = "https://example.com/versions.git"
            versions_repo_branch = "master"
            http_proxy = "http://proxy:3128"

            [retry]
            max_retries = 4
            delay_secs = 1

            [timeout]
            max_retries = 1
            delay_secs = 2
            initial_timeout_secs = 60
        "#;
        let cfg: RexConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.http_proxy.as_deref(), Some("http://proxy:3128"));

        let retry = cfg.retry_policy();
        assert_eq!(retry.max_retries, 4);
        assert_eq!(retry.delay_between, Duration::from_secs(1));

        let timeout = cfg.timeout_policy();
        assert_eq!(timeout.max_retries, 1);
        assert_eq!(timeout.delay_between, Duration::from_secs(2));
        assert_eq!(timeout.initial_timeout, Duration::from_secs(60));
    }
}
