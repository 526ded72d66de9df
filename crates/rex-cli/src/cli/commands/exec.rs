//! Exec command: run a shell command with bounded retries.

use anyhow::Result;
use rex_core::config::RexConfig;
use rex_core::exec::{run_command, CommandLine, ExecOptions};
use rex_core::retry::retry_on_error;

/// Run a shell command, retrying on any failure, and print its stdout.
pub fn run_exec(
    cfg: &RexConfig,
    command: &str,
    ok_codes: &[i32],
    retries: Option<u32>,
) -> Result<()> {
    let mut policy = cfg.retry_policy();
    if let Some(n) = retries {
        policy.max_retries = n;
    }

    let cmd = CommandLine::shell(command);
    let opts = ExecOptions {
        http_proxy: cfg.http_proxy.clone(),
        ok_codes: ok_codes.to_vec(),
        ..ExecOptions::default()
    };

    let out = retry_on_error(&policy, || run_command(&cmd, &opts))?;
    print!("{}", out.stdout_text());
    Ok(())
}
