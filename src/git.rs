//! Git context for the status line

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound for each git invocation
const GIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs git in `dir` and returns its trimmed stdout on success
async fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .kill_on_drop(true)
        .output();

    match timeout(GIT_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!(error = %e, "git could not be run");
            None
        }
        Err(_) => {
            debug!(?args, "git timed out");
            None
        }
    }
}

/// Current branch name, or `None` outside a repository or on a detached HEAD
pub async fn current_branch(dir: &Path) -> Option<String> {
    run_git(dir, &["branch", "--show-current"])
        .await
        .filter(|branch| !branch.is_empty())
}

/// Number of changed or untracked files in the working tree
pub async fn modified_files_count(dir: &Path) -> usize {
    run_git(dir, &["status", "--porcelain"])
        .await
        .map(|status| count_porcelain_entries(&status))
        .unwrap_or(0)
}

/// Counts the non-empty lines of `git status --porcelain` output
fn count_porcelain_entries(status: &str) -> usize {
    status.lines().filter(|line| !line.trim().is_empty()).count()
}
