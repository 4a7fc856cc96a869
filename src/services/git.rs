//! Commit and push of the output directory
//!
//! Shells out to the system `git`. A failed commit (usually "nothing to commit") is
//! logged and tolerated; a failed push is an error.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{PublishError, Result};
use crate::models::WorkflowRecord;

#[derive(Debug, Clone)]
pub struct GitCommitter {
    repo_dir: PathBuf,
}

/// What `commit_and_push` actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub committed: bool,
    pub pushed_branch: Option<String>,
}

impl GitCommitter {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// Repository root for an output directory: its parent, or `.` for a bare name.
    pub fn for_output_dir(output_dir: &Path) -> Self {
        let repo_dir = output_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(repo_dir)
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| PublishError::Git(format!("failed to run git {}: {e}", args.join(" "))))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(PublishError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    pub async fn current_branch(&self) -> Result<String> {
        let branch = self.git(&["branch", "--show-current"]).await?;
        if branch.is_empty() {
            return Err(PublishError::Git("detached HEAD; no branch to push".to_string()));
        }
        Ok(branch)
    }

    pub async fn commit_and_push(&self, message: &str, push: bool) -> Result<CommitOutcome> {
        self.git(&["add", "-A"]).await?;

        let committed = match self.git(&["commit", "-m", message]).await {
            Ok(_) => {
                info!("Created commit");
                true
            }
            Err(e) => {
                warn!("Commit skipped (files may be unchanged): {}", e);
                false
            }
        };

        if !push {
            return Ok(CommitOutcome {
                committed,
                pushed_branch: None,
            });
        }

        let branch = self.current_branch().await?;
        self.git(&["push", "origin", &branch]).await?;
        info!(branch = %branch, "Pushed to origin");

        Ok(CommitOutcome {
            committed,
            pushed_branch: Some(branch),
        })
    }
}

/// Commit message for a published translation.
pub fn commit_message(title: Option<&str>, workflow: Option<&WorkflowRecord>) -> String {
    match (title, workflow) {
        (Some(title), Some(record)) => format!(
            "Translate: {title}\n\n- Extracted from: {}\n- Model: {}\n- Published to Ghost",
            record.original_url, record.model_name
        ),
        (Some(title), None) => format!("Translate: {title}"),
        (None, _) => "Translate: New article published".to_string(),
    }
}
