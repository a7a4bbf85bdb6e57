//! Repository provisioning
//!
//! Gets a working tree onto disk: `git clone` into `<parent>/<name>` the first
//! time, `git pull` inside it afterwards. Runs the external `git` binary
//! without a shell, with stdin closed and output captured.

use sdk::errors::EngineError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("git is not installed. Install git to load repositories")]
    GitNotFound,

    #[error("Refusing repository URL that looks like an option: {0}")]
    OptionLikeArgument(String),

    #[error("git {action} failed: {stderr}")]
    Failed { action: &'static str, stderr: String },

    #[error("Failed to run git: {0}")]
    ExecutionFailed(#[from] std::io::Error),
}

impl From<CommandError> for EngineError {
    fn from(err: CommandError) -> Self {
        EngineError::Provisioning(crate::secrets::scrub(&err.to_string()))
    }
}

/// Directory name for a clone: last URL segment without a trailing `.git`
pub fn repo_name(url: &str) -> Result<String, EngineError> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);

    if name.is_empty() || name == "." || name == ".." {
        return Err(EngineError::Provisioning(format!(
            "Cannot derive a repository name from '{}'",
            url
        )));
    }
    Ok(name.to_string())
}

async fn run_git(action: &'static str, args: &[&str], cwd: Option<&Path>) -> Result<(), CommandError> {
    let mut command = Command::new("git");
    command
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CommandError::GitNotFound
        } else {
            CommandError::ExecutionFailed(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(CommandError::Failed { action, stderr });
    }
    Ok(())
}

/// Clone `url` into `parent_dir/<name>`, or pull if that directory is already
/// a checkout. Creates `parent_dir` when missing. Returns the working tree path.
///
/// An existing destination without its own `.git` is refused; running
/// `git pull` there would act on whatever repository encloses it.
pub async fn provision(url: &str, parent_dir: &Path) -> Result<PathBuf, EngineError> {
    let url = url.trim();
    if url.starts_with('-') {
        return Err(CommandError::OptionLikeArgument(url.to_string()).into());
    }

    let dest = parent_dir.join(repo_name(url)?);

    if dest.exists() {
        if !dest.join(".git").exists() {
            return Err(EngineError::Provisioning(format!(
                "{} exists but is not a git repository",
                dest.display()
            )));
        }
        tracing::info!("Repository already exists at {}. Pulling latest changes", dest.display());
        run_git("pull", &["pull"], Some(&dest)).await?;
    } else {
        tokio::fs::create_dir_all(parent_dir).await.map_err(|e| {
            EngineError::Provisioning(format!(
                "Failed to create clone directory {}: {}",
                parent_dir.display(),
                e
            ))
        })?;

        tracing::info!("Cloning {} into {}", url, dest.display());
        let dest_arg = dest.to_string_lossy();
        run_git("clone", &["clone", "--", url, dest_arg.as_ref()], None).await?;
    }

    tracing::info!("Repository ready at {}", dest.display());
    Ok(dest)
}

/// Use an existing checkout without running git
pub fn resolve_local(path: &Path) -> Result<PathBuf, EngineError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| EngineError::PathCanonicalization(path.to_path_buf(), e.to_string()))?;

    if !canonical.is_dir() {
        return Err(EngineError::NotADirectory(canonical));
    }
    Ok(canonical)
}
