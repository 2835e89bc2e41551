// src/vcs/git.rs

//! `git` command-line backed change source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::vcs::{ChangeSet, ChangeSource, FileDiff};

/// Reads commits by running `git` inside a working copy.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl AsRef<Path>) -> Self {
        Self {
            repo_dir: repo_dir.as_ref().to_path_buf(),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        log::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .await
            .map_err(|e| AppError::vcs(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(AppError::vcs(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| AppError::vcs(format!("git output is not valid UTF-8: {e}")))
    }
}

#[async_trait]
impl ChangeSource for GitCli {
    async fn change_set(&self, commit: &str) -> Result<ChangeSet> {
        let parent = format!("{commit}^");
        let message = self.git(&["log", "-1", "--format=%B", commit]).await?;
        let name_status = self
            .git(&diff_args(&["--name-status", &parent, commit]))
            .await?;

        let mut files = Vec::new();
        for (old_path, new_path) in parse_name_status(&name_status) {
            let patch = {
                let mut args = diff_args(&[parent.as_str(), commit, "--"]);
                args.extend(old_path.as_deref());
                if new_path != old_path {
                    args.extend(new_path.as_deref());
                }
                self.git(&args).await?
            };
            files.push(FileDiff {
                old_path,
                new_path,
                patch,
            });
        }

        Ok(ChangeSet {
            commit: commit.to_string(),
            message,
            files,
        })
    }

    async fn file_at(&self, commit: &str, path: &str) -> Result<String> {
        self.git(&["show", &format!("{commit}:{path}")]).await
    }
}

/// `git diff` with rename detection, immune to user color and external
/// diff settings that would change the patch text.
fn diff_args<'a>(rest: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["diff", "--no-color", "--no-ext-diff", "-M"];
    args.extend_from_slice(rest);
    args
}

/// Parse `git diff --name-status` output into (old, new) path pairs.
fn parse_name_status(output: &str) -> Vec<(Option<String>, Option<String>)> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?.chars().next()?;
            let first = fields.next()?.to_string();
            match status {
                'A' => Some((None, Some(first))),
                'D' => Some((Some(first), None)),
                'R' | 'C' => {
                    let second = fields.next()?.to_string();
                    Some((Some(first), Some(second)))
                }
                _ => Some((Some(first.clone()), Some(first))),
            }
        })
        .collect()
}
