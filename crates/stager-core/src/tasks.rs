//! Idempotent download-task submission.
//!
//! Re-running a whole staging pass against a domain that already has pending
//! or queued tasks must never duplicate work, so submission is always gated
//! on an exact-filename lookup of the domain's existing task list.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::session::ManagementSession;

/// Transfer protocols the management layer accepts for download tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferProtocol {
    Ftp,
    Tftp,
    Sftp,
    Scp,
    Http,
}

impl TransferProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ftp => "ftp",
            Self::Tftp => "tftp",
            Self::Sftp => "sftp",
            Self::Scp => "scp",
            Self::Http => "http",
        }
    }

    pub const ALL: [TransferProtocol; 5] = [
        TransferProtocol::Ftp,
        TransferProtocol::Tftp,
        TransferProtocol::Sftp,
        TransferProtocol::Scp,
        TransferProtocol::Http,
    ];
}

/// Where download tasks fetch bundles from. Shared by every task of a run.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub protocol: TransferProtocol,
    pub server: String,
    pub remote_path: String,
    pub username: String,
    pub password: String,
}

impl TransferConfig {
    /// Build the task record for one bundle filename.
    pub fn task_for(&self, filename: &str) -> DownloadTask {
        DownloadTask {
            filename: filename.to_string(),
            protocol: self.protocol,
            remote_path: self.remote_path.clone(),
            server: self.server.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// One "fetch this file" request handed to the management endpoint.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub filename: String,
    pub protocol: TransferProtocol,
    pub remote_path: String,
    pub server: String,
    pub username: String,
    pub password: String,
}

/// Result of an idempotent submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// A new download task was created.
    Submitted,
    /// An equivalent task already existed; nothing was created.
    SkippedExisting,
}

/// Submit a download task for `filename` unless one already exists.
///
/// The existence check matches on exact filename. Submission itself is
/// delegated to the session; this function's responsibility ends at deciding
/// whether to call it.
pub fn ensure_submitted(
    session: &dyn ManagementSession,
    filename: &str,
    transfer: &TransferConfig,
) -> Result<TaskOutcome> {
    let exists = session
        .download_task_exists(filename)
        .with_context(|| format!("failed to query existing download tasks for '{filename}'"))?;

    if exists {
        debug!(filename, "download task already present, skipping submission");
        return Ok(TaskOutcome::SkippedExisting);
    }

    session
        .submit_download_task(&transfer.task_for(filename))
        .with_context(|| format!("failed to submit download task for '{filename}'"))?;
    debug!(filename, "download task submitted");
    Ok(TaskOutcome::Submitted)
}
