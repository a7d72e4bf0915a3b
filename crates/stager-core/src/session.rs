//! Capability interface to the external management layer.
//!
//! The core never opens connections itself. Everything it needs from a
//! managed domain goes through these traits, and a session handle is an
//! explicit value owned by the caller for the duration of one target's
//! processing. There is no process-wide "currently connected" state.

use std::fmt;

use anyhow::Result;

use crate::tasks::DownloadTask;

/// Credentials used to authenticate to a managed domain. Shared read-only
/// across all targets of a run.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session with one managed domain.
///
/// All calls are blocking and synchronous from the core's perspective.
/// `disconnect` consumes the session, so release happens exactly once.
pub trait ManagementSession {
    /// Firmware version the domain reports, in display notation
    /// (e.g. `4.1(3b)`).
    fn reported_version(&self) -> Result<String>;

    /// Raw hardware family code of the domain's controller.
    fn hardware_family_code(&self) -> Result<u32>;

    /// Whether a download task matching `filename` exactly already exists.
    fn download_task_exists(&self, filename: &str) -> Result<bool>;

    /// Create a new download task on the domain.
    fn submit_download_task(&self, task: &DownloadTask) -> Result<()>;

    /// Release the session.
    fn disconnect(self: Box<Self>);
}

impl fmt::Debug for dyn ManagementSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ManagementSession")
    }
}

/// Factory for sessions. Real implementations (the transport protocol, the
/// task-execution engine) live outside this crate; the bundled simulation
/// driver and the test doubles implement the same seam.
pub trait ManagementTransport {
    fn connect(&self, address: &str, credentials: &Credentials) -> Result<Box<dyn ManagementSession>>;
}
