//! Simulation driver for the management transport seam.
//!
//! Real drivers (the actual transport protocol and the remote task engine)
//! live out of tree behind [`ManagementTransport`]. The bundled simulator
//! runs the whole staging pipeline against a declarative fleet-state file,
//! for rehearsal and CI:
//!
//! ```toml
//! [[domain]]
//! address = "fi-a.example.net"
//! version = "4.1(3b)"
//! family_code = 6300
//! existing_tasks = ["fw-k9-bundle-b-series.4.1.3b.B.bin"]
//!
//! [[domain]]
//! address = "fi-b.example.net"
//! version = "4.0(4c)"
//! family_code = 6400
//! unreachable = true
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use stager_core::session::{Credentials, ManagementSession, ManagementTransport};
use stager_core::tasks::DownloadTask;

#[derive(Debug, Deserialize)]
struct SimStateFile {
    #[serde(default)]
    domain: Vec<SimDomain>,
}

#[derive(Debug, Clone, Deserialize)]
struct SimDomain {
    address: String,
    /// Reported version in display notation, e.g. "4.1(3b)".
    version: String,
    family_code: u32,
    #[serde(default)]
    existing_tasks: Vec<String>,
    #[serde(default)]
    unreachable: bool,
}

pub struct SimTransport {
    domains: HashMap<String, Rc<RefCell<SimDomain>>>,
}

impl SimTransport {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation state: {}", path.display()))?;
        let state: SimStateFile = toml::from_str(&content)
            .with_context(|| format!("failed to parse simulation state: {}", path.display()))?;

        let domains = state
            .domain
            .into_iter()
            .map(|domain| (domain.address.clone(), Rc::new(RefCell::new(domain))))
            .collect();
        Ok(Self { domains })
    }
}

impl ManagementTransport for SimTransport {
    fn connect(&self, address: &str, credentials: &Credentials) -> Result<Box<dyn ManagementSession>> {
        let Some(domain) = self.domains.get(address) else {
            bail!("{address}: not present in simulation state");
        };
        if domain.borrow().unreachable {
            bail!("{address}: connection refused (simulated)");
        }
        debug!(address, user = %credentials.username, "simulated session opened");
        Ok(Box::new(SimSession {
            address: address.to_string(),
            domain: Rc::clone(domain),
        }))
    }
}

struct SimSession {
    address: String,
    domain: Rc<RefCell<SimDomain>>,
}

impl ManagementSession for SimSession {
    fn reported_version(&self) -> Result<String> {
        Ok(self.domain.borrow().version.clone())
    }

    fn hardware_family_code(&self) -> Result<u32> {
        Ok(self.domain.borrow().family_code)
    }

    fn download_task_exists(&self, filename: &str) -> Result<bool> {
        Ok(self
            .domain
            .borrow()
            .existing_tasks
            .iter()
            .any(|task| task == filename))
    }

    fn submit_download_task(&self, task: &DownloadTask) -> Result<()> {
        self.domain
            .borrow_mut()
            .existing_tasks
            .push(task.filename.clone());
        Ok(())
    }

    fn disconnect(self: Box<Self>) {
        debug!(address = %self.address, "simulated session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_state(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.toml");
        std::fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn connects_to_declared_domains_only() {
        let (_temp, path) = write_state(
            r#"
            [[domain]]
            address = "fi-a.example.net"
            version = "4.1(3b)"
            family_code = 6200
            "#,
        );
        let transport = SimTransport::from_file(&path).unwrap();
        let creds = Credentials::new("admin", "pw");

        assert!(transport.connect("fi-a.example.net", &creds).is_ok());
        assert!(transport.connect("fi-x.example.net", &creds).is_err());
    }

    #[test]
    fn unreachable_domains_refuse_connections() {
        let (_temp, path) = write_state(
            r#"
            [[domain]]
            address = "fi-b.example.net"
            version = "4.0(4c)"
            family_code = 6400
            unreachable = true
            "#,
        );
        let transport = SimTransport::from_file(&path).unwrap();
        let err = transport
            .connect("fi-b.example.net", &Credentials::new("admin", "pw"))
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn submitted_tasks_become_visible_to_existence_checks() {
        let (_temp, path) = write_state(
            r#"
            [[domain]]
            address = "fi-a.example.net"
            version = "4.0(1a)"
            family_code = 6200
            "#,
        );
        let transport = SimTransport::from_file(&path).unwrap();
        let creds = Credentials::new("admin", "pw");

        let session = transport.connect("fi-a.example.net", &creds).unwrap();
        let task = DownloadTask {
            filename: "fw-k9-bundle-infra.4.1.3b.A.bin".to_string(),
            protocol: stager_core::tasks::TransferProtocol::Scp,
            remote_path: "/firmware".to_string(),
            server: "fw.example.net".to_string(),
            username: "svc".to_string(),
            password: "pw".to_string(),
        };
        assert!(!session.download_task_exists(&task.filename).unwrap());
        session.submit_download_task(&task).unwrap();
        session.disconnect();

        // Visible on a later session as well: the state is shared per domain.
        let session = transport.connect("fi-a.example.net", &creds).unwrap();
        assert!(session.download_task_exists(&task.filename).unwrap());
        session.disconnect();
    }
}
