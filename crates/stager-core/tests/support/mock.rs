//! In-memory management transport double for orchestration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, bail};

use stager_core::session::{Credentials, ManagementSession, ManagementTransport};
use stager_core::stage::StageOptions;
use stager_core::tasks::{DownloadTask, TransferConfig, TransferProtocol};
use stager_core::version::VersionSpec;

/// Simulated state of one managed domain.
#[derive(Debug, Clone)]
pub struct DomainState {
    pub version: String,
    pub family_code: u32,
    pub tasks: Vec<String>,
    pub reachable: bool,
    pub fail_version_query: bool,
    pub reject_filename: Option<String>,
}

impl DomainState {
    pub fn new(version: &str, family_code: u32) -> Self {
        Self {
            version: version.to_string(),
            family_code,
            tasks: Vec::new(),
            reachable: true,
            fail_version_query: false,
            reject_filename: None,
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn with_existing_task(mut self, filename: &str) -> Self {
        self.tasks.push(filename.to_string());
        self
    }

    pub fn rejecting(mut self, filename: &str) -> Self {
        self.reject_filename = Some(filename.to_string());
        self
    }

    pub fn failing_version_query(mut self) -> Self {
        self.fail_version_query = true;
        self
    }
}

/// Counters and records of collaborator calls across a whole run.
#[derive(Debug, Default)]
pub struct CallLog {
    pub connects: usize,
    pub disconnects: usize,
    pub version_queries: usize,
    pub family_queries: usize,
    /// (address, filename) per created task, in submission order.
    pub submissions: Vec<(String, String)>,
}

pub struct MockTransport {
    domains: Rc<RefCell<HashMap<String, DomainState>>>,
    log: Rc<RefCell<CallLog>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            domains: Rc::new(RefCell::new(HashMap::new())),
            log: Rc::new(RefCell::new(CallLog::default())),
        }
    }

    pub fn with_domain(self, address: &str, state: DomainState) -> Self {
        self.domains
            .borrow_mut()
            .insert(address.to_string(), state);
        self
    }

    pub fn log(&self) -> Rc<RefCell<CallLog>> {
        Rc::clone(&self.log)
    }

    pub fn domains(&self) -> Rc<RefCell<HashMap<String, DomainState>>> {
        Rc::clone(&self.domains)
    }
}

impl ManagementTransport for MockTransport {
    fn connect(&self, address: &str, _credentials: &Credentials) -> Result<Box<dyn ManagementSession>> {
        self.log.borrow_mut().connects += 1;

        let reachable = self
            .domains
            .borrow()
            .get(address)
            .map(|domain| domain.reachable);
        match reachable {
            None => bail!("{address}: no route to host"),
            Some(false) => bail!("{address}: connection refused"),
            Some(true) => Ok(Box::new(MockSession {
                address: address.to_string(),
                domains: Rc::clone(&self.domains),
                log: Rc::clone(&self.log),
            })),
        }
    }
}

struct MockSession {
    address: String,
    domains: Rc<RefCell<HashMap<String, DomainState>>>,
    log: Rc<RefCell<CallLog>>,
}

impl MockSession {
    fn with_domain<T>(&self, f: impl FnOnce(&mut DomainState) -> T) -> T {
        let mut domains = self.domains.borrow_mut();
        let domain = domains
            .get_mut(&self.address)
            .expect("session for unknown domain");
        f(domain)
    }
}

impl ManagementSession for MockSession {
    fn reported_version(&self) -> Result<String> {
        self.log.borrow_mut().version_queries += 1;
        self.with_domain(|domain| {
            if domain.fail_version_query {
                bail!("management query timed out")
            }
            Ok(domain.version.clone())
        })
    }

    fn hardware_family_code(&self) -> Result<u32> {
        self.log.borrow_mut().family_queries += 1;
        Ok(self.with_domain(|domain| domain.family_code))
    }

    fn download_task_exists(&self, filename: &str) -> Result<bool> {
        Ok(self.with_domain(|domain| domain.tasks.iter().any(|task| task == filename)))
    }

    fn submit_download_task(&self, task: &DownloadTask) -> Result<()> {
        let rejected = self.with_domain(|domain| {
            if domain.reject_filename.as_deref() == Some(task.filename.as_str()) {
                return true;
            }
            domain.tasks.push(task.filename.clone());
            false
        });
        if rejected {
            bail!("endpoint rejected download task '{}'", task.filename);
        }
        self.log
            .borrow_mut()
            .submissions
            .push((self.address.clone(), task.filename.clone()));
        Ok(())
    }

    fn disconnect(self: Box<Self>) {
        self.log.borrow_mut().disconnects += 1;
    }
}

/// Stage options with a throwaway transfer config, suitable for most tests.
pub fn stage_options(version: &str) -> StageOptions {
    StageOptions::new(
        VersionSpec::parse(version).unwrap(),
        TransferConfig {
            protocol: TransferProtocol::Scp,
            server: "fw.example.net".to_string(),
            remote_path: "/firmware".to_string(),
            username: "svc-fw".to_string(),
            password: "transfer-pw".to_string(),
        },
        Credentials::new("admin", "admin-pw"),
    )
}
