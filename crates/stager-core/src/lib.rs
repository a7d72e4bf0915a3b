//! Stager Core Library
//!
//! Domain logic for staging firmware bundles across a fleet of managed
//! hardware domains: the version-current gate, per-family bundle selection,
//! idempotent download-task submission, and per-target result reporting.
//!
//! The transport/session layer and the remote task-execution engine are
//! external collaborators reached only through the [`session`] traits.

pub mod catalog;
pub mod fleet;
pub mod report;
pub mod session;
pub mod stage;
pub mod tasks;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Version gate
    pub use crate::version::{VersionError, VersionSpec};

    // Catalog
    pub use crate::catalog::{
        BundleKind, BundleRequest, BundleSelection, CatalogError, HardwareFamily, required_bundles,
    };

    // Collaborator seam
    pub use crate::session::{Credentials, ManagementSession, ManagementTransport};

    // Tasks
    pub use crate::tasks::{
        DownloadTask, TaskOutcome, TransferConfig, TransferProtocol, ensure_submitted,
    };

    // Orchestration
    pub use crate::stage::{CurrentVersionPolicy, FleetRunner, StageOptions, TargetProcessor};

    // Reporting
    pub use crate::report::{BundleOutcome, BundleReport, FleetReport, TargetResult};
}
