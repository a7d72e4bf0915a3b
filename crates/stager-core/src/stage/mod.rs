//! Fleet staging orchestration.
//!
//! [`processor`] runs the per-target phase machine; [`runner`] iterates the
//! fleet strictly sequentially with hard per-target isolation.

pub mod processor;
pub mod runner;

pub use processor::TargetProcessor;
pub use runner::FleetRunner;

use crate::catalog::BundleSelection;
use crate::session::Credentials;
use crate::tasks::TransferConfig;
use crate::version::VersionSpec;

/// What to do with B-series/C-series bundles when a target already runs the
/// requested version and no force override is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentVersionPolicy {
    /// Stage the remaining bundle kinds anyway (maximal bundle coverage).
    #[default]
    StageRemaining,
    /// Skip the whole target.
    SkipTarget,
}

/// Validated options for one staging run. Constructing these requires an
/// already-parsed [`VersionSpec`], so a malformed requested version aborts
/// before any target is contacted.
#[derive(Debug, Clone)]
pub struct StageOptions {
    pub version: VersionSpec,
    pub transfer: TransferConfig,
    pub credentials: Credentials,
    pub selection: BundleSelection,
    pub force: bool,
    pub on_current: CurrentVersionPolicy,
}

impl StageOptions {
    pub fn new(version: VersionSpec, transfer: TransferConfig, credentials: Credentials) -> Self {
        Self {
            version,
            transfer,
            credentials,
            selection: BundleSelection::default(),
            force: false,
            on_current: CurrentVersionPolicy::default(),
        }
    }

    /// Set which bundle kinds to stage.
    pub fn with_selection(mut self, selection: BundleSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Bypass the version-current gate.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the policy applied when the version-current gate trips.
    pub fn with_on_current(mut self, policy: CurrentVersionPolicy) -> Self {
        self.on_current = policy;
        self
    }
}
