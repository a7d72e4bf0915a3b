//! Per-target processing: the phase machine from connect to disconnect.
//!
//! Phases run in a fixed order: Connecting, VersionCheck, BundleResolution,
//! TaskSubmission (once per bundle), Disconnecting. A failure in any phase is
//! scoped to the narrowest thing it can be: the connection to the whole
//! target, a hardware-family problem to the infrastructure bundle, a rejected
//! submission to that one bundle. `process` never returns an error; every
//! failure lands in the [`TargetResult`].

use tracing::{debug, info, warn};

use crate::catalog::{self, BundleKind, BundleSelection, HardwareFamily};
use crate::report::{BundleOutcome, BundleReport, TargetResult};
use crate::session::{ManagementSession, ManagementTransport};
use crate::stage::{CurrentVersionPolicy, StageOptions};
use crate::tasks::{TaskOutcome, ensure_submitted};

pub struct TargetProcessor<'a> {
    transport: &'a dyn ManagementTransport,
    options: &'a StageOptions,
}

impl<'a> TargetProcessor<'a> {
    pub fn new(transport: &'a dyn ManagementTransport, options: &'a StageOptions) -> Self {
        Self { transport, options }
    }

    /// Run every phase for one target and produce its result.
    ///
    /// The session, once acquired, is released exactly once on every path
    /// out of this function.
    pub fn process(&self, address: &str) -> TargetResult {
        debug!(address, phase = "connecting", "opening management session");
        let session = match self.transport.connect(address, &self.options.credentials) {
            Ok(session) => session,
            Err(err) => {
                warn!(address, error = %format!("{err:#}"), "connection failed");
                return TargetResult::connect_failed(address, format!("{err:#}"));
            }
        };

        let result = self.process_connected(address, session.as_ref());

        debug!(address, phase = "disconnecting", "releasing management session");
        session.disconnect();
        result
    }

    fn process_connected(&self, address: &str, session: &dyn ManagementSession) -> TargetResult {
        let mut bundles: Vec<BundleReport> = Vec::new();
        let mut family: Option<HardwareFamily> = None;
        let mut stage_infra = self.options.selection.infrastructure;

        // VersionCheck only runs when the infrastructure bundle is requested.
        if stage_infra {
            debug!(address, phase = "version-check", "querying reported version");
            match session.reported_version() {
                Err(err) => {
                    bundles.push(infra_failed(format!(
                        "failed to query reported version: {err:#}"
                    )));
                    stage_infra = false;
                }
                Ok(reported) => {
                    if self.options.version.is_current(&reported) && !self.options.force {
                        info!(
                            address,
                            reported = %reported,
                            "target already runs the requested version"
                        );
                        bundles.push(BundleReport {
                            kind: BundleKind::Infrastructure,
                            filename: None,
                            outcome: BundleOutcome::SkippedVersionCurrent,
                        });
                        stage_infra = false;
                        if self.options.on_current == CurrentVersionPolicy::SkipTarget {
                            return TargetResult {
                                target: address.to_string(),
                                bundles,
                                error: None,
                            };
                        }
                    } else {
                        family = match self.resolve_family(address, session) {
                            Ok(family) => Some(family),
                            Err(reason) => {
                                bundles.push(infra_failed(reason));
                                stage_infra = false;
                                None
                            }
                        };
                    }
                }
            }
        }

        debug!(address, phase = "bundle-resolution", "computing bundle set");
        let selection = BundleSelection {
            infrastructure: stage_infra,
            ..self.options.selection
        };
        let requests = catalog::required_bundles(&selection, family, &self.options.version);

        for request in requests {
            debug!(
                address,
                phase = "task-submission",
                filename = %request.filename,
                "ensuring download task"
            );
            let outcome = match ensure_submitted(session, &request.filename, &self.options.transfer)
            {
                Ok(TaskOutcome::Submitted) => BundleOutcome::Submitted,
                Ok(TaskOutcome::SkippedExisting) => BundleOutcome::SkippedExisting,
                Err(err) => {
                    warn!(
                        address,
                        filename = %request.filename,
                        error = %format!("{err:#}"),
                        "task submission failed"
                    );
                    BundleOutcome::Failed(format!("{err:#}"))
                }
            };
            bundles.push(BundleReport {
                kind: request.kind,
                filename: Some(request.filename),
                outcome,
            });
        }

        TargetResult {
            target: address.to_string(),
            bundles,
            error: None,
        }
    }

    fn resolve_family(
        &self,
        address: &str,
        session: &dyn ManagementSession,
    ) -> Result<HardwareFamily, String> {
        let code = session
            .hardware_family_code()
            .map_err(|err| format!("failed to query hardware family: {err:#}"))?;
        let family = HardwareFamily::from_code(code).map_err(|err| err.to_string())?;
        debug!(address, code, family = family.code(), "hardware family resolved");
        Ok(family)
    }
}

fn infra_failed(reason: String) -> BundleReport {
    BundleReport {
        kind: BundleKind::Infrastructure,
        filename: None,
        outcome: BundleOutcome::Failed(reason),
    }
}
