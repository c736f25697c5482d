//! Provisioning run orchestration
//!
//! Walks the environment names for the chosen layout, runs every step for
//! each, and decides whether the run has to be unwound.

use super::cleanup::{CleanupReport, cleanup};
use super::session::{CallFailure, Ledger, ProvisionSession};
use super::steps::Provisioner;
use crate::aws::{IamOperations, S3Operations};
use provisionary_common::EnvironmentLayout;
use tracing::{info, warn};

/// What a run should provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub base_name: String,
    pub layout: EnvironmentLayout,
    /// Remove everything at the end of the run even if nothing failed
    pub cleanup_requested: bool,
}

impl ProvisionPlan {
    /// Resource names to provision, in order
    pub fn environment_names(&self) -> Vec<String> {
        self.layout.names(&self.base_name)
    }
}

/// Why cleanup ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupReason {
    /// `--cleanup` was passed
    Requested,
    /// A provisioning call failed
    ProvisioningFailed,
}

/// Outcome of a provisioning run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Environment names that were processed
    pub environments: Vec<String>,
    /// Resources created, as they stood before any cleanup
    pub ledger: Ledger,
    /// Every failed call, provisioning and cleanup
    pub failures: Vec<CallFailure>,
    /// Set when cleanup ran
    pub cleanup: Option<(CleanupReason, CleanupReport)>,
}

impl RunSummary {
    /// True when no call failed, during provisioning or cleanup
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn cleanup_ran(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Process exit status: 0 when every call succeeded, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() { 0 } else { 1 }
    }
}

/// Provision every environment in `plan`, then clean up if needed.
pub async fn run<S: S3Operations, I: IamOperations>(
    provisioner: &Provisioner<'_, S, I>,
    plan: &ProvisionPlan,
) -> RunSummary {
    let environments = plan.environment_names();
    let mut session = ProvisionSession::new();

    info!(
        base_name = %plan.base_name,
        environments = ?environments,
        "Provisioning environments"
    );

    for name in &environments {
        info!(environment = %name, "Provisioning environment");
        provisioner.provision_environment(&mut session, name).await;
    }

    let ledger = session.ledger().clone();
    info!(
        resources = ledger.len(),
        failures = session.failures().len(),
        "Provisioning finished"
    );

    let reason = if session.has_error() {
        Some(CleanupReason::ProvisioningFailed)
    } else if plan.cleanup_requested {
        Some(CleanupReason::Requested)
    } else {
        None
    };

    let cleanup_outcome = match reason {
        Some(reason) => {
            match reason {
                CleanupReason::ProvisioningFailed => {
                    warn!("An error occurred while creating resources, running cleanup")
                }
                CleanupReason::Requested => info!("Cleanup requested, running cleanup"),
            }
            let report = cleanup(provisioner.s3(), provisioner.iam(), &mut session).await;
            Some((reason, report))
        }
        None => None,
    };

    RunSummary {
        environments,
        ledger,
        failures: session.failures().to_vec(),
        cleanup: cleanup_outcome,
    }
}
