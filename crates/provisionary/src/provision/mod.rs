//! Provisioning core
//!
//! - [`session`]: the resource ledger, sticky error flag and call wrapper
//! - [`steps`]: one cloud call per step, recorded on success
//! - [`cleanup`]: best-effort unwind of the ledger in dependency order
//! - [`orchestrator`]: the environment loop and the cleanup decision

pub mod cleanup;
pub mod orchestrator;
pub mod session;
pub mod steps;

pub use cleanup::{CleanupReport, CleanupResult, cleanup};
pub use orchestrator::{CleanupReason, ProvisionPlan, RunSummary, run};
pub use session::{CallFailure, Ledger, Operation, ProvisionSession, TrackedUser};
pub use steps::Provisioner;
