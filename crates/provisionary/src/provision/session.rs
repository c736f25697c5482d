//! Provisioning session: the resource ledger and the call wrapper
//!
//! A `ProvisionSession` is created empty at the start of a run and passed to
//! every step. It records what was actually created, so cleanup can unwind a
//! partial run, and carries the sticky error flag that forces that cleanup.

use crate::aws::{AwsError, PolicyDescriptor, classify_anyhow_error};
use provisionary_common::ResourceKind;
use std::fmt;
use std::future::Future;
use thiserror::Error;
use tracing::{error, info, warn};

/// A single cloud API call the tool makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateBucket,
    CreatePolicy,
    CreateUser,
    AttachUserPolicy,
    DetachUserPolicy,
    DeleteUser,
    DeletePolicy,
    DeleteBucket,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateBucket => "create_bucket",
            Operation::CreatePolicy => "create_policy",
            Operation::CreateUser => "create_user",
            Operation::AttachUserPolicy => "attach_user_policy",
            Operation::DetachUserPolicy => "detach_user_policy",
            Operation::DeleteUser => "delete_user",
            Operation::DeletePolicy => "delete_policy",
            Operation::DeleteBucket => "delete_bucket",
        }
    }

    /// Kind of resource the call creates or removes
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Operation::CreateBucket | Operation::DeleteBucket => ResourceKind::S3Bucket,
            Operation::CreatePolicy | Operation::DeletePolicy => ResourceKind::IamPolicy,
            Operation::CreateUser | Operation::DeleteUser => ResourceKind::IamUser,
            Operation::AttachUserPolicy | Operation::DetachUserPolicy => {
                ResourceKind::PolicyAttachment
            }
        }
    }

    /// Whether this call removes a resource during cleanup
    pub fn is_teardown(self) -> bool {
        matches!(
            self,
            Operation::DetachUserPolicy
                | Operation::DeleteUser
                | Operation::DeletePolicy
                | Operation::DeleteBucket
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cloud API call that failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Error calling {operation} for '{resource}': {message}")]
pub struct CallFailure {
    pub operation: Operation,
    /// Name or ARN the call was made for
    pub resource: String,
    /// Provider classification of the error
    pub kind: AwsError,
    /// Full error chain
    pub message: String,
}

impl CallFailure {
    fn from_error(operation: Operation, resource: &str, error: &anyhow::Error) -> Self {
        Self {
            operation,
            resource: resource.to_string(),
            kind: classify_anyhow_error(error),
            message: format!("{:#}", error),
        }
    }

    /// The provider's own error message, if any
    pub fn provider_message(&self) -> Option<&str> {
        self.kind.provider_message()
    }
}

/// A user created in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedUser {
    pub name: String,
    /// ARN of the policy attached to this user, once the attach call succeeded
    pub attached_policy_arn: Option<String>,
}

/// Resources created in the current run, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub buckets: Vec<String>,
    pub policies: Vec<PolicyDescriptor>,
    pub users: Vec<TrackedUser>,
}

impl Ledger {
    /// Policy created for the environment `name`
    pub fn policy(&self, name: &str) -> Option<&PolicyDescriptor> {
        self.policies.iter().find(|p| p.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&TrackedUser> {
        self.users.iter().find(|u| u.name == name)
    }

    fn user_mut(&mut self, name: &str) -> Option<&mut TrackedUser> {
        self.users.iter_mut().find(|u| u.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.policies.is_empty() && self.users.is_empty()
    }

    /// Total number of tracked resources, attachments included
    pub fn len(&self) -> usize {
        let attachments = self
            .users
            .iter()
            .filter(|u| u.attached_policy_arn.is_some())
            .count();
        self.buckets.len() + self.policies.len() + self.users.len() + attachments
    }
}

/// Outcome of a call made through [`ProvisionSession::call`]
pub type CallResult<T> = Result<T, CallFailure>;

/// Ledger plus error state for one provisioning run
#[derive(Debug, Default)]
pub struct ProvisionSession {
    ledger: Ledger,
    failures: Vec<CallFailure>,
    has_error: bool,
}

impl ProvisionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Every failed call so far, in order
    pub fn failures(&self) -> &[CallFailure] {
        &self.failures
    }

    /// True once any call has failed; never reset
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Run one cloud API call.
    ///
    /// Failures never propagate: they are logged, recorded, and set the error
    /// flag. A teardown call that finds its resource already gone is logged
    /// and returned as an error, but does not set the flag.
    pub async fn call<T, F>(&mut self, operation: Operation, resource: &str, call: F) -> CallResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match call.await {
            Ok(value) => {
                info!(operation = %operation, resource = %resource, "Successfully called {}", operation);
                Ok(value)
            }
            Err(e) => {
                let failure = CallFailure::from_error(operation, resource, &e);

                if operation.is_teardown() && failure.kind.is_not_found() {
                    info!(operation = %operation, resource = %resource, "Already deleted");
                    return Err(failure);
                }

                error!(
                    operation = %operation,
                    kind = %operation.resource_kind(),
                    resource = %resource,
                    provider_message = failure.provider_message().unwrap_or("none"),
                    error = %failure.message,
                    "Error calling {}",
                    operation
                );
                if let Some(hint) = failure.kind.suggestion() {
                    warn!(operation = %operation, "{}", hint);
                }

                self.mark_failed(failure.clone());
                Err(failure)
            }
        }
    }

    fn mark_failed(&mut self, failure: CallFailure) {
        self.failures.push(failure);
        self.has_error = true;
    }

    pub(crate) fn track_bucket(&mut self, name: &str) {
        self.ledger.buckets.push(name.to_string());
    }

    pub(crate) fn track_policy(&mut self, policy: PolicyDescriptor) {
        self.ledger.policies.push(policy);
    }

    pub(crate) fn track_user(&mut self, name: &str) {
        self.ledger.users.push(TrackedUser {
            name: name.to_string(),
            attached_policy_arn: None,
        });
    }

    pub(crate) fn track_attachment(&mut self, user_name: &str, policy_arn: &str) {
        if let Some(user) = self.ledger.user_mut(user_name) {
            user.attached_policy_arn = Some(policy_arn.to_string());
        }
    }

    /// Hand the ledger to cleanup, leaving the session's ledger empty.
    pub(crate) fn take_ledger(&mut self) -> Ledger {
        std::mem::take(&mut self.ledger)
    }
}
