//! Cleanup sequencer
//!
//! Unwinds everything in the session ledger in dependency order:
//! detach and delete users, then delete policies, then delete buckets.
//! Cleanup is best-effort; a failed deletion is logged and counted and the
//! remaining items are still attempted.

use super::session::{CallResult, Ledger, Operation, ProvisionSession};
use crate::aws::{IamOperations, S3Operations};
use provisionary_common::ResourceKind;
use tracing::{debug, info};

/// Result of a single resource cleanup operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupResult {
    /// Resource was successfully deleted
    Deleted,
    /// Resource was already deleted (not found)
    AlreadyDeleted,
    /// Cleanup failed with error
    Failed,
    /// Nothing to do for this resource
    Skipped,
}

impl CleanupResult {
    fn from_call(result: &CallResult<()>) -> Self {
        match result {
            Ok(()) => CleanupResult::Deleted,
            Err(f) if f.kind.is_not_found() => CleanupResult::AlreadyDeleted,
            Err(_) => CleanupResult::Failed,
        }
    }
}

/// Report of cleanup operations
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub attachments: usize,
    pub users: usize,
    pub policies: usize,
    pub buckets: usize,
    pub deleted: usize,
    pub already_deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CleanupReport {
    fn record(&mut self, kind: ResourceKind, result: CleanupResult) {
        debug!(kind = %kind, result = ?result, "Cleanup step finished");
        match kind {
            ResourceKind::PolicyAttachment => self.attachments += 1,
            ResourceKind::IamUser => self.users += 1,
            ResourceKind::IamPolicy => self.policies += 1,
            ResourceKind::S3Bucket => self.buckets += 1,
        }
        match result {
            CleanupResult::Deleted => self.deleted += 1,
            CleanupResult::AlreadyDeleted => self.already_deleted += 1,
            CleanupResult::Failed => self.failed += 1,
            CleanupResult::Skipped => self.skipped += 1,
        }
    }

    /// Resources visited, whatever the outcome
    pub fn total(&self) -> usize {
        self.deleted + self.already_deleted + self.failed + self.skipped
    }

    /// True when nothing was left behind
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Delete every resource in the session ledger, draining it.
pub async fn cleanup<S: S3Operations, I: IamOperations>(
    s3: &S,
    iam: &I,
    session: &mut ProvisionSession,
) -> CleanupReport {
    let ledger: Ledger = session.take_ledger();
    let mut report = CleanupReport::default();

    info!(
        users = ledger.users.len(),
        policies = ledger.policies.len(),
        buckets = ledger.buckets.len(),
        "Cleaning up created resources"
    );

    // Users first: IAM refuses to delete a user with an attached policy
    for user in &ledger.users {
        // The attach call may have failed after IAM applied it, so detach
        // whenever this run created the policy, not only on a recorded attach
        let policy_arn = ledger
            .policy(&user.name)
            .map(|p| p.arn.as_str())
            .or(user.attached_policy_arn.as_deref());

        let detach = match policy_arn {
            Some(arn) => {
                let result = session
                    .call(
                        Operation::DetachUserPolicy,
                        &user.name,
                        iam.detach_user_policy(&user.name, arn),
                    )
                    .await;
                CleanupResult::from_call(&result)
            }
            None => {
                debug!(user = %user.name, "No policy created for user, skipping detach");
                CleanupResult::Skipped
            }
        };
        report.record(ResourceKind::PolicyAttachment, detach);

        let result = session
            .call(Operation::DeleteUser, &user.name, iam.delete_user(&user.name))
            .await;
        report.record(ResourceKind::IamUser, CleanupResult::from_call(&result));
    }

    for policy in &ledger.policies {
        let result = session
            .call(Operation::DeletePolicy, &policy.arn, iam.delete_policy(&policy.arn))
            .await;
        report.record(ResourceKind::IamPolicy, CleanupResult::from_call(&result));
    }

    for bucket in &ledger.buckets {
        let result = session
            .call(Operation::DeleteBucket, bucket, s3.delete_bucket(bucket))
            .await;
        report.record(ResourceKind::S3Bucket, CleanupResult::from_call(&result));
    }

    info!(
        total = report.total(),
        deleted = report.deleted,
        already_deleted = report.already_deleted,
        failed = report.failed,
        skipped = report.skipped,
        "Cleanup complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::steps::Provisioner;
    use crate::testing::{FakeCloud, test_template};

    async fn provisioned(cloud: &FakeCloud, names: &[&str]) -> ProvisionSession {
        let template = test_template();
        let provisioner = Provisioner::new(cloud, cloud, &template);
        let mut session = ProvisionSession::new();
        for name in names {
            provisioner.provision_environment(&mut session, name).await;
        }
        session
    }

    #[tokio::test]
    async fn test_cleanup_order() {
        let cloud = FakeCloud::new();
        let mut session = provisioned(&cloud, &["acme-dev", "acme-production"]).await;
        cloud.clear_calls();

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(
            cloud.calls(),
            vec![
                (Operation::DetachUserPolicy, "acme-dev".to_string()),
                (Operation::DeleteUser, "acme-dev".to_string()),
                (Operation::DetachUserPolicy, "acme-production".to_string()),
                (Operation::DeleteUser, "acme-production".to_string()),
                (Operation::DeletePolicy, FakeCloud::policy_arn("acme-dev")),
                (Operation::DeletePolicy, FakeCloud::policy_arn("acme-production")),
                (Operation::DeleteBucket, "acme-dev".to_string()),
                (Operation::DeleteBucket, "acme-production".to_string()),
            ]
        );
        assert_eq!(report.deleted, 8);
        assert!(report.is_clean());
        assert!(session.ledger().is_empty());
        assert!(!session.has_error());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_cleanup() {
        let cloud = FakeCloud::new()
            .fail_on(Operation::DeleteUser, "acme-dev")
            .fail_on(Operation::DeletePolicy, &FakeCloud::policy_arn("acme-dev"));
        let mut session = provisioned(&cloud, &["acme-dev", "acme-acceptance"]).await;

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(report.failed, 2);
        assert_eq!(report.deleted, 6);
        assert!(!report.is_clean());
        assert!(cloud.was_called(Operation::DeleteUser, "acme-acceptance"));
        assert!(cloud.was_called(Operation::DeleteBucket, "acme-dev"));
        assert!(cloud.was_called(Operation::DeleteBucket, "acme-acceptance"));
        assert!(session.has_error());
    }

    #[tokio::test]
    async fn test_user_without_attachment_skips_detach() {
        let cloud = FakeCloud::new().fail_on(Operation::CreatePolicy, "acme-dev");
        let mut session = provisioned(&cloud, &["acme-dev"]).await;
        cloud.clear_calls();

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(
            cloud.calls(),
            vec![
                (Operation::DeleteUser, "acme-dev".to_string()),
                (Operation::DeleteBucket, "acme-dev".to_string()),
            ]
        );
        assert_eq!(report.skipped, 1);
        assert_eq!(report.attachments, 1);
        assert_eq!(report.policies, 0);
    }

    #[tokio::test]
    async fn test_failed_attach_still_detaches() {
        let cloud = FakeCloud::new().fail_on(Operation::AttachUserPolicy, "acme-dev");
        let mut session = provisioned(&cloud, &["acme-dev"]).await;
        assert_eq!(session.ledger().user("acme-dev").unwrap().attached_policy_arn, None);
        cloud.clear_calls();

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(
            cloud.calls(),
            vec![
                (Operation::DetachUserPolicy, "acme-dev".to_string()),
                (Operation::DeleteUser, "acme-dev".to_string()),
                (Operation::DeletePolicy, FakeCloud::policy_arn("acme-dev")),
                (Operation::DeleteBucket, "acme-dev".to_string()),
            ]
        );
        assert_eq!(report.deleted, 4);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn test_detach_of_unattached_policy_is_already_deleted() {
        let cloud = FakeCloud::new()
            .fail_on(Operation::AttachUserPolicy, "acme-dev")
            .missing_on(Operation::DetachUserPolicy, "acme-dev");
        let mut session = provisioned(&cloud, &["acme-dev"]).await;
        let failures_before = session.failures().len();

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(report.already_deleted, 1);
        assert_eq!(report.deleted, 3);
        assert!(report.is_clean());
        assert_eq!(session.failures().len(), failures_before);
    }

    #[tokio::test]
    async fn test_already_deleted_is_not_a_failure() {
        let cloud = FakeCloud::new().missing_on(Operation::DeleteBucket, "acme-dev");
        let mut session = provisioned(&cloud, &["acme-dev"]).await;

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(report.already_deleted, 1);
        assert!(report.is_clean());
        assert!(!session.has_error());
    }

    #[tokio::test]
    async fn test_empty_ledger_makes_no_calls() {
        let cloud = FakeCloud::new();
        let mut session = ProvisionSession::new();

        let report = cleanup(&cloud, &cloud, &mut session).await;

        assert_eq!(report.total(), 0);
        assert!(cloud.calls().is_empty());
    }
}
