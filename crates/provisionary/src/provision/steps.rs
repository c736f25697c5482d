//! Provisioning steps
//!
//! Each step wraps exactly one cloud API call through the session's call
//! wrapper and records the resource in the ledger only when the call succeeded.

use super::session::{Operation, ProvisionSession};
use crate::aws::{IamOperations, S3Operations};
use crate::policy::PolicyTemplate;
use tracing::warn;

/// The clients and policy template the steps run against
pub struct Provisioner<'a, S, I> {
    s3: &'a S,
    iam: &'a I,
    template: &'a PolicyTemplate,
}

impl<'a, S: S3Operations, I: IamOperations> Provisioner<'a, S, I> {
    pub fn new(s3: &'a S, iam: &'a I, template: &'a PolicyTemplate) -> Self {
        Self { s3, iam, template }
    }

    pub(crate) fn s3(&self) -> &'a S {
        self.s3
    }

    pub(crate) fn iam(&self) -> &'a I {
        self.iam
    }

    /// Create the bucket `name`.
    pub async fn create_bucket(&self, session: &mut ProvisionSession, name: &str) {
        let result = session
            .call(Operation::CreateBucket, name, self.s3.create_bucket(name))
            .await;

        if result.is_ok() {
            session.track_bucket(name);
        }
    }

    /// Create the policy `name`, granting access to the bucket of the same name.
    pub async fn create_policy(&self, session: &mut ProvisionSession, name: &str) {
        let document = self.template.render(name);
        let result = session
            .call(
                Operation::CreatePolicy,
                name,
                self.iam.create_policy(name, &document),
            )
            .await;

        if let Ok(policy) = result {
            session.track_policy(policy);
        }
    }

    /// Create the user `name`.
    pub async fn create_user(&self, session: &mut ProvisionSession, name: &str) {
        let result = session
            .call(Operation::CreateUser, name, self.iam.create_user(name))
            .await;

        if result.is_ok() {
            session.track_user(name);
        }
    }

    /// Attach the policy `name` to the user `name`.
    ///
    /// Skipped when either was not created in this run; the failure that
    /// caused that has already been recorded.
    pub async fn attach_policy(&self, session: &mut ProvisionSession, name: &str) {
        let Some(policy_arn) = session.ledger().policy(name).map(|p| p.arn.clone()) else {
            warn!(resource = %name, "Skipping policy attachment: policy was not created");
            return;
        };

        if session.ledger().user(name).is_none() {
            warn!(resource = %name, "Skipping policy attachment: user was not created");
            return;
        }

        let result = session
            .call(
                Operation::AttachUserPolicy,
                name,
                self.iam.attach_user_policy(name, &policy_arn),
            )
            .await;

        if result.is_ok() {
            session.track_attachment(name, &policy_arn);
        }
    }

    /// Run all four steps for one environment, in dependency order.
    pub async fn provision_environment(&self, session: &mut ProvisionSession, name: &str) {
        self.create_bucket(session, name).await;
        self.create_policy(session, name).await;
        self.create_user(session, name).await;
        self.attach_policy(session, name).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCloud, test_template};

    #[tokio::test]
    async fn test_create_bucket_tracks_on_success() {
        let cloud = FakeCloud::new();
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.create_bucket(&mut session, "acme-dev").await;

        assert_eq!(session.ledger().buckets, vec!["acme-dev"]);
        assert!(!session.has_error());
    }

    #[tokio::test]
    async fn test_failed_bucket_not_tracked() {
        let cloud = FakeCloud::new().fail_on(Operation::CreateBucket, "acme-dev");
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.create_bucket(&mut session, "acme-dev").await;

        assert!(session.ledger().buckets.is_empty());
        assert!(session.has_error());
    }

    #[tokio::test]
    async fn test_create_policy_renders_template() {
        let cloud = FakeCloud::new();
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.create_policy(&mut session, "acme-dev").await;

        let policy = session.ledger().policy("acme-dev").unwrap();
        assert_eq!(policy.arn, FakeCloud::policy_arn("acme-dev"));

        let document = cloud.policy_document("acme-dev").unwrap();
        assert!(document.contains("arn:aws:s3:::acme-dev/*"));
        assert!(!document.contains("{BUCKET_NAME}"));
    }

    #[tokio::test]
    async fn test_failed_user_not_tracked() {
        let cloud = FakeCloud::new().fail_on(Operation::CreateUser, "acme-dev");
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.create_user(&mut session, "acme-dev").await;

        assert!(session.ledger().users.is_empty());
        assert!(session.has_error());
    }

    #[tokio::test]
    async fn test_attach_skipped_without_policy() {
        let cloud = FakeCloud::new().fail_on(Operation::CreatePolicy, "acme-dev");
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.provision_environment(&mut session, "acme-dev").await;

        // The policy failure is the only failure: attach was never attempted
        assert_eq!(session.failures().len(), 1);
        assert!(!cloud.was_called(Operation::AttachUserPolicy, "acme-dev"));
        assert_eq!(session.ledger().users.len(), 1);
        assert_eq!(session.ledger().users[0].attached_policy_arn, None);
    }

    #[tokio::test]
    async fn test_attach_skipped_without_user() {
        let cloud = FakeCloud::new().fail_on(Operation::CreateUser, "acme-dev");
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.provision_environment(&mut session, "acme-dev").await;

        assert_eq!(session.failures().len(), 1);
        assert!(!cloud.was_called(Operation::AttachUserPolicy, "acme-dev"));
    }

    #[tokio::test]
    async fn test_failed_attach_not_recorded() {
        let cloud = FakeCloud::new().fail_on(Operation::AttachUserPolicy, "acme-dev");
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.provision_environment(&mut session, "acme-dev").await;

        assert!(session.has_error());
        assert_eq!(session.ledger().users[0].attached_policy_arn, None);
    }

    #[tokio::test]
    async fn test_environment_steps_run_in_order() {
        let cloud = FakeCloud::new();
        let template = test_template();
        let provisioner = Provisioner::new(&cloud, &cloud, &template);
        let mut session = ProvisionSession::new();

        provisioner.provision_environment(&mut session, "acme-dev").await;

        assert_eq!(
            cloud.operations(),
            vec![
                Operation::CreateBucket,
                Operation::CreatePolicy,
                Operation::CreateUser,
                Operation::AttachUserPolicy,
            ]
        );
        assert_eq!(
            session.ledger().users[0].attached_policy_arn.as_deref(),
            Some(FakeCloud::policy_arn("acme-dev").as_str())
        );
    }
}
