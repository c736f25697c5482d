//! IAM policy and user management for environment access

use crate::aws::context::{AwsContext, FromAwsContext};
use anyhow::{Context, Result};
use aws_sdk_iam::Client;
use chrono::Utc;
use provisionary_common::tags;
use std::future::Future;
use tracing::{debug, info};

/// A managed policy as returned by IAM on creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDescriptor {
    /// Policy name (same as the environment resource name)
    pub name: String,
    /// ARN used to attach, detach and delete the policy
    pub arn: String,
}

/// IAM client for managing environment policies and users
pub struct IamClient {
    client: Client,
}

impl IamClient {
    /// Create a new IAM client
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// Create a managed policy from a rendered policy document
    pub async fn create_policy(&self, name: &str, document: &str) -> Result<PolicyDescriptor> {
        info!(policy = %name, "Creating IAM policy");

        let tags = tags::iam_tags(name, Utc::now()).context("Failed to build IAM tags")?;

        let response = self
            .client
            .create_policy()
            .policy_name(name)
            .policy_document(document)
            .description(format!("S3 access to bucket {}", name))
            .set_tags(Some(tags))
            .send()
            .await
            .with_context(|| format!("Failed to create IAM policy '{}'", name))?;

        let policy = response
            .policy()
            .with_context(|| format!("IAM returned no policy for '{}'", name))?;
        let arn = policy
            .arn()
            .with_context(|| format!("IAM returned no ARN for policy '{}'", name))?;

        debug!(policy = %name, arn = %arn, "IAM policy created");

        Ok(PolicyDescriptor {
            name: policy.policy_name().unwrap_or(name).to_string(),
            arn: arn.to_string(),
        })
    }

    /// Delete a managed policy by ARN
    pub async fn delete_policy(&self, policy_arn: &str) -> Result<()> {
        info!(arn = %policy_arn, "Deleting IAM policy");

        self.client
            .delete_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .with_context(|| format!("Failed to delete IAM policy '{}'", policy_arn))?;

        Ok(())
    }

    /// Create a user with standard provisionary tags
    pub async fn create_user(&self, user_name: &str) -> Result<()> {
        info!(user = %user_name, "Creating IAM user");

        let tags = tags::iam_tags(user_name, Utc::now()).context("Failed to build IAM tags")?;

        self.client
            .create_user()
            .user_name(user_name)
            .set_tags(Some(tags))
            .send()
            .await
            .with_context(|| format!("Failed to create IAM user '{}'", user_name))?;

        debug!(user = %user_name, "IAM user created");
        Ok(())
    }

    /// Delete a user (must have no attached policies)
    pub async fn delete_user(&self, user_name: &str) -> Result<()> {
        info!(user = %user_name, "Deleting IAM user");

        self.client
            .delete_user()
            .user_name(user_name)
            .send()
            .await
            .with_context(|| format!("Failed to delete IAM user '{}'", user_name))?;

        Ok(())
    }

    /// Attach a managed policy to a user
    pub async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> Result<()> {
        info!(user = %user_name, arn = %policy_arn, "Attaching IAM policy to user");

        self.client
            .attach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .with_context(|| format!("Failed to attach policy to IAM user '{}'", user_name))?;

        Ok(())
    }

    /// Detach a managed policy from a user
    pub async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> Result<()> {
        info!(user = %user_name, arn = %policy_arn, "Detaching IAM policy from user");

        self.client
            .detach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .with_context(|| format!("Failed to detach policy from IAM user '{}'", user_name))?;

        Ok(())
    }
}

impl FromAwsContext for IamClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

/// Trait for the IAM calls the provisioning steps make.
pub trait IamOperations: Send + Sync {
    /// Create a managed policy and return its descriptor
    fn create_policy(
        &self,
        name: &str,
        document: &str,
    ) -> impl Future<Output = Result<PolicyDescriptor>> + Send;

    /// Delete a managed policy
    fn delete_policy(&self, policy_arn: &str) -> impl Future<Output = Result<()>> + Send;

    /// Create a user
    fn create_user(&self, user_name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete a user
    fn delete_user(&self, user_name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Attach a managed policy to a user
    fn attach_user_policy(
        &self,
        user_name: &str,
        policy_arn: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Detach a managed policy from a user
    fn detach_user_policy(
        &self,
        user_name: &str,
        policy_arn: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl IamOperations for IamClient {
    async fn create_policy(&self, name: &str, document: &str) -> Result<PolicyDescriptor> {
        IamClient::create_policy(self, name, document).await
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<()> {
        IamClient::delete_policy(self, policy_arn).await
    }

    async fn create_user(&self, user_name: &str) -> Result<()> {
        IamClient::create_user(self, user_name).await
    }

    async fn delete_user(&self, user_name: &str) -> Result<()> {
        IamClient::delete_user(self, user_name).await
    }

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> Result<()> {
        IamClient::attach_user_policy(self, user_name, policy_arn).await
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> Result<()> {
        IamClient::detach_user_policy(self, user_name, policy_arn).await
    }
}
