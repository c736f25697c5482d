//! Centralized test fixtures and helpers.
//!
//! `FakeCloud` stands in for both the S3 and the IAM client: it records every
//! call in order and fails the calls it was told to fail.

use crate::aws::{IamOperations, PolicyDescriptor, S3Operations};
use crate::policy::PolicyTemplate;
use crate::provision::Operation;
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::Mutex;

/// Policy template used by tests
pub fn test_template() -> PolicyTemplate {
    PolicyTemplate::from_source(
        r#"{
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Action": ["s3:GetObject", "s3:PutObject"],
                    "Resource": "arn:aws:s3:::{BUCKET_NAME}/*"
                }
            ]
        }"#,
        "test-template.json",
    )
    .expect("test template is valid")
}

#[derive(Debug, Clone, Copy)]
enum FailureMode {
    /// Generic provider error
    Error,
    /// Provider reports the resource does not exist
    Missing,
}

/// Recording S3 + IAM fake
#[derive(Default)]
pub struct FakeCloud {
    calls: Mutex<Vec<(Operation, String)>>,
    failures: HashMap<(Operation, String), FailureMode>,
    documents: Mutex<HashMap<String, String>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `operation` when called for `resource`
    pub fn fail_on(mut self, operation: Operation, resource: &str) -> Self {
        self.failures
            .insert((operation, resource.to_string()), FailureMode::Error);
        self
    }

    /// Report `resource` as not found when `operation` is called for it
    pub fn missing_on(mut self, operation: Operation, resource: &str) -> Self {
        self.failures
            .insert((operation, resource.to_string()), FailureMode::Missing);
        self
    }

    /// ARN the fake assigns to the policy `name`
    pub fn policy_arn(name: &str) -> String {
        format!("arn:aws:iam::123456789012:policy/{}", name)
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Operations made so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.calls().into_iter().map(|(op, _)| op).collect()
    }

    pub fn was_called(&self, operation: Operation, resource: &str) -> bool {
        self.calls()
            .iter()
            .any(|(op, res)| *op == operation && res == resource)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Document the policy `name` was created with
    pub fn policy_document(&self, name: &str) -> Option<String> {
        self.documents.lock().unwrap().get(name).cloned()
    }

    fn record(&self, operation: Operation, resource: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((operation, resource.to_string()));

        match self.failures.get(&(operation, resource.to_string())) {
            None => Ok(()),
            Some(FailureMode::Error) => {
                bail!("InternalError: simulated {} failure for {}", operation, resource)
            }
            Some(FailureMode::Missing) => match operation.resource_kind() {
                provisionary_common::ResourceKind::S3Bucket => {
                    bail!("NoSuchBucket: {} does not exist", resource)
                }
                _ => bail!("NoSuchEntity: {} does not exist", resource),
            },
        }
    }
}

impl S3Operations for FakeCloud {
    async fn create_bucket(&self, bucket_name: &str) -> Result<()> {
        self.record(Operation::CreateBucket, bucket_name)
    }

    async fn delete_bucket(&self, bucket_name: &str) -> Result<()> {
        self.record(Operation::DeleteBucket, bucket_name)
    }
}

impl IamOperations for FakeCloud {
    async fn create_policy(&self, name: &str, document: &str) -> Result<PolicyDescriptor> {
        self.record(Operation::CreatePolicy, name)?;
        self.documents
            .lock()
            .unwrap()
            .insert(name.to_string(), document.to_string());
        Ok(PolicyDescriptor {
            name: name.to_string(),
            arn: Self::policy_arn(name),
        })
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<()> {
        self.record(Operation::DeletePolicy, policy_arn)
    }

    async fn create_user(&self, user_name: &str) -> Result<()> {
        self.record(Operation::CreateUser, user_name)
    }

    async fn delete_user(&self, user_name: &str) -> Result<()> {
        self.record(Operation::DeleteUser, user_name)
    }

    async fn attach_user_policy(&self, user_name: &str, _policy_arn: &str) -> Result<()> {
        self.record(Operation::AttachUserPolicy, user_name)
    }

    async fn detach_user_policy(&self, user_name: &str, _policy_arn: &str) -> Result<()> {
        self.record(Operation::DetachUserPolicy, user_name)
    }
}
