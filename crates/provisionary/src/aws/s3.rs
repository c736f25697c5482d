//! S3 bucket management

use crate::aws::context::{AwsContext, FromAwsContext};
use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use provisionary_common::defaults::S3_DEFAULT_LOCATION;
use std::future::Future;
use tracing::{debug, info};

/// S3 client for managing environment buckets
pub struct S3Client {
    client: Client,
    region: String,
}

impl S3Client {
    /// Create a new S3 client
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// Create an empty bucket in this client's region
    pub async fn create_bucket(&self, bucket_name: &str) -> Result<()> {
        info!(bucket = %bucket_name, region = %self.region, "Creating S3 bucket");

        let mut request = self.client.create_bucket().bucket(bucket_name);

        // us-east-1 is the implicit default and rejects an explicit constraint
        if let Some(config) = location_configuration(&self.region) {
            request = request.create_bucket_configuration(config);
        }

        request
            .send()
            .await
            .with_context(|| format!("Failed to create bucket '{}'", bucket_name))?;

        debug!(bucket = %bucket_name, "S3 bucket created");
        Ok(())
    }

    /// Delete an empty bucket
    pub async fn delete_bucket(&self, bucket_name: &str) -> Result<()> {
        info!(bucket = %bucket_name, "Deleting S3 bucket");

        self.client
            .delete_bucket()
            .bucket(bucket_name)
            .send()
            .await
            .with_context(|| format!("Failed to delete bucket '{}'", bucket_name))?;

        Ok(())
    }
}

impl FromAwsContext for S3Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
            region: ctx.region().to_string(),
        }
    }
}

/// Bucket configuration pinning the bucket to `region`, or `None` for us-east-1.
fn location_configuration(region: &str) -> Option<CreateBucketConfiguration> {
    if region == S3_DEFAULT_LOCATION {
        return None;
    }

    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

/// Trait for the S3 calls the provisioning steps make.
pub trait S3Operations: Send + Sync {
    /// Create a bucket
    fn create_bucket(&self, bucket_name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete a bucket
    fn delete_bucket(&self, bucket_name: &str) -> impl Future<Output = Result<()>> + Send;
}

impl S3Operations for S3Client {
    async fn create_bucket(&self, bucket_name: &str) -> Result<()> {
        S3Client::create_bucket(self, bucket_name).await
    }

    async fn delete_bucket(&self, bucket_name: &str) -> Result<()> {
        S3Client::delete_bucket(self, bucket_name).await
    }
}
