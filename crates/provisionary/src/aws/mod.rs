//! AWS client modules
//!
//! This module provides wrappers around AWS SDK clients for:
//! - S3: Environment buckets
//! - IAM: Bucket-scoped policies and the users they are attached to

pub mod context;
pub mod error;
pub mod iam;
pub mod s3;

pub use context::{AwsContext, FromAwsContext};
pub use iam::{IamClient, IamOperations, PolicyDescriptor};
pub use s3::{S3Client, S3Operations};

// Error handling
pub use error::{AwsError, classify_anyhow_error, classify_aws_error, ignore_not_found};
