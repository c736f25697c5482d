//! Provisioned resource types

use std::fmt;

/// Types of AWS resources managed by provisionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Attachment of a managed policy to a user
    PolicyAttachment,
    /// IAM user
    IamUser,
    /// IAM managed policy
    IamPolicy,
    /// S3 bucket
    S3Bucket,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::PolicyAttachment => "policy attachment",
            ResourceKind::IamUser => "IAM user",
            ResourceKind::IamPolicy => "IAM policy",
            ResourceKind::S3Bucket => "S3 bucket",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
