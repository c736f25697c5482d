//! Default configuration values
//!
//! These mirror the answers offered by the interactive prompts, so pressing
//! enter through every prompt and passing `--yes` give the same run.

/// AWS profile offered when prompting for credentials
pub const DEFAULT_PROFILE: &str = "default";

/// Region the buckets are created in when none is given
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Whether dev/acceptance/production get their own resources by default
pub const DEFAULT_SEPARATE_ENVIRONMENTS: bool = true;

/// Location of the IAM policy document template, relative to the working directory
pub const DEFAULT_POLICY_TEMPLATE: &str = "./policies/IamUser.json";

/// Token in the policy template replaced with the environment's bucket name
pub const BUCKET_NAME_PLACEHOLDER: &str = "{BUCKET_NAME}";

/// The one region where S3 rejects an explicit location constraint
pub const S3_DEFAULT_LOCATION: &str = "us-east-1";
