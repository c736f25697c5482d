//! IAM tag constants for provisionary
//!
//! Policies and users are tagged so leftovers from an interrupted run (which
//! the in-memory ledger can no longer clean up) can be found in the console.
//!
//! ## Tag Schema
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `provisionary:tool` | Static identifier ("provisionary") |
//! | `provisionary:environment` | Resource name the policy/user belongs to |
//! | `provisionary:created-at` | RFC 3339 creation timestamp |

use chrono::{DateTime, Utc};

/// Tag key for tool identification
pub const TAG_TOOL: &str = "provisionary:tool";

/// Tag value for tool identification
pub const TAG_TOOL_VALUE: &str = "provisionary";

/// Tag key for the environment resource name
pub const TAG_ENVIRONMENT: &str = "provisionary:environment";

/// Tag key for creation timestamp (RFC 3339 format)
pub const TAG_CREATED_AT: &str = "provisionary:created-at";

/// Helper to format creation timestamp for tags
pub fn format_created_at(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Standard tags for an IAM resource belonging to `environment`.
pub fn iam_tags(
    environment: &str,
    created_at: DateTime<Utc>,
) -> Result<Vec<aws_sdk_iam::types::Tag>, aws_sdk_iam::error::BuildError> {
    let created_at = format_created_at(created_at);
    [
        (TAG_TOOL, TAG_TOOL_VALUE),
        (TAG_ENVIRONMENT, environment),
        (TAG_CREATED_AT, created_at.as_str()),
    ]
    .into_iter()
    .map(|(key, value)| aws_sdk_iam::types::Tag::builder().key(key).value(value).build())
    .collect()
}
