//! AWS error classification and handling
//!
//! Provides typed errors for S3 and IAM SDK operations using the `.code()`
//! method instead of string matching on Debug format.

use thiserror::Error;

/// AWS error categories for reporting and cleanup logic
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AwsError {
    /// Resource was not found (safe to skip in cleanup)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Resource already exists, possibly owned by another account
    #[error("Resource already exists: {message}")]
    AlreadyExists { message: String },

    /// Credentials lack permission for the call
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    Throttled,

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is an "already exists" error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, AwsError::AlreadyExists { .. })
    }

    /// The provider's own message, when the SDK reported one.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { message }
            | AwsError::AlreadyExists { message }
            | AwsError::AccessDenied { message }
            | AwsError::Sdk { message, .. } => Some(message),
            AwsError::Throttled => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::AlreadyExists { .. } => Some(
                "A resource with this name already exists. Bucket names are global across \
                 all AWS accounts; pick another base name or remove the existing resource."
                    .to_string(),
            ),
            AwsError::AccessDenied { .. } => Some(
                "Check that the selected profile has S3 and IAM permissions.".to_string(),
            ),
            AwsError::Throttled => {
                Some("AWS API rate limit hit. Wait a moment and run again.".to_string())
            }
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            _ => None,
        }
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchEntity", "NotFound"];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &[
    "BucketAlreadyExists",
    "BucketAlreadyOwnedByYou",
    "EntityAlreadyExists",
];

/// Known AWS error codes for missing permissions
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "AccessDeniedException"];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "SlowDown",
    "RequestLimitExceeded",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists { message },
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied { message },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Downcast `$cause` to the `SdkError` of each listed operation and classify
/// the first match through `ProvideErrorMetadata`.
macro_rules! classify_sdk_errors {
    ($cause:expr, $( $sdk:ident :: $op:ident :: $err:ident ),+ $(,)?) => {
        $(
            if let Some(e) = $cause
                .downcast_ref::<$sdk::error::SdkError<$sdk::operation::$op::$err>>()
            {
                let meta = $sdk::error::ProvideErrorMetadata::meta(e);
                return classify_aws_error(meta.code(), meta.message());
            }
        )+
    };
}

/// Classify an error from an anyhow::Error by extracting the AWS error code.
///
/// Walks the error chain looking for the S3 and IAM operation errors this
/// crate produces. Falls back to string matching on the Debug representation
/// if no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    for cause in error.chain() {
        classify_sdk_errors!(
            cause,
            aws_sdk_s3::create_bucket::CreateBucketError,
            aws_sdk_s3::delete_bucket::DeleteBucketError,
            aws_sdk_iam::create_policy::CreatePolicyError,
            aws_sdk_iam::delete_policy::DeletePolicyError,
            aws_sdk_iam::create_user::CreateUserError,
            aws_sdk_iam::delete_user::DeleteUserError,
            aws_sdk_iam::attach_user_policy::AttachUserPolicyError,
            aws_sdk_iam::detach_user_policy::DetachUserPolicyError,
        );
    }

    // Fallback: extract error code from debug string representation
    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&error.to_string()));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// All known AWS error codes for extraction from debug strings
const ALL_KNOWN_CODES: &[&[&str]] = &[
    NOT_FOUND_CODES,
    ALREADY_EXISTS_CODES,
    ACCESS_DENIED_CODES,
    THROTTLING_CODES,
];

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    // Longest first so "AccessDeniedException" wins over "AccessDenied"
    let mut known: Vec<&str> = ALL_KNOWN_CODES.iter().flat_map(|c| c.iter().copied()).collect();
    known.sort_by_key(|c| std::cmp::Reverse(c.len()));

    if let Some(code) = known.into_iter().find(|code| debug_str.contains(code)) {
        return Some(code.to_string());
    }

    // Try to extract any code from `code: Some("...")` pattern
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "InvalidBucketName",
        "Bucket names must be 3-63 lowercase letters, digits and hyphens.",
    ),
    (
        "IllegalLocationConstraintException",
        "The bucket region does not match the endpoint; check the selected region.",
    ),
    (
        "MalformedPolicyDocument",
        "The rendered policy template is not a valid IAM policy document.",
    ),
    (
        "LimitExceeded",
        "An IAM quota was reached. Remove unused users or policies, or request a limit increase.",
    ),
    (
        "InvalidClientTokenId",
        "The credentials for this profile are invalid. Run `aws configure` again.",
    ),
    (
        "ExpiredToken",
        "The session credentials for this profile have expired.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}

/// Treat "not found" errors as success, for idempotent deletes.
pub fn ignore_not_found(result: anyhow::Result<()>) -> anyhow::Result<()> {
    match result {
        Err(e) if classify_anyhow_error(&e).is_not_found() => Ok(()),
        other => other,
    }
}
