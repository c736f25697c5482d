//! Environment suffixes and resource naming
//!
//! Every resource for an environment shares one name, `{base}-{suffix}`: the
//! bucket, the policy scoped to it, and the user the policy is attached to.

use std::fmt;
use thiserror::Error;

/// Maximum length of an S3 bucket name, the tightest limit of the three resources
pub const MAX_RESOURCE_NAME_LEN: usize = 63;

/// Environment a set of resources is provisioned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentSuffix {
    Dev,
    Acceptance,
    Production,
    /// A single set of resources used by every environment
    Shared,
}

impl EnvironmentSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvironmentSuffix::Dev => "dev",
            EnvironmentSuffix::Acceptance => "acceptance",
            EnvironmentSuffix::Production => "production",
            EnvironmentSuffix::Shared => "shared",
        }
    }

    /// Full resource name for this environment
    pub fn resource_name(self, base_name: &str) -> String {
        format!("{}-{}", base_name, self.as_str())
    }
}

impl fmt::Display for EnvironmentSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether each environment gets its own resources or they share one set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentLayout {
    /// dev, acceptance and production each get a bucket, policy and user
    Separate,
    /// One shared bucket, policy and user
    Shared,
}

impl EnvironmentLayout {
    /// Layout for the answer to "create separate buckets?"
    pub fn from_separate(separate: bool) -> Self {
        if separate {
            EnvironmentLayout::Separate
        } else {
            EnvironmentLayout::Shared
        }
    }

    /// Suffixes provisioned for this layout, in provisioning order
    pub fn suffixes(self) -> &'static [EnvironmentSuffix] {
        match self {
            EnvironmentLayout::Separate => &[
                EnvironmentSuffix::Dev,
                EnvironmentSuffix::Acceptance,
                EnvironmentSuffix::Production,
            ],
            EnvironmentLayout::Shared => &[EnvironmentSuffix::Shared],
        }
    }

    /// Resource names for `base_name`, in provisioning order
    pub fn names(self, base_name: &str) -> Vec<String> {
        self.suffixes()
            .iter()
            .map(|suffix| suffix.resource_name(base_name))
            .collect()
    }
}

/// A base name that cannot produce valid resource names
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Resource name must not be empty")]
    Empty,

    #[error("Resource name '{name}' contains '{ch}'; use lowercase letters, digits and hyphens")]
    InvalidCharacter { name: String, ch: char },

    #[error("Resource name '{name}' must start and end with a lowercase letter or digit")]
    InvalidBoundary { name: String },

    #[error("Resource name '{name}' is too long; at most {max} characters fit every environment suffix")]
    TooLong { name: String, max: usize },
}

/// Check that `base_name` yields valid bucket, policy and user names for every suffix.
pub fn validate_base_name(base_name: &str) -> Result<(), EnvironmentError> {
    if base_name.is_empty() {
        return Err(EnvironmentError::Empty);
    }

    if let Some(ch) = base_name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(EnvironmentError::InvalidCharacter {
            name: base_name.to_string(),
            ch,
        });
    }

    if base_name.starts_with('-') || base_name.ends_with('-') {
        return Err(EnvironmentError::InvalidBoundary {
            name: base_name.to_string(),
        });
    }

    let max = max_base_name_len();
    if base_name.len() > max {
        return Err(EnvironmentError::TooLong {
            name: base_name.to_string(),
            max,
        });
    }

    Ok(())
}

/// Longest base name whose every `{base}-{suffix}` still fits a bucket name
pub fn max_base_name_len() -> usize {
    let longest_suffix = EnvironmentLayout::Separate
        .suffixes()
        .iter()
        .chain(EnvironmentLayout::Shared.suffixes())
        .map(|s| s.as_str().len() + 1)
        .max()
        .unwrap_or(0);
    MAX_RESOURCE_NAME_LEN - longest_suffix
}
