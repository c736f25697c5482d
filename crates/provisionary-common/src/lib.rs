//! provisionary-common - Shared types and utilities
//!
//! This crate holds the naming rules, defaults and resource bookkeeping types
//! used by the provisionary CLI, kept apart from the client code so they can
//! be tested without any AWS configuration.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`environment`]: Environment suffixes and resource naming
//! - [`resource_kind`]: Provisioned resource types
//! - [`tags`]: IAM tag constants for locating provisioned resources

pub mod defaults;
pub mod environment;
pub mod resource_kind;
pub mod tags;

// Re-export commonly used types
pub use environment::{EnvironmentError, EnvironmentLayout, EnvironmentSuffix};
pub use resource_kind::ResourceKind;
