//! provisionary - S3 buckets with scoped IAM users, per environment
//!
//! For each environment (dev/acceptance/production, or one shared set) this
//! crate creates a bucket, a policy granting access to it, and a user with
//! that policy attached. Everything created is tracked so a failed run can
//! be unwound.

pub mod aws;
pub mod config;
pub mod policy;
pub mod provision;
pub mod setup;

#[cfg(test)]
pub(crate) mod testing;
