//! Shared test utilities for provisionary
//!
//! Helpers for the live AWS integration tests, which are `#[ignore]`d and
//! only run against a real account.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique resource names

pub mod aws;

// Re-export commonly used items
pub use aws::{get_test_region, test_base_name, test_run_id};
