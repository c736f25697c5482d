//! AWS test utilities
//!
//! Provides region detection and unique resource names for AWS integration tests.

use chrono::Utc;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to eu-west-1
///
/// # Example
///
/// ```
/// use provisionary_test_utils::aws::get_test_region;
///
/// let region = get_test_region();
/// assert!(!region.is_empty());
/// ```
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "eu-west-1".to_string())
}

/// Generate a unique run ID for test resources.
///
/// Format: `test-{timestamp_ms}-{counter}`, unique even when tests start
/// in the same millisecond.
///
/// # Example
///
/// ```
/// use provisionary_test_utils::aws::test_run_id;
///
/// let run_id = test_run_id();
/// assert!(run_id.starts_with("test-"));
/// ```
pub fn test_run_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-{}-{}", ts, counter)
}

/// Generate a unique base name for provisioned test resources.
///
/// Short enough that every environment suffix still yields a valid bucket name.
///
/// # Example
///
/// ```
/// use provisionary_test_utils::aws::test_base_name;
///
/// let base = test_base_name();
/// assert!(base.starts_with("provisionary-test-"));
/// ```
pub fn test_base_name() -> String {
    format!("provisionary-{}", test_run_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_format() {
        let run_id = test_run_id();
        assert!(run_id.starts_with("test-"));
        // Format: test-{timestamp_ms}-{counter}
        let parts: Vec<&str> = run_id.strip_prefix("test-").unwrap().split('-').collect();
        assert_eq!(parts.len(), 2);
        parts[0].parse::<i64>().expect("Should be valid timestamp");
        parts[1].parse::<u32>().expect("Should be valid counter");
    }

    #[test]
    fn test_run_id_unique() {
        let id1 = test_run_id();
        let id2 = test_run_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_base_name_fits_bucket_limit() {
        let base = test_base_name();
        assert!(base.starts_with("provisionary-test-"));
        // Longest suffix is "-acceptance"/"-production" (11 chars), bucket limit is 63
        assert!(base.len() + 11 <= 63, "{base} is too long for a bucket name");
    }
}
