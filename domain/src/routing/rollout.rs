//! Percentage rollout gate.
//!
//! Users are bucketed into percentiles 0..=99 by a polynomial rolling hash
//! over their id's UTF-16 code units (`h = h * 31 + unit`, 32-bit signed
//! wraparound, absolute value). The same user always lands in the same
//! bucket, so raising the rollout percentage only ever admits new users.

/// Stable percentile in `0..100` for a user id.
pub fn rollout_percentile(user_id: &str) -> u32 {
    let hash = user_id.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs() % 100
}

/// A user is admitted when their percentile is strictly below the rollout.
pub fn is_in_rollout(user_id: &str, rollout_percentage: u32) -> bool {
    rollout_percentile(user_id) < rollout_percentage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_percentiles() {
        assert_eq!(rollout_percentile("abc"), 54);
        assert_eq!(rollout_percentile("alice"), 40);
        assert_eq!(rollout_percentile("bob"), 17);
        assert_eq!(rollout_percentile(""), 0);
    }

    #[test]
    fn test_wraparound_uses_absolute_value() {
        // Both ids overflow into negative 32-bit hashes
        assert_eq!(rollout_percentile("user-123"), 72);
        assert_eq!(rollout_percentile("user-42"), 56);
        assert_eq!(
            rollout_percentile("a very long user identifier that wraps around 32 bits"),
            71
        );
    }

    #[test]
    fn test_percentile_is_deterministic() {
        for id in ["alice", "bob", "user-123", "日本語ユーザー"] {
            let first = rollout_percentile(id);
            for _ in 0..10 {
                assert_eq!(rollout_percentile(id), first);
            }
            assert!(first < 100);
        }
    }

    #[test]
    fn test_rollout_bounds() {
        assert!(!is_in_rollout("bob", 0));
        assert!(!is_in_rollout("bob", 17));
        assert!(is_in_rollout("bob", 18));
        assert!(is_in_rollout("user-123", 100));
    }
}
