//! Key and value encoding shared by every warning store backend.
//!
//! One entry per user: key `"<stable-user-id>_warnings"`, value the count as
//! decimal text.

use crate::identity::UserId;

use super::StoreError;

/// Column family used by the RocksDB backend
pub const CF_WARNINGS: &str = "warnings";

/// Suffix appended to the user id to form the storage key
pub const KEY_SUFFIX: &str = "_warnings";

/// Storage key for a user's warning count
pub fn key(user: &UserId) -> String {
    format!("{}{}", user.as_str(), KEY_SUFFIX)
}

/// Recover the user id from a storage key
pub fn parse_key(key: &str) -> Option<UserId> {
    key.strip_suffix(KEY_SUFFIX)
        .filter(|id| !id.is_empty())
        .map(UserId::new)
}

/// Encode a count as stored text
pub fn encode(count: u32) -> String {
    count.to_string()
}

/// Decode stored text. A missing value is a count of 0.
pub fn decode(key: &str, value: Option<&str>) -> Result<u32, StoreError> {
    match value {
        None => Ok(0),
        Some(text) => text.trim().parse().map_err(|_| StoreError::Corrupt {
            key: key.to_string(),
            value: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        assert_eq!(key(&UserId::new("t2_abc123")), "t2_abc123_warnings");
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("t2_abc_warnings"), Some(UserId::new("t2_abc")));
        assert_eq!(parse_key("_warnings"), None);
        assert_eq!(parse_key("t2_abc"), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("k", None).unwrap(), 0);
        assert_eq!(decode("k", Some("7")).unwrap(), 7);
        assert!(matches!(
            decode("k", Some("-1")),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(decode("k", Some("three")).is_err());
    }
}
