/// Session revocation list in Redis
///
/// Logging out stores `revoked:{session_id}` with a TTL equal to the token's
/// remaining lifetime, so entries disappear once the token would have expired
/// anyway.

use uuid::Uuid;

use crate::redis::client::{RedisClient, RedisClientError};

const KEY_PREFIX: &str = "revoked:";

/// Redis key for a revoked session
pub fn revocation_key(session_id: Uuid) -> String {
    format!("{}{}", KEY_PREFIX, session_id)
}

/// Revoked session IDs
#[derive(Clone)]
pub struct RevocationList {
    redis: RedisClient,
}

impl RevocationList {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    /// Marks a session revoked for `ttl_secs`
    pub async fn revoke(&self, session_id: Uuid, ttl_secs: u64) -> Result<(), RedisClientError> {
        self.redis
            .set_with_expiry(&revocation_key(session_id), "1", ttl_secs)
            .await
    }

    /// Whether the session was revoked
    pub async fn is_revoked(&self, session_id: Uuid) -> Result<bool, RedisClientError> {
        self.redis.exists(&revocation_key(session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revocation_key_format() {
        let id = Uuid::parse_str("6f1c2b8e-0a4d-4a5b-9c3e-1d2f3a4b5c6d").unwrap();
        assert_eq!(
            revocation_key(id),
            "revoked:6f1c2b8e-0a4d-4a5b-9c3e-1d2f3a4b5c6d"
        );
    }
}
