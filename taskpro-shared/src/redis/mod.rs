/// Redis integration
///
/// Used for the session revocation list and the health check.
///
/// ```text
/// logout ──SET revoked:{jti} 1 EX ttl──> Redis
/// auth   ──EXISTS revoked:{jti}───────> Redis
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
