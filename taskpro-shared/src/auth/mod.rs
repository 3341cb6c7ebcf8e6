/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: session token signing and validation
/// - [`revocation`]: Redis list of ended sessions
/// - [`session`]: issue / verify / revoke, combining the two above
/// - [`middleware`]: bearer token extraction and `AuthContext`
///
/// # Example
///
/// ```no_run
/// use taskpro_shared::auth::password::{hash_password, verify_password};
/// use taskpro_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4()), "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod revocation;
pub mod session;
