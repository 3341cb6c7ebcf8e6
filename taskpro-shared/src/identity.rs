/// Identity service: registration, email verification, sessions and profiles.
///
/// Sessions are stateless tokens (see [`crate::auth::session`]); the user row
/// is never written on login or logout apart from `last_login_at`.

use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

use crate::assets::{AssetStore, AssetUpload};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SessionManager;
use crate::error::{CoreError, CoreResult};
use crate::mail::{verification_link, Mailer};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Length of a verification token
pub const VERIFICATION_TOKEN_LENGTH: usize = 21;

/// Folder avatars are uploaded into
pub const AVATAR_FOLDER: &str = "avatars";

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const WRONG_CREDENTIALS: &str = "Email or password is wrong";

/// Generates a URL-safe verification token.
#[must_use]
pub fn generate_verification_token() -> String {
    let mut rng = rand::thread_rng();
    (0..VERIFICATION_TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Public view of a user; carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
    pub avatar: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

/// Signup input
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Login input
#[derive(Debug, Clone, Validate)]
pub struct LoginCredentials {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub token: String,
    /// Token expiry, milliseconds since the Unix epoch
    pub expires_at: i64,
}

/// Profile changes; `None` fields are left alone
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6))]
    pub password: Option<String>,

    pub avatar: Option<AssetUpload>,
}

/// Settings the identity service needs from configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Base URL verification links are built from
    pub public_base_url: String,

    /// Avatar assigned at signup
    pub default_avatar_url: String,
}

/// User-facing account operations
#[derive(Clone)]
pub struct IdentityService {
    db: PgPool,
    sessions: SessionManager,
    mailer: Arc<dyn Mailer>,
    assets: Arc<dyn AssetStore>,
    config: Arc<IdentityConfig>,
}

impl IdentityService {
    pub fn new(
        db: PgPool,
        sessions: SessionManager,
        mailer: Arc<dyn Mailer>,
        assets: Arc<dyn AssetStore>,
        config: IdentityConfig,
    ) -> Self {
        Self {
            db,
            sessions,
            mailer,
            assets,
            config: Arc::new(config),
        }
    }

    /// Session manager shared with the HTTP auth layer
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Creates an unverified account and mails the verification link
    ///
    /// # Errors
    ///
    /// `Validation` for a missing or malformed field, `Conflict` if the email
    /// is already registered.
    pub async fn register(&self, input: Registration) -> CoreResult<Identity> {
        input.validate()?;
        let name = display_name(&input.name)?;

        let password_hash = hash_blocking(input.password).await?;
        let verification_token = generate_verification_token();

        let user = User::create(
            &self.db,
            CreateUser {
                email: input.email.trim().to_string(),
                password_hash,
                name,
                avatar_url: self.config.default_avatar_url.clone(),
                verification_token: verification_token.clone(),
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.dispatch_verification(&user.email, &verification_token);

        Ok(Identity::from(&user))
    }

    /// Checks credentials and issues a session
    ///
    /// # Errors
    ///
    /// `Auth` for an unknown email or wrong password, and a distinct `Auth`
    /// message for an unverified account.
    pub async fn authenticate(&self, input: LoginCredentials) -> CoreResult<LoginOutcome> {
        input.validate()?;

        let user = User::find_by_email(&self.db, input.email.trim())
            .await?
            .ok_or_else(|| CoreError::Auth(WRONG_CREDENTIALS.to_string()))?;

        if !verify_blocking(input.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(CoreError::Auth(WRONG_CREDENTIALS.to_string()));
        }

        if !user.verified {
            return Err(CoreError::Auth(
                "Before login you have to verify your email address".to_string(),
            ));
        }

        let session = self.sessions.issue(user.id)?;
        User::touch_last_login(&self.db, user.id).await?;

        tracing::info!(user_id = %user.id, session_id = %session.session_id, "User logged in");

        Ok(LoginOutcome {
            identity: Identity::from(&user),
            token: session.token,
            expires_at: session.expires_at,
        })
    }

    /// Ends the session the token belongs to
    pub async fn end_session(&self, token: &str) -> CoreResult<()> {
        let claims = self.sessions.verify(token).await?;
        self.sessions.revoke(claims.jti, claims.exp).await?;

        tracing::info!(user_id = %claims.sub, session_id = %claims.jti, "User logged out");
        Ok(())
    }

    /// Identity behind a session token
    ///
    /// # Errors
    ///
    /// `Auth` for a bad token, `NotFound` if the user no longer exists.
    pub async fn current_identity(&self, token: &str) -> CoreResult<Identity> {
        let claims = self.sessions.verify(token).await?;
        let user = self.load_user(claims.sub).await?;
        Ok(Identity::from(&user))
    }

    /// Completes email verification
    pub async fn verify(&self, verification_token: &str) -> CoreResult<()> {
        let user = User::verify_by_token(&self.db, verification_token)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(())
    }

    /// Re-sends the pending verification link
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown email, `AlreadyVerified` when nothing is
    /// pending.
    pub async fn resend_verification(&self, email: &str) -> CoreResult<()> {
        if email.trim().is_empty() {
            return Err(CoreError::validation("Missing required field email"));
        }

        let user = User::find_by_email(&self.db, email.trim())
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        let token = match (&user.verification_token, user.verified) {
            (Some(token), false) => token.clone(),
            _ => {
                return Err(CoreError::AlreadyVerified(
                    "Verification has already been passed".to_string(),
                ))
            }
        };

        self.dispatch_verification(&user.email, &token);
        Ok(())
    }

    /// Applies the provided profile fields
    ///
    /// A new password is re-hashed; a new avatar is uploaded first and only
    /// its URL is stored.
    pub async fn update_profile(&self, token: &str, update: ProfileUpdate) -> CoreResult<Identity> {
        let claims = self.sessions.verify(token).await?;
        update.validate()?;
        let name = update.name.as_deref().map(display_name).transpose()?;

        let user = self.load_user(claims.sub).await?;

        let password_hash = match update.password {
            Some(password) => Some(hash_blocking(password).await?),
            None => None,
        };

        let avatar_url = match update.avatar {
            Some(upload) => Some(self.assets.upload(AVATAR_FOLDER, upload).await?),
            None => None,
        };

        let changes = UpdateUser {
            email: update.email.map(|e| e.trim().to_string()),
            password_hash,
            name,
            avatar_url,
        };

        if changes.is_empty() {
            return Ok(Identity::from(&user));
        }

        let updated = User::update(&self.db, user.id, changes)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(Identity::from(&updated))
    }

    async fn load_user(&self, user_id: uuid::Uuid) -> CoreResult<User> {
        User::find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))
    }

    /// Sends verification mail in the background; failures are only logged.
    fn dispatch_verification(&self, email: &str, token: &str) {
        let mailer = Arc::clone(&self.mailer);
        let link = verification_link(&self.config.public_base_url, token);
        let to = email.to_string();

        tokio::spawn(async move {
            if let Err(e) = mailer.send_verification(&to, &link).await {
                tracing::warn!(to = %to, error = %e, "Failed to send verification email");
            }
        });
    }
}

/// Trims a display name; a name that is only whitespace counts as missing.
fn display_name(name: &str) -> CoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Missing required field name".to_string()));
    }
    Ok(trimmed.to_string())
}

async fn hash_blocking(password: String) -> CoreResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::Upstream(format!("Password hashing task failed: {}", e)))?
        .map_err(CoreError::from)
}

async fn verify_blocking(password: String, hash: String) -> CoreResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| CoreError::Upstream(format!("Password check task failed: {}", e)))?
        .map_err(CoreError::from)
}
