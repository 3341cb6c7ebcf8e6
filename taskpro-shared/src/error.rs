/// Common error taxonomy for identity and hierarchy operations
///
/// Every core operation fails fast with one of these kinds. The HTTP layer maps
/// each kind to a status code; nothing downstream ever inspects message text to
/// decide how to react.
///
/// | Kind              | Meaning                                          | HTTP |
/// |-------------------|--------------------------------------------------|------|
/// | `Validation`      | Missing or malformed input                       | 400  |
/// | `Conflict`        | Uniqueness violation (email, board/column name)  | 409  |
/// | `Auth`            | Bad credentials, bad/expired/revoked session     | 401  |
/// | `NotFound`        | Entity absent or not owned by the caller         | 404  |
/// | `AlreadyVerified` | Verification requested for a verified account    | 400  |
/// | `Upstream`        | Store, mail or asset-storage failure             | 500  |

use crate::assets::AssetError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::redis::client::RedisClientError;

/// Result alias used by the identity service and the hierarchy coordinator
pub type CoreResult<T> = Result<T, CoreError>;

/// Tagged error kinds for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authentication failure
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// Entity does not exist (or is not visible to the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Verification already completed
    #[error("Already verified: {0}")]
    AlreadyVerified(String),

    /// Store or collaborator failure
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl CoreError {
    /// Client-safe message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            CoreError::Validation(msg)
            | CoreError::Conflict(msg)
            | CoreError::Auth(msg)
            | CoreError::NotFound(msg)
            | CoreError::AlreadyVerified(msg)
            | CoreError::Upstream(msg) => msg,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }
}

/// Maps a named unique constraint to the conflict message shown to clients
fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_unique" => "Email already in use",
        "boards_user_name_unique" => "Board name already in use",
        "columns_board_name_unique" => "Column name already in use",
        _ => "Resource already exists",
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    let message = db_err.constraint().map(conflict_message).unwrap_or("Resource already exists");
                    return CoreError::Conflict(message.to_string());
                }
                if db_err.is_check_violation() {
                    return CoreError::Validation(format!("Constraint violated: {}", db_err));
                }
                // string_data_right_truncation
                if db_err.code().as_deref() == Some("22001") {
                    return CoreError::Validation("Value too long".to_string());
                }
                CoreError::Upstream(format!("Database error: {}", db_err))
            }
            other => CoreError::Upstream(format!("Database error: {}", other)),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        CoreError::Validation(format!("Invalid or missing fields: {}", fields.join(", ")))
    }
}

impl From<PasswordError> for CoreError {
    fn from(err: PasswordError) -> Self {
        CoreError::Upstream(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for CoreError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => CoreError::Auth("Token expired".to_string()),
            JwtError::CreateError(msg) => CoreError::Upstream(msg),
            _ => CoreError::Auth("Invalid token".to_string()),
        }
    }
}

impl From<RedisClientError> for CoreError {
    fn from(err: RedisClientError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

impl From<AssetError> for CoreError {
    fn from(err: AssetError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}
