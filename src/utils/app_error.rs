use crate::structs::permission::Permission;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    //Token errors
    #[error("Invalid token")]
    InvalidToken,
    #[error("Expired token")]
    ExpiredToken,
    //Authentication errors
    #[error("Invalid credentials")]
    IncorrectCredentials,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Account not confirmed")]
    AccountNotConfirmed,
    #[error("Missing permission {0:?}")]
    MissingPermission(Permission),
    #[error("Not allowed to modify this resource")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    //Register errors
    #[error("{0}")]
    InvalidUsername(&'static str),
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must contain at least 8 characters")]
    PasswordTooShort,
    #[error("Email address already used")]
    EmailAddressAlreadyUsed,
    #[error("Username already used")]
    UsernameAlreadyUsed,
    //Content errors
    #[error("Post body is empty")]
    EmptyPostBody,
    #[error("Comment body is empty")]
    EmptyCommentBody,
    //Role configuration errors
    #[error("No role is flagged as default")]
    NoDefaultRole,
    #[error("Unknown role `{0}`")]
    UnknownRole(String),
    #[error("Invalid role table: {0}")]
    InvalidRoleTable(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Status an HTTP layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidUsername(_)
            | AppError::InvalidEmail
            | AppError::PasswordTooShort
            | AppError::EmptyPostBody
            | AppError::EmptyCommentBody => 400,
            AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::IncorrectCredentials
            | AppError::Unauthorized => 401,
            AppError::AccountNotConfirmed
            | AppError::MissingPermission(_)
            | AppError::Forbidden => 403,
            AppError::NotFound(_) | AppError::UnknownRole(_) => 404,
            AppError::EmailAddressAlreadyUsed | AppError::UsernameAlreadyUsed => 409,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::NoDefaultRole
            | AppError::InvalidRoleTable(_)
            | AppError::Config(_)
            | AppError::InternalServerError => 500,
        }
    }

    /// Short error label, as used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self.status_code() {
            400 => "bad request",
            401 => "unauthorized",
            403 => "forbidden",
            404 => "not found",
            409 => "conflict",
            _ => "internal server error",
        }
    }
}
