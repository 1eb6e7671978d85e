use chrono::Duration;
use tracing::{info, warn};

use crate::store::Store;
use crate::structs::actor::{Actor, AuthUser};
use crate::structs::permission::Permission;
use crate::structs::user::User;
use crate::utils::app_error::AppError;
use crate::utils::register::verify_password;
use crate::utils::token::{Token, TokenPurpose};
use crate::AppState;

/// What a client presented to prove who it is.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password { email: String, password: String },
    Token(String),
}

/// Pairs a user with its role.
pub async fn load_auth_user<S>(store: &S, user: User) -> Result<AuthUser, AppError>
where
    S: Store + ?Sized,
{
    let role = match user.role_id {
        Some(role_id) => store.role_by_id(role_id).await?,
        None => None,
    };
    Ok(AuthUser { user, role })
}

/// Resolves the current actor. No credentials means anonymous, bad ones are rejected.
pub async fn authentificate<S>(
    app_state: &AppState<S>,
    credentials: Option<Credentials>,
) -> Result<Actor, AppError>
where
    S: Store + ?Sized,
{
    let store = app_state.store.as_ref();
    let user = match credentials {
        None => return Ok(Actor::Anonymous),
        Some(Credentials::Token(token)) => match verify_auth_token(app_state, &token).await {
            Ok(user) => user,
            Err(e @ (AppError::InvalidToken | AppError::ExpiredToken)) => {
                warn!("Rejected auth token : {e}");
                return Err(AppError::Unauthorized);
            }
            Err(e) => return Err(e),
        },
        Some(Credentials::Password { email, password }) => {
            let email = email.to_lowercase();
            let user = store.user_by_email(&email).await?.ok_or_else(|| {
                warn!("Unknown email `{email}`");
                AppError::IncorrectCredentials
            })?;
            if !verify_password(&password, &user.password_hash)? {
                warn!("Wrong password for @{}", user.username);
                return Err(AppError::IncorrectCredentials);
            }
            user
        }
    };

    Ok(Actor::Authenticated(load_auth_user(store, user).await?))
}

/// Anonymous actors are unauthorized, signed-in ones lacking `permission` forbidden.
pub fn require_permission(actor: &Actor, permission: Permission) -> Result<&AuthUser, AppError> {
    match actor {
        Actor::Anonymous => Err(AppError::Unauthorized),
        Actor::Authenticated(auth_user) if auth_user.can(permission) => Ok(auth_user),
        Actor::Authenticated(auth_user) => {
            warn!(
                "@{} is missing permission {:?}",
                auth_user.user.username, permission
            );
            Err(AppError::MissingPermission(permission))
        }
    }
}

pub fn require_confirmed(actor: &Actor) -> Result<&AuthUser, AppError> {
    match actor {
        Actor::Anonymous => Err(AppError::Unauthorized),
        Actor::Authenticated(auth_user) if auth_user.user.confirmed => Ok(auth_user),
        Actor::Authenticated(auth_user) => {
            warn!("@{} has not confirmed the account", auth_user.user.username);
            Err(AppError::AccountNotConfirmed)
        }
    }
}

pub fn generate_confirmation_token<S>(app_state: &AppState<S>, user: &User) -> String
where
    S: ?Sized,
{
    Token::create(
        user.id.to_string(),
        TokenPurpose::Confirm,
        Duration::seconds(app_state.config.confirmation_ttl),
        &app_state.cipher,
    )
}

/// Marks the account confirmed if the token was issued for this very user.
pub async fn confirm<S>(app_state: &AppState<S>, user: &mut User, token: &str) -> Result<bool, AppError>
where
    S: Store + ?Sized,
{
    let sub = match Token::decode(token, TokenPurpose::Confirm, &app_state.cipher) {
        Ok(sub) => sub,
        Err(AppError::InvalidToken | AppError::ExpiredToken) => return Ok(false),
        Err(e) => return Err(e),
    };
    if sub != user.id.to_string() {
        warn!("Confirmation token of user {sub} presented by user {}", user.id);
        return Ok(false);
    }

    app_state.store.set_confirmed(user.id, true).await?;
    user.confirmed = true;
    info!("@{} confirmed the account", user.username);
    Ok(true)
}

pub fn generate_auth_token<S>(app_state: &AppState<S>, user: &User) -> String
where
    S: ?Sized,
{
    Token::create(
        user.id.to_string(),
        TokenPurpose::Auth,
        Duration::seconds(app_state.config.auth_token_ttl),
        &app_state.cipher,
    )
}

pub async fn verify_auth_token<S>(app_state: &AppState<S>, token: &str) -> Result<User, AppError>
where
    S: Store + ?Sized,
{
    let sub = Token::decode(token, TokenPurpose::Auth, &app_state.cipher)?;
    let user_id: i64 = sub.parse().map_err(|e| {
        warn!("Auth token subject `{sub}` is not an id : {e}");
        AppError::InvalidToken
    })?;
    app_state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or(AppError::InvalidToken)
}
