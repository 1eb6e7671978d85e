use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use email_address::EmailAddress;
use tracing::{info, warn};

use crate::store::Store;
use crate::structs::register_user::RegisterUser;
use crate::structs::user::{NewUser, User};
use crate::utils::app_error::AppError;
use crate::AppState;

pub const ADMINISTRATOR_ROLE: &str = "Administrator";

pub fn check_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > 64 {
        warn!("Wrong username size : {username}");
        return Err(AppError::InvalidUsername(
            "Usernames must contain between 1 and 64 characters",
        ));
    }

    for (i, c) in username.char_indices() {
        if i == 0 {
            if !c.is_ascii_alphabetic() {
                warn!("The username has to begin with a letter : {username}");
                return Err(AppError::InvalidUsername(
                    "Usernames must begin with a letter",
                ));
            }
            continue;
        }
        if !c.is_ascii_alphanumeric() && c != '_' && c != '.' {
            warn!("The username has to contain only letters, digits, dots and underscores : {username}");
            return Err(AppError::InvalidUsername(
                "Usernames must have only letters, numbers, dots or underscores",
            ));
        }
    }

    Ok(())
}

pub fn check_email_address(email: &str) -> Result<(), AppError> {
    if email.len() > 64 || !EmailAddress::is_valid(email) {
        warn!("Invalid email `{email}`");
        return Err(AppError::InvalidEmail);
    }
    Ok(())
}

pub fn check_register_infos(user: &RegisterUser) -> Result<(), AppError> {
    check_username(&user.username)?;

    check_email_address(&user.email)?;

    if user.password.chars().count() < 8 {
        warn!("Password too short for {}", user.username);
        return Err(AppError::PasswordTooShort);
    }

    Ok(())
}

/// Hashes a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            warn!("Error hashing password : {e}");
            AppError::InternalServerError
        })
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| {
        warn!("Stored password hash is malformed : {e}");
        AppError::InternalServerError
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Creates an unconfirmed account following itself.
///
/// The configured admin address gets the administrator role, everyone else the
/// default role.
pub async fn register<S>(app_state: &AppState<S>, mut register_user: RegisterUser) -> Result<User, AppError>
where
    S: Store + ?Sized,
{
    register_user.username = register_user.username.to_lowercase();
    register_user.email = register_user.email.to_lowercase();
    check_register_infos(&register_user)?;

    let store = app_state.store.as_ref();

    //Check if email is already used
    if store.user_by_email(&register_user.email).await?.is_some() {
        warn!("Email address `{}` already used", register_user.email);
        return Err(AppError::EmailAddressAlreadyUsed);
    }

    //Check if username is already used
    if store.user_by_username(&register_user.username).await?.is_some() {
        warn!("Username `{}` already used", register_user.username);
        return Err(AppError::UsernameAlreadyUsed);
    }

    let role = if app_state.config.admin_email.as_deref() == Some(register_user.email.as_str()) {
        store
            .role_by_name(ADMINISTRATOR_ROLE)
            .await?
            .ok_or_else(|| AppError::UnknownRole(ADMINISTRATOR_ROLE.to_string()))?
    } else {
        crate::utils::roles::default_role(store).await?
    };

    let password_hash = hash_password(&register_user.password)?;

    let user = store
        .create_user_following_self(NewUser {
            email: register_user.email,
            username: register_user.username,
            password_hash,
            role_id: Some(role.id),
        })
        .await?;

    info!("Registered @{} with role {}", user.username, role.name);
    Ok(user)
}
