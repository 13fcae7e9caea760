use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        principal::{Principal, Role},
        repo_types::User,
    },
    db::{Db, StorageError},
    error::AppError,
};

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@-]{1,64}$").unwrap();
    // Verified against when the username is unknown, so both failure paths
    // do the same work.
    static ref DUMMY_HASH: String = hash_password("dummy-password").unwrap_or_default();
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

#[instrument(skip(db, password))]
pub async fn authenticate(db: &Db, username: &str, password: &str) -> Result<Principal, AppError> {
    let Some(user) = User::find_by_username(db, username).await? else {
        let _ = verify_password(password, &DUMMY_HASH);
        warn!("login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, role = %user.role, "user logged in");
    Ok(user.into())
}

#[instrument(skip(db, password))]
pub async fn register(
    db: &Db,
    username: &str,
    password: &str,
    role: Role,
) -> Result<Principal, AppError> {
    let username = username.trim();
    if !is_valid_username(username) {
        return Err(AppError::BadRequest("Invalid username".into()));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".into()));
    }

    if User::find_by_username(db, username).await?.is_some() {
        warn!("username already registered");
        return Err(AppError::DuplicateUsername);
    }

    let hash = hash_password(password)?;
    let user = match User::create(db, username, &hash, role).await {
        Ok(u) => u,
        // Lost a race with a concurrent registration.
        Err(StorageError::ConstraintViolation(_)) => return Err(AppError::DuplicateUsername),
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, role = %user.role, "user registered");
    Ok(user.into())
}

pub async fn load_principal(db: &Db, id: i64) -> Result<Option<Principal>, AppError> {
    Ok(User::find_by_id(db, id).await?.map(Principal::from))
}
