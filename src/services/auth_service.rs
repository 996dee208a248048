use axum_extra::extract::cookie::Cookie;
use rand::{Rng, distr::Alphanumeric};

use crate::{
    error::{AppError, Result},
    models::User,
    repositories::UserStore,
};

pub const AUTH_COOKIE: &str = "authToken";

const SESSION_TOKEN_LENGTH: usize = 64;

/// Returns the user only if it exists, is active and `password` matches its hash.
pub async fn authenticate(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let Some(user) = users.find_by_username(username).await? else {
        return Ok(None);
    };

    if !user.is_active {
        return Ok(None);
    }

    let is_valid = bcrypt::verify(password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    Ok(is_valid.then_some(user))
}

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
}

pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(false)
        .build()
}

/// An expired, empty `authToken` cookie that makes the browser drop its copy.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((AUTH_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::repositories::MemoryUserStore;

    #[test]
    fn session_tokens_are_long_and_distinct() {
        let tokens: HashSet<String> = (0..32).map(|_| generate_session_token()).collect();

        assert_eq!(tokens.len(), 32);
        assert!(
            tokens
                .iter()
                .all(|t| t.len() == SESSION_TOKEN_LENGTH && t.chars().all(|c| c.is_ascii_alphanumeric()))
        );
    }

    #[test]
    fn session_cookie_is_http_only_on_root_path() {
        let cookie = session_cookie("abc".to_string());

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_some_and(|age| age.is_zero()));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let users = MemoryUserStore::new();
        let hash = bcrypt::hash("secret", 4).unwrap();
        users.create("alice", &hash, true).await.unwrap();

        let found = authenticate(&users, "alice", "secret").await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("alice".to_string()));

        assert!(authenticate(&users, "alice", "wrong").await.unwrap().is_none());
        assert!(authenticate(&users, "bob", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_users_cannot_authenticate() {
        let users = MemoryUserStore::new();
        let hash = bcrypt::hash("secret", 4).unwrap();
        users.create("alice", &hash, true).await.unwrap();

        assert!(users.set_active("alice", false));
        assert!(authenticate(&users, "alice", "secret").await.unwrap().is_none());

        assert!(users.set_active("alice", true));
        assert!(authenticate(&users, "alice", "secret").await.unwrap().is_some());

        assert!(!users.set_active("bob", false));
    }
}
