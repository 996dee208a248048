use axum::{Json, extract::State, extract::rejection::JsonRejection};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{LoginRequest, LoginResponse, LogoutResponse},
    services::auth_service::{self, AUTH_COOKIE},
};

/// A body that is missing or not JSON reads as empty credentials.
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let LoginRequest { username, password } = payload.map(|Json(p)| p).unwrap_or_default();
    let username = username.unwrap_or_default();
    let password = password.unwrap_or_default();

    let user = if username.is_empty() || password.is_empty() {
        None
    } else {
        auth_service::authenticate(state.users.as_ref(), &username, &password).await?
    };

    let Some(user) = user else {
        tracing::warn!("Rejected login for {:?}: invalid credentials", username);
        return Err(AppError::BadRequest("Invalid credentials".to_string()));
    };

    if !user.is_staff {
        tracing::warn!("Rejected login for {}: not a staff member", user.username);
        return Err(AppError::Forbidden(
            "Access denied. Staff only.".to_string(),
        ));
    }

    let token = auth_service::generate_session_token();
    state.sessions.create(&token, user.id).await?;

    tracing::info!("User {} logged in", user.username);

    Ok((
        jar.add(auth_service::session_cookie(token)),
        Json(LoginResponse {
            is_staff: true,
            message: "Login successful".to_string(),
        }),
    ))
}

/// Always succeeds: a missing or unknown session is simply nothing to end.
pub async fn logout_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(token) = jar.get(AUTH_COOKIE).map(|cookie| cookie.value().to_string()) {
        end_session(&state, &token).await;
    }

    (
        jar.add(auth_service::removal_cookie()),
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

async fn end_session(state: &AppState, token: &str) {
    match state.sessions.validate(token).await {
        Ok(Some(session)) => match state.users.find_by_id(session.user_id).await {
            Ok(Some(user)) => tracing::info!("User {} logged out", user.username),
            Ok(None) => tracing::info!("Session for deleted user {} ended", session.user_id),
            Err(e) => tracing::error!("Failed to look up user {}: {}", session.user_id, e),
        },
        Ok(None) => tracing::debug!("Logout with unknown session token"),
        Err(e) => tracing::error!("Failed to validate session: {}", e),
    }

    if let Err(e) = state.sessions.destroy(token).await {
        tracing::error!("Failed to destroy session: {}", e);
    }
}
