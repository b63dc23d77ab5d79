use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_cookies::Cookies;

use crate::api::handlers::AppState;
use crate::auth::jwt;
use crate::db::{self, models::User};
use crate::error::Error;

/// The authenticated user behind a request.
///
/// The token is taken from the `Authorization: Bearer` header first, then the
/// `token`/`access_token` query parameters (used by the WebSocket route), then
/// the `access_token` cookie set by the OAuth callback.
pub struct AuthUser(pub User);

/// An authenticated superuser; rejects with 403 otherwise
pub struct SuperUser(pub User);

fn token_from_parts(parts: &Parts, cookies: Option<&Cookies>) -> Option<String> {
    // Authorization header
    if let Some(value) = parts.headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    // Query parameters
    if let Some(query) = parts.uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "token" || key == "access_token" {
                return Some(value.into_owned());
            }
        }
    }

    // Cookie, possibly stored with its Bearer prefix
    if let Some(cookies) = cookies {
        if let Some(cookie) = cookies.get("access_token") {
            let raw = cookie.value();
            let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
            return Some(token.to_string());
        }
    }

    None
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await.ok();

        let token = token_from_parts(parts, cookies.as_ref())
            .ok_or_else(|| Error::Auth("Not authenticated".to_string()))?;

        let user_id = jwt::decode_access_token(&state.settings.auth.secret_key, &token)?;

        let user = db::users::get_user(&state.pool, user_id)
            .await
            .map_err(|_| Error::Auth("User not found".to_string()))?;

        if !user.is_active {
            return Err(Error::Auth("Inactive user".to_string()));
        }

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SuperUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_superuser {
            return Err(Error::Forbidden(
                "Not enough permissions. Admin access required.".to_string(),
            ));
        }

        Ok(SuperUser(user))
    }
}
