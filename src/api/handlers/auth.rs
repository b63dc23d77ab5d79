use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use tower_cookies::{Cookie, Cookies};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::api::handlers::AppState;
use crate::api::models::*;
use crate::auth::{jwt, password, AuthUser};
use crate::db::{self, models::NewUser};
use crate::error::{Error, Result};

const TOKEN_COOKIE: &str = "access_token";

/// POST /api/v1/auth/register - Create a password account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let email = request.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(Error::Validation("Invalid email address".to_string()));
    }
    if request.password.len() < 8 {
        return Err(Error::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let hashed_password = password::hash_password(&request.password)?;

    let user = db::users::create_user(
        &state.pool,
        &NewUser {
            email,
            hashed_password,
            full_name: request.full_name,
            is_superuser: false,
            is_verified: false,
            google_id: None,
        },
    )
    .await?;

    info!("User {} has registered", user.id);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/jwt/login - Password login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let email = request.email.trim().to_lowercase();

    let user = db::users::get_user_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| Error::Auth("Invalid credentials".to_string()))?;

    if !password::verify_password(&request.password, &user.hashed_password) {
        return Err(Error::Auth("Invalid credentials".to_string()));
    }

    if !user.is_active {
        return Err(Error::Auth("Inactive user".to_string()));
    }

    let access_token = jwt::create_access_token(
        &state.settings.auth.secret_key,
        user.id,
        state.settings.auth.access_token_expire_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /api/v1/auth/jwt/logout - Clear the token cookie.
/// Deliberately unauthenticated: an expired session can still log out.
pub async fn logout(cookies: Cookies) -> Json<MessageResponse> {
    let mut cookie = Cookie::new(TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    })
}

/// GET /api/v1/auth/verify-token - Confirm a token resolves to a live account
pub async fn verify_token(AuthUser(user): AuthUser) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        authenticated: true,
        user_id: user.id,
        email: user.email,
        full_name: user.full_name,
        is_active: user.is_active,
        is_verified: user.is_verified,
    })
}

/// POST /api/v1/auth/google/login - Start the Google OAuth flow
pub async fn google_login(
    State(state): State<AppState>,
    Json(request): Json<GoogleLoginRequest>,
) -> Result<Json<GoogleLoginResponse>> {
    let csrf_state = Uuid::new_v4().simple().to_string();

    let authorization_url = state
        .google
        .authorization_url(request.redirect_uri.as_deref(), &csrf_state)?;

    Ok(Json(GoogleLoginResponse { authorization_url }))
}

/// GET /api/v1/auth/google/callback - Finish the Google OAuth flow.
/// Creates the account on first login, links the Google identity on
/// subsequent ones, then hands the browser back to the frontend.
pub async fn google_callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<GoogleCallbackParams>,
) -> Result<Redirect> {
    if let Some(error) = params.error {
        return Err(Error::Validation(format!("Google OAuth error: {error}")));
    }

    let code = params
        .code
        .ok_or_else(|| Error::Validation("Missing authorization code".to_string()))?;

    let profile = state.google.exchange_code(&code).await?;

    let email = profile
        .email
        .ok_or_else(|| Error::Validation("Email not provided by Google".to_string()))?
        .to_lowercase();

    let user = match db::users::get_user_by_email(&state.pool, &email).await? {
        Some(existing) => {
            db::users::link_google_account(
                &state.pool,
                existing.id,
                &profile.sub,
                profile.name.as_deref(),
            )
            .await?
        }
        None => {
            // Google already verified the address; no password on this account
            db::users::create_user(
                &state.pool,
                &NewUser {
                    email: email.clone(),
                    hashed_password: String::new(),
                    full_name: profile.name,
                    is_superuser: false,
                    is_verified: true,
                    google_id: Some(profile.sub),
                },
            )
            .await?
        }
    };

    let token = jwt::create_access_token(
        &state.settings.auth.secret_key,
        user.id,
        state.settings.auth.access_token_expire_minutes,
    )?;

    // Cookie as a backup delivery path next to the redirect query
    let mut cookie = Cookie::new(TOKEN_COOKIE, format!("Bearer {token}"));
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    let mut redirect_url = Url::parse(&state.settings.server.frontend_url)?;
    redirect_url.set_path("/auth/google-callback");
    redirect_url
        .query_pairs_mut()
        .append_pair("access_token", &token)
        .append_pair("token_type", "bearer")
        .append_pair("user_id", &user.id.to_string())
        .append_pair("email", &email);

    info!("Google login completed for user {}", user.id);

    Ok(Redirect::to(redirect_url.as_str()))
}
