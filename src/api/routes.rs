use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

#[cfg(not(test))]
use {
    std::net::IpAddr,
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
};

use crate::api::handlers::{
    self, auth, categories, chatbot, dashboard, expenses, goals, notifications, transactions,
    users, AppState,
};
use crate::config::Settings;

/// Create the router with all endpoints
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    // Credential endpoints get their own rate limit
    #[cfg_attr(test, allow(unused_mut))]
    let mut auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/jwt/login", post(auth::login))
        .route("/auth/jwt/logout", post(auth::logout))
        .route("/auth/verify-token", get(auth::verify_token))
        .route("/auth/google/login", post(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback));

    // NOTE: Rate limiting uses a key extractor that falls back to 127.0.0.1
    // when no peer address is available (local testing). Behind a reverse
    // proxy, configure the proxy to pass the client address through.
    #[cfg(not(test))]
    {
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> Result<Self::Key, tower_governor::GovernorError> {
                if let Some(addr) = req.extensions().get::<std::net::SocketAddr>() {
                    return Ok(addr.ip());
                }

                Ok(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            }
        }

        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(FallbackIpKeyExtractor)
                .per_second(settings.server.api_rate_limit)
                .burst_size(settings.server.api_rate_limit as u32 * 2)
                .finish()
                .unwrap(),
        );
        auth_routes = auth_routes.layer(GovernorLayer {
            config: governor_conf,
        });
    }

    let api_routes = Router::new()
        .merge(auth_routes)
        // Users
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/list", get(users::list_users))
        .route("/users/deactivate", post(users::deactivate))
        // Categories
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        // Expenses
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/:id",
            get(expenses::get)
                .patch(expenses::update)
                .delete(expenses::delete),
        )
        // Transactions
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/import", post(transactions::import_statement))
        .route(
            "/transactions/:id",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        // Goals
        .route("/goals", get(goals::list).post(goals::create))
        .route(
            "/goals/:id",
            get(goals::get).patch(goals::update).delete(goals::delete),
        )
        // Dashboard
        .route("/dashboard/summary", get(dashboard::summary))
        // Notifications
        .route("/notification/", get(notifications::list))
        .route("/notification/unread-count", get(notifications::unread_count))
        .route("/notification/read_all", post(notifications::read_all))
        .route("/notification/generate-ai", post(notifications::generate_ai))
        .route(
            "/notification/generate-budget-insight",
            post(notifications::generate_budget_insight),
        )
        .route("/notification/ws", get(notifications::websocket))
        .route("/notification/:id", get(notifications::get))
        .route("/notification/:id/read", post(notifications::mark_read))
        // Chatbot
        .route("/chatbot/ask", post(chatbot::ask))
        .route("/chatbot/command", post(chatbot::command));

    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check));

    let frontend_origin = settings
        .server
        .frontend_url
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    Router::new()
        .route("/", get(handlers::root))
        .merge(health_routes)
        .nest("/api/v1", api_routes)
        .with_state(state)
        .layer(
            // Request body size limit - keeps statement uploads bounded
            RequestBodyLimitLayer::new(settings.pagination.max_request_body_size),
        )
        .layer(
            // Cookies: OAuth callback sets the token, logout clears it
            CookieManagerLayer::new(),
        )
        .layer(
            // CORS locked to the configured frontend
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(frontend_origin)
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_utils::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_routes_exist() {
        let state = test_state().await;
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_checks_database() {
        let state = test_state().await;
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let state = test_state().await;
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
