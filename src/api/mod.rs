pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_utils {
    use super::handlers::AppState;
    use crate::auth::google::GoogleAuthClient;
    use crate::notify::NotificationHub;
    use std::sync::Arc;

    pub async fn test_state() -> AppState {
        let pool = crate::db::test_pool().await;
        let settings = crate::config::test_settings();

        AppState {
            pool,
            google: GoogleAuthClient::new(settings.google.clone()).unwrap(),
            hub: Arc::new(NotificationHub::new()),
            ai: None,
            settings,
        }
    }
}
