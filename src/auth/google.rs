use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const SCOPES: &str = "openid https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

/// Profile fields returned by Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OAuth2 client (authorization-code flow)
#[derive(Clone)]
pub struct GoogleAuthClient {
    client: Client,
    config: GoogleConfig,
    // Overridable for tests
    token_url: String,
    userinfo_url: String,
}

impl GoogleAuthClient {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_endpoints(config: GoogleConfig, token_url: &str, userinfo_url: &str) -> Self {
        Self {
            client: Client::new(),
            config,
            token_url: token_url.to_string(),
            userinfo_url: userinfo_url.to_string(),
        }
    }

    /// Build the consent-screen URL the frontend should redirect to
    pub fn authorization_url(&self, redirect_uri: Option<&str>, state: &str) -> Result<String> {
        if !self.config.is_enabled() {
            return Err(Error::Config(
                "Google OAuth is not configured".to_string(),
            ));
        }

        let redirect_uri = redirect_uri.unwrap_or(&self.config.redirect_uri);

        let mut url = Url::parse(GOOGLE_AUTH_URL)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("include_granted_scopes", "true")
            .append_pair("prompt", "consent")
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for the user's Google profile
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleUserInfo> {
        if !self.config.is_enabled() {
            return Err(Error::Config(
                "Google OAuth is not configured".to_string(),
            ));
        }

        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.client.post(&self.token_url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Google token exchange failed: {}", status);
            return Err(Error::Auth(format!(
                "Google token exchange failed with status {status}"
            )));
        }

        let token: TokenResponse = response.json().await?;

        self.fetch_userinfo(&token.access_token).await
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<GoogleUserInfo> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Auth(
                "Failed to fetch Google user profile".to_string(),
            ));
        }

        let info: GoogleUserInfo = response.json().await?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> GoogleConfig {
        GoogleConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:8000/api/v1/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_contains_params() {
        let client = GoogleAuthClient::new(enabled_config()).unwrap();
        let url = client.authorization_url(None, "csrf123").unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=csrf123"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_unconfigured_client_rejects() {
        let client = GoogleAuthClient::new(GoogleConfig {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
        })
        .unwrap();

        assert!(client.authorization_url(None, "s").is_err());
    }

    #[tokio::test]
    async fn test_exchange_code_against_mock() {
        let mut server = mockito::Server::new_async().await;

        let token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.test"}"#)
            .create_async()
            .await;

        let userinfo_mock = server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer ya29.test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sub": "g-123", "email": "g@example.com", "name": "G User"}"#)
            .create_async()
            .await;

        let client = GoogleAuthClient::with_endpoints(
            enabled_config(),
            &format!("{}/token", server.url()),
            &format!("{}/userinfo", server.url()),
        );

        let info = client.exchange_code("auth-code").await.unwrap();
        assert_eq!(info.sub, "g-123");
        assert_eq!(info.email.as_deref(), Some("g@example.com"));

        token_mock.assert_async().await;
        userinfo_mock.assert_async().await;
    }
}
