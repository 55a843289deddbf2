use crate::config::SpiderConfig;
use crate::error::AuthError;
use crate::http::*;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

/// Grants closer than this to expiry are refreshed before use.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of the bearer token sent with each search request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn current_token(&self) -> Result<String, AuthError>;
}

/// A pre-issued token, used as is.
#[derive(Clone, Debug)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn current_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Body of the token and refresh endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds; grants without one are kept for the whole run.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedGrant {
    grant: TokenGrant,
    expires_at: Option<Instant>,
}

impl CachedGrant {
    fn new(grant: TokenGrant, now: Instant) -> Self {
        let expires_at = grant
            .expires_in
            .and_then(|secs| now.checked_add(Duration::from_secs(secs)));
        Self { grant, expires_at }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at.saturating_duration_since(now) > EXPIRY_MARGIN,
            None => true,
        }
    }
}

/// Username/password token provider, refreshing its grant as it nears expiry.
#[derive(Debug)]
pub struct CiqTokenProvider {
    client: HttpClient,
    token_url: String,
    refresh_url: String,
    username: String,
    password: String,
    cached: Mutex<Option<CachedGrant>>,
}

impl CiqTokenProvider {
    pub fn from_config(config: &SpiderConfig, client: HttpClient) -> Result<Self, AuthError> {
        Ok(Self {
            client,
            token_url: config.token_url.clone(),
            refresh_url: config.refresh_url.clone(),
            username: config
                .username
                .clone()
                .ok_or(AuthError::MissingCredential("CIQ_USERNAME"))?,
            password: config
                .password
                .clone()
                .ok_or(AuthError::MissingCredential("CIQ_PASSWORD"))?,
            cached: Mutex::new(None),
        })
    }

    /// Request a new grant with the configured credentials.
    pub async fn get_access_token(&self) -> Result<TokenGrant, AuthError> {
        debug!("requesting access token for {}", self.username);
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await?;
        read_grant(response).await
    }

    /// Exchange a refresh token for a new grant.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        debug!("refreshing access token for {}", self.username);
        let response = self
            .client
            .post(&self.refresh_url)
            .form(&[("refresh_token", refresh_token)])
            .send()
            .await?;
        read_grant(response).await
    }
}

#[async_trait]
impl TokenProvider for CiqTokenProvider {
    async fn current_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        let now = Instant::now();

        if let Some(current) = cached.as_ref() {
            if current.is_fresh(now) {
                trace!("access token still valid");
                return Ok(current.grant.access_token.clone());
            }
        }

        let refresh_token = cached
            .as_ref()
            .and_then(|current| current.grant.refresh_token.clone());
        let grant = match refresh_token.as_deref() {
            Some(token) => match self.refresh_access_token(token).await {
                Ok(mut grant) => {
                    // some refresh responses omit the refresh token
                    if grant.refresh_token.is_none() {
                        grant.refresh_token = refresh_token.clone();
                    }
                    grant
                }
                Err(err) => {
                    warn!("failed to refresh access token, requesting a new one, error({err})");
                    self.get_access_token().await?
                }
            },
            None => self.get_access_token().await?,
        };

        let token = grant.access_token.clone();
        *cached = Some(CachedGrant::new(grant, now));
        Ok(token)
    }
}

async fn read_grant(response: reqwest::Response) -> Result<TokenGrant, AuthError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json().await?)
}

/// Pick the token provider the environment asks for: `CIQ_ACCESS_TOKEN` when set, otherwise
/// `CIQ_USERNAME` / `CIQ_PASSWORD`.
pub fn provider_from_config(
    config: &SpiderConfig,
    client: HttpClient,
) -> Result<Box<dyn TokenProvider>, AuthError> {
    match &config.access_token {
        Some(token) => {
            debug!("using pre-issued access token");
            Ok(Box::new(StaticToken::new(token.clone())))
        }
        None => Ok(Box::new(CiqTokenProvider::from_config(config, client)?)),
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(expires_in: Option<u64>) -> TokenGrant {
        TokenGrant {
            access_token: "abc".to_string(),
            refresh_token: Some("def".to_string()),
            expires_in,
        }
    }

    #[test]
    fn freshness_margin() {
        let now = Instant::now();
        assert!(CachedGrant::new(grant(Some(3600)), now).is_fresh(now));
        assert!(!CachedGrant::new(grant(Some(60)), now).is_fresh(now));
        assert!(!CachedGrant::new(grant(Some(0)), now).is_fresh(now));
        assert!(!CachedGrant::new(grant(Some(3600)), now).is_fresh(now + Duration::from_secs(3550)));
    }

    #[test]
    fn grant_without_lifetime_is_reused() {
        let grant: TokenGrant = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(grant.expires_in, None);

        let now = Instant::now();
        let cached = CachedGrant::new(grant, now);
        assert!(cached.is_fresh(now));
        assert!(cached.is_fresh(now + Duration::from_secs(86_400)));
    }

    #[test]
    fn grant_body() {
        let grant: TokenGrant = serde_json::from_str(
            r#"{"access_token": "abc", "refresh_token": "def", "expires_in": 3600, "token_type": "Bearer"}"#,
        )
        .unwrap();
        assert_eq!(grant.access_token, "abc");
        assert_eq!(grant.refresh_token.as_deref(), Some("def"));
        assert_eq!(grant.expires_in, Some(3600));
    }

    #[test]
    fn credentials_are_required() {
        let config = SpiderConfig::default();
        let err = CiqTokenProvider::from_config(&config, HttpClient::new()).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential("CIQ_USERNAME")));
    }

    #[tokio::test]
    async fn static_token_wins() {
        let config = SpiderConfig {
            access_token: Some("pre-issued".to_string()),
            ..SpiderConfig::default()
        };
        let provider = provider_from_config(&config, HttpClient::new()).unwrap();
        assert_eq!(provider.current_token().await.unwrap(), "pre-issued");
    }
}
