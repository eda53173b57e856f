use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, trace};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const SCOPE_SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// tokens this close to expiry are refreshed instead of reused
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer token for the Sheets API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn access_token(&self) -> anyhow::Result<AccessToken>;
}

#[derive(Debug, Serialize, PartialEq)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
struct TokenWithExpiration {
    token: AccessToken,
    expires_at: DateTime<Utc>,
}

impl TokenWithExpiration {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now
    }
}

/// Service-account credentials exchanged for short-lived tokens with the
/// OAuth2 JWT bearer grant. The last token is cached until it nears expiry.
pub struct ServiceAccount {
    client_email: String,
    key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<TokenWithExpiration>>,
}

impl ServiceAccount {
    pub fn new(client_email: String, private_key_pem: &str, http: reqwest::Client) -> anyhow::Result<Self> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .context("invalid service account private key")?;
        Ok(Self {
            client_email,
            key,
            http,
            cached: Mutex::new(None),
        })
    }

    fn claims(&self, now: DateTime<Utc>) -> Claims<'_> {
        build_claims(&self.client_email, now)
    }

    async fn fetch_token(&self) -> anyhow::Result<TokenWithExpiration> {
        let now = Utc::now();
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(now), &self.key)
            .context("failed to sign token assertion")?;

        trace!("Requesting access token for {}", self.client_email);
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", GRANT_TYPE_JWT_BEARER), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("token request was rejected with status {}: {}", status, body);
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            access_token: String,
            expires_in: i64,
        }
        let ApiResponse { access_token, expires_in } =
            response.json().await.context("malformed token response")?;

        debug!("Obtained access token valid for {}s", expires_in);
        Ok(TokenWithExpiration {
            token: AccessToken::new(access_token),
            expires_at: now + Duration::seconds(expires_in),
        })
    }
}

fn build_claims(client_email: &str, now: DateTime<Utc>) -> Claims<'_> {
    let iat = now.timestamp();
    Claims {
        iss: client_email,
        scope: SCOPE_SPREADSHEETS,
        aud: TOKEN_URL,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    }
}

#[async_trait]
impl Authenticator for ServiceAccount {
    async fn access_token(&self) -> anyhow::Result<AccessToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired(Utc::now()) {
                trace!("Using cached access token");
                return Ok(token.token.clone());
            }
            debug!("Cached access token is expired");
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
