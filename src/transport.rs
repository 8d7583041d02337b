// SOAP-over-HTTP transport with OAuth2 client-credentials authentication.
// Network I/O only; no domain state is mutated here.
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::codec::{MessageCodec, SoapResponse};
use crate::error::{ChannelError, ChannelResult};
use crate::model::ChannelConfig;

/// Expiry assumed when the token endpoint does not state one.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// A cached bearer token and its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Connection settings for one channel endpoint.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    pub token_endpoint: Option<String>,
    pub hotel_code: String,
    pub api_key: String,
    pub api_secret: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn from_channel(config: &ChannelConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            token_endpoint: config.token_endpoint.clone(),
            hotel_code: config.hotel_code.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// The transport seam the orchestrator depends on; mocked in tests.
#[async_trait]
pub trait ChannelTransport: Send + Sync + 'static {
    async fn send_soap_request(
        &self,
        xml_body: &str,
        soap_action: &str,
        requires_auth: bool,
    ) -> ChannelResult<SoapResponse>;
}

enum AuthScheme {
    Bearer(String),
    Basic(String, Option<String>),
}

/// reqwest-backed SOAP client with a cached OAuth2 token. Falls back to
/// basic auth when the channel has no token endpoint configured.
pub struct SoapClient {
    http: reqwest::Client,
    config: TransportConfig,
    codec: MessageCodec,
    token: Mutex<Option<AuthToken>>,
}

impl SoapClient {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            codec: MessageCodec::new(),
            token: Mutex::new(None),
        }
    }

    /// Exchange client credentials for a bearer token. The expiry defaults
    /// to one hour when the server omits `expires_in`.
    pub async fn authenticate(&self) -> ChannelResult<AuthToken> {
        let token_endpoint = self.config.token_endpoint.as_deref().ok_or_else(|| {
            ChannelError::Authentication {
                message: "no token endpoint configured".to_string(),
                token_expired: false,
            }
        })?;

        debug!(endpoint = token_endpoint, "requesting access token");
        let response = self
            .http
            .post(token_endpoint)
            .timeout(self.config.timeout)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.api_key.as_str()),
                ("client_secret", self.config.api_secret.as_str()),
                ("hotel_id", self.config.hotel_code.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.classify_request_error(e))?;

        if !response.status().is_success() {
            return Err(ChannelError::Authentication {
                message: format!("token endpoint returned {}", response.status()),
                token_expired: false,
            });
        }

        let raw: Bytes = response
            .bytes()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;
        let parsed: TokenResponse =
            serde_json::from_slice(&raw).map_err(|e| ChannelError::Authentication {
                message: format!("malformed token response: {e}"),
                token_expired: false,
            })?;

        let lifetime = parsed.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let token = AuthToken {
            access_token: parsed.access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(lifetime),
        };
        *self.token.lock() = Some(token.clone());
        Ok(token)
    }

    /// Returns a valid auth scheme, re-authenticating exactly once when the
    /// cached token has expired.
    async fn auth_scheme(&self) -> ChannelResult<AuthScheme> {
        if self.config.token_endpoint.is_some() {
            let cached = self.token.lock().clone();
            let token = match cached {
                Some(token) if !token.is_expired() => token,
                _ => self.authenticate().await?,
            };
            return Ok(AuthScheme::Bearer(token.access_token));
        }

        if let Some(username) = &self.config.username {
            return Ok(AuthScheme::Basic(
                username.clone(),
                self.config.password.clone(),
            ));
        }

        Err(ChannelError::Authentication {
            message: "no credentials configured for channel".to_string(),
            token_expired: false,
        })
    }

    fn classify_request_error(&self, error: reqwest::Error) -> ChannelError {
        if error.is_timeout() {
            ChannelError::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            ChannelError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl ChannelTransport for SoapClient {
    async fn send_soap_request(
        &self,
        xml_body: &str,
        soap_action: &str,
        requires_auth: bool,
    ) -> ChannelResult<SoapResponse> {
        let mut request = self
            .http
            .post(&self.config.endpoint)
            .timeout(self.config.timeout)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(xml_body.to_string());

        if requires_auth {
            request = match self.auth_scheme().await? {
                AuthScheme::Bearer(token) => request.bearer_auth(token),
                AuthScheme::Basic(user, pass) => request.basic_auth(user, pass),
            };
        }

        debug!(action = soap_action, "sending SOAP request");
        let response = request
            .send()
            .await
            .map_err(|e| self.classify_request_error(e))?;

        let status = response.status();
        let raw: Bytes = response
            .bytes()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;
        let text = String::from_utf8_lossy(&raw);

        if status.as_u16() == 401 {
            // Drop the cached token so the next request re-authenticates
            *self.token.lock() = None;
            return Err(ChannelError::Authentication {
                message: "request rejected with 401".to_string(),
                token_expired: true,
            });
        }

        let soap = self.codec.parse_soap_response(&text);
        match soap {
            Ok(parsed) => {
                if !status.is_success() && parsed.fault.is_none() && parsed.errors.is_empty() {
                    return Err(ChannelError::Network(format!(
                        "HTTP {status} without SOAP fault"
                    )));
                }
                if let Some(fault) = &parsed.fault {
                    warn!(code = %fault.code, message = %fault.message, "SOAP fault returned");
                }
                Ok(parsed)
            }
            // A failed HTTP exchange with an unparseable body is a network
            // problem, not a codec one
            Err(_) if !status.is_success() => {
                Err(ChannelError::Network(format!("HTTP {status}")))
            }
            Err(e) => Err(e),
        }
    }
}
