//! OAuth 2.0 authorization-code flow against the Dexcom token endpoint.
//!
//! This service is a confidential web client with a redirect URI registered
//! at the vendor, so the flow is the plain authorization-code grant: build
//! the consent URL, trade the returned code for a token pair, and refresh
//! with the rotating refresh token from then on.
//!
//! The code exchange carries the hardened retry policy: transport failures
//! and responses carrying the vendor's service-unavailable marker are
//! retried with a fixed delay, everything else fails on the first attempt.

use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::DexcomConfig;
use super::tokens::Credential;

/// OAuth client for the Dexcom API.
#[derive(Debug)]
pub struct AuthClient {
    config: DexcomConfig,
    http_client: reqwest::Client,
}

impl AuthClient {
    /// Creates a new OAuth client with the given configuration.
    pub fn new(config: DexcomConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Builds the authorization redirect URL.
    ///
    /// Pure construction: embeds the client identity, the registered
    /// redirect URI, and either the caller's scopes or the configured
    /// default set. No network call is made and no failure mode exists.
    pub fn authorization_url(&self, scopes: Option<&[String]>) -> String {
        let scope = scopes.unwrap_or(&self.config.scopes).join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.config.login_url(),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope),
        )
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// Retries per the configured policy: only transport errors and
    /// responses carrying the service-unavailable marker are transient;
    /// exhausting the budget yields
    /// [`ProviderError::ServiceUnavailable`], signaling a vendor-side
    /// condition rather than a rejected code.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<Credential> {
        let retry = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, max = retry.max_attempts, "exchanging authorization code");

            let params = [
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ];

            match self.request_token(&params, exchange_error).await {
                Ok(credential) => {
                    info!("authorization code exchanged for tokens");
                    return Ok(credential);
                }
                Err(e) if retry.should_retry(&e, attempt) => {
                    warn!(attempt, error = %e, "transient exchange failure, retrying");
                    tokio::time::sleep(retry.delay).await;
                }
                Err(e) if retry.is_transient(&e) && retry.max_attempts > 1 => {
                    warn!(attempts = attempt, error = %e, "exchange retries exhausted");
                    return Err(ProviderError::ServiceUnavailable { attempts: attempt });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Trades the refresh token for a new token pair.
    ///
    /// The caller persists the result; on failure nothing is persisted and
    /// the stored pair stays authoritative.
    pub async fn refresh(&self, refresh_token: &str) -> ProviderResult<Credential> {
        // Dexcom's token endpoint wants the redirect_uri on refresh too,
        // unlike most OAuth servers.
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let credential = self.request_token(&params, refresh_error).await?;
        info!("access token refreshed");
        Ok(credential)
    }

    /// One POST to the token endpoint; `reject` shapes the non-success error.
    async fn request_token(
        &self,
        params: &[(&str, &str)],
        reject: fn(u16, String) -> ProviderError,
    ) -> ProviderResult<Credential> {
        let response = self
            .http_client
            .post(self.config.token_url())
            .form(params)
            .send()
            .await
            .map_err(ProviderError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::transport)?;

        if !status.is_success() {
            return Err(reject(status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad token response: {}", e)))
    }
}

fn exchange_error(status: u16, body: String) -> ProviderError {
    ProviderError::AuthExchange { status, body }
}

fn refresh_error(status: u16, body: String) -> ProviderError {
    ProviderError::Refresh { status, body }
}
