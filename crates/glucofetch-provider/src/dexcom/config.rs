//! Dexcom provider configuration.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::retry::RetryPolicy;

/// Production Dexcom API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.dexcom.com/v2";

/// Default OAuth scope set. `offline_access` is what makes Dexcom issue a
/// refresh token alongside the access token.
pub const DEFAULT_SCOPE: &str = "offline_access";

/// Default per-attempt timeout for token-endpoint calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retrieval lookback.
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Configuration for the Dexcom provider.
///
/// The client identity comes from the application registered with Dexcom.
/// When any of it is missing the vendor rejects the call; there is no local
/// validation gate, matching how the service has always behaved.
#[derive(Debug, Clone)]
pub struct DexcomConfig {
    /// OAuth client ID of the registered application.
    pub client_id: String,

    /// OAuth client secret of the registered application.
    pub client_secret: String,

    /// Redirect URI registered with Dexcom.
    pub redirect_uri: String,

    /// API base URL. Defaults to production; point it at the sandbox host
    /// for development.
    pub base_url: String,

    /// OAuth scopes requested during login.
    pub scopes: Vec<String>,

    /// Path where the credential is persisted.
    pub token_path: PathBuf,

    /// How far back each retrieval window reaches.
    pub lookback: chrono::Duration,

    /// Per-attempt request timeout.
    pub timeout: Duration,

    /// Retry policy for the code-exchange path.
    pub retry: RetryPolicy,
}

impl DexcomConfig {
    /// Creates a configuration with explicit client identity and defaults
    /// for everything else.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        token_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
            token_path: token_path.into(),
            lookback: chrono::Duration::days(DEFAULT_LOOKBACK_DAYS),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Loads the client identity from the environment.
    ///
    /// Reads `DEXCOM_CLIENT_ID`, `DEXCOM_CLIENT_SECRET`, and
    /// `DEXCOM_REDIRECT_URI`. Missing variables are logged and left empty;
    /// the vendor will reject calls made with an incomplete identity.
    pub fn from_env(token_path: impl Into<PathBuf>) -> Self {
        let client_id = env_or_empty("DEXCOM_CLIENT_ID");
        let client_secret = env_or_empty("DEXCOM_CLIENT_SECRET");
        let redirect_uri = env_or_empty("DEXCOM_REDIRECT_URI");
        Self::new(client_id, client_secret, redirect_uri, token_path)
    }

    /// Builder: set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder: set the requested OAuth scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Builder: set the retrieval lookback.
    #[must_use]
    pub fn with_lookback(mut self, lookback: chrono::Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Builder: set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set the exchange retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The OAuth login (consent) endpoint.
    pub fn login_url(&self) -> String {
        format!("{}/oauth2/login", self.base_url)
    }

    /// The OAuth token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.base_url)
    }

    /// The EGV retrieval endpoint.
    pub fn egvs_url(&self) -> String {
        format!("{}/users/self/egvs", self.base_url)
    }
}

fn env_or_empty(var: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            warn!("{} is not set; vendor calls will be rejected", var);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DexcomConfig::new("id", "secret", "https://localhost/callback", "tokens.json");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.scopes, vec![DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.lookback, chrono::Duration::days(30));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn endpoint_urls() {
        let config = DexcomConfig::new("id", "secret", "uri", "tokens.json")
            .with_base_url("https://sandbox-api.dexcom.com/v2");

        assert_eq!(
            config.login_url(),
            "https://sandbox-api.dexcom.com/v2/oauth2/login"
        );
        assert_eq!(
            config.token_url(),
            "https://sandbox-api.dexcom.com/v2/oauth2/token"
        );
        assert_eq!(
            config.egvs_url(),
            "https://sandbox-api.dexcom.com/v2/users/self/egvs"
        );
    }

    #[test]
    fn builder_overrides() {
        let config = DexcomConfig::new("id", "secret", "uri", "tokens.json")
            .with_lookback(chrono::Duration::hours(6))
            .with_scopes(vec!["offline_access".into(), "egv".into()])
            .with_retry(RetryPolicy::none());

        assert_eq!(config.lookback, chrono::Duration::hours(6));
        assert_eq!(config.scopes.len(), 2);
        assert_eq!(config.retry.max_attempts, 1);
    }
}
