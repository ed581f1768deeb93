//! Dexcom provider: credential lifecycle plus retrieval.
//!
//! Composes the [`TokenStore`], [`AuthClient`], and [`EgvClient`] and owns
//! the two lifecycle rules the pieces cannot enforce alone: every successful
//! exchange persists the new pair before it is handed back, and a 401 on
//! retrieval gets exactly one refresh-and-retry cycle.

use tracing::{debug, info, warn};

use glucofetch_core::TimeWindow;

use crate::error::{ProviderError, ProviderResult};

use super::client::{EgvClient, Reading};
use super::config::DexcomConfig;
use super::oauth::AuthClient;
use super::tokens::{Credential, TokenStore};

/// Vendor client for the Dexcom API.
///
/// One instance is created at startup and shared by reference across
/// handlers; all credential state lives in the owned [`TokenStore`].
pub struct DexcomProvider {
    config: DexcomConfig,
    store: TokenStore,
    auth: AuthClient,
    egvs: EgvClient,
}

impl DexcomProvider {
    /// Creates a provider and loads any persisted credential.
    ///
    /// A missing credential file is normal (the login flow has not run);
    /// an unreadable one is logged and treated the same way, leaving the
    /// login flow as the recovery path.
    pub fn new(config: DexcomConfig) -> Self {
        let store = TokenStore::new(&config.token_path);
        if let Err(e) = store.load() {
            warn!("ignoring persisted credential: {}", e);
        }

        let auth = AuthClient::new(config.clone());
        let egvs = EgvClient::new(config.egvs_url(), config.timeout);

        Self {
            config,
            store,
            auth,
            egvs,
        }
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &DexcomConfig {
        &self.config
    }

    /// Returns the credential store.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Returns true if a credential is stored.
    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_some()
    }

    /// Builds the authorization redirect URL. Pure; see
    /// [`AuthClient::authorization_url`].
    pub fn authorization_url(&self, scopes: Option<&[String]>) -> String {
        self.auth.authorization_url(scopes)
    }

    /// Exchanges an authorization code and persists the resulting pair.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<Credential> {
        let credential = self.auth.exchange_code(code).await?;
        self.store.set(credential.clone())?;
        info!("credential persisted after code exchange");
        Ok(credential)
    }

    /// Obtains a fresh access token with the stored refresh token.
    ///
    /// On success the rotated pair replaces the stored one wholesale. On a
    /// vendor rejection the stored pair is left untouched; the stale access
    /// token remains authoritative until the vendor rejects it again.
    pub async fn refresh_access_token(&self) -> ProviderResult<String> {
        let refresh_token = self
            .store
            .get()
            .and_then(|c| c.refresh_token)
            .ok_or(ProviderError::NoRefreshToken)?;

        let credential = self.auth.refresh(&refresh_token).await?;
        let access_token = credential.access_token.clone();
        self.store.set(credential)?;
        Ok(access_token)
    }

    /// Fetches all readings in the window.
    ///
    /// Uses the stored access token, obtaining one via refresh if none is
    /// stored. A 401 triggers exactly one refresh-and-retry cycle; if the
    /// refresh itself fails, that failure is returned and retrieval is not
    /// attempted again.
    pub async fn fetch_readings(&self, window: &TimeWindow) -> ProviderResult<Vec<Reading>> {
        let access_token = match self.store.get() {
            Some(credential) => credential.access_token,
            None => self.refresh_access_token().await?,
        };

        match self.egvs.fetch(&access_token, window).await {
            Err(e) if e.is_unauthorized() => {
                debug!("access token rejected, refreshing once");
                let access_token = self.refresh_access_token().await?;
                self.egvs.fetch(&access_token, window).await
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> DexcomConfig {
        DexcomConfig::new(
            "client-id",
            "client-secret",
            "https://localhost:8080/callback",
            dir.path().join("tokens.json"),
        )
    }

    #[test]
    fn starts_unauthenticated_without_stored_credential() {
        let dir = TempDir::new().unwrap();
        let provider = DexcomProvider::new(config_in(&dir));
        assert!(!provider.is_authenticated());
    }

    #[test]
    fn picks_up_persisted_credential_at_startup() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let seed = TokenStore::new(&config.token_path);
        seed.set(Credential::new("stored-access", Some("stored-refresh".to_string())))
            .unwrap();

        let provider = DexcomProvider::new(config);
        assert!(provider.is_authenticated());
        assert_eq!(provider.store().get().unwrap().access_token, "stored-access");
    }

    #[test]
    fn corrupt_credential_file_degrades_to_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.token_path, "not json").unwrap();

        let provider = DexcomProvider::new(config);
        assert!(!provider.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_without_token_is_a_precondition_failure() {
        let dir = TempDir::new().unwrap();
        let provider = DexcomProvider::new(config_in(&dir));

        let err = provider.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, ProviderError::NoRefreshToken));
    }

    #[test]
    fn authorization_url_embeds_client_identity() {
        let dir = TempDir::new().unwrap();
        let provider = DexcomProvider::new(config_in(&dir));
        let url = provider.authorization_url(None);
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
    }
}
