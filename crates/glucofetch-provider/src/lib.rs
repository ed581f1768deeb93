//! Dexcom vendor client.
//!
//! This crate implements the vendor-facing half of glucofetch:
//!
//! - [`TokenStore`] - persisted OAuth credential state (load at startup,
//!   save on every change)
//! - [`AuthClient`] - authorization URL construction, code-for-token
//!   exchange, refresh-token exchange
//! - [`EgvClient`] - bearer-authenticated glucose reading retrieval
//! - [`DexcomProvider`] - composition of the above with the credential
//!   lifecycle rules (single 401 refresh-and-retry, retry policy on the
//!   exchange path)
//! - [`ProviderError`] - error taxonomy for vendor operations
//!
//! # Credential lifecycle
//!
//! 1. Unauthenticated: no stored credential; only `/login` can transition out
//! 2. A successful authorization-code exchange persists the token pair
//! 3. Every successful refresh replaces the pair wholesale (the vendor
//!    rotates the refresh token and invalidates the old one)
//! 4. A failed refresh leaves the stored pair untouched; the stale access
//!    token remains authoritative until the vendor rejects it again
//! 5. The only reset path is deleting the persisted credential
//!
//! # Example
//!
//! ```ignore
//! use glucofetch_provider::{DexcomConfig, DexcomProvider};
//! use glucofetch_core::TimeWindow;
//!
//! let config = DexcomConfig::from_env("tokens.json");
//! let provider = DexcomProvider::new(config);
//!
//! let window = TimeWindow::lookback(provider.config().lookback);
//! let readings = provider.fetch_readings(&window).await?;
//! ```

pub mod dexcom;
pub mod error;
pub mod retry;

// Re-export main types at crate root
pub use dexcom::{
    AuthClient, Credential, DexcomConfig, DexcomProvider, EgvClient, Reading, TokenStore,
};
pub use error::{ProviderError, ProviderResult};
pub use retry::RetryPolicy;
