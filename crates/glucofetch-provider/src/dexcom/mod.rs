//! Dexcom API integration.
//!
//! This module talks to the Dexcom v2 REST API:
//!
//! - OAuth 2.0 authorization-code flow against a registered redirect URI
//! - Token persistence with wholesale replacement on every refresh
//! - Estimated glucose value (EGV) retrieval over a time window
//!
//! # Authentication flow
//!
//! 1. The operator opens `/login`, which redirects to Dexcom's consent page
//! 2. Dexcom redirects back to the registered URI with an authorization code
//! 3. The code is exchanged for an access/refresh token pair and persisted
//! 4. Retrieval presents the access token as a bearer credential; a 401
//!    triggers exactly one refresh-and-retry cycle
//!
//! Dexcom rotates the refresh token on every refresh and invalidates the old
//! one, so the stored credential is always replaced as a unit.

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::{EgvClient, Reading};
pub use config::DexcomConfig;
pub use oauth::AuthClient;
pub use provider::DexcomProvider;
pub use tokens::{Credential, TokenStore};
