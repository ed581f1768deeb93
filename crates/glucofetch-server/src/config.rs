//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener on.
    pub bind: SocketAddr,

    /// Path where the OAuth credential is persisted.
    pub token_path: PathBuf,

    /// Path where fetched readings are written.
    pub csv_path: PathBuf,

    /// Retrieval lookback in days.
    pub lookback_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            token_path: PathBuf::from("tokens.json"),
            csv_path: PathBuf::from("glucose_readings.csv"),
            lookback_days: 30,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the environment, falling back to defaults.
    ///
    /// Reads `GLUCOFETCH_BIND`, `GLUCOFETCH_TOKEN_FILE`,
    /// `GLUCOFETCH_CSV_FILE`, and `GLUCOFETCH_LOOKBACK_DAYS`. Unparseable
    /// values fall back to the default rather than failing startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = std::env::var("GLUCOFETCH_BIND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.bind);
        let token_path = std::env::var("GLUCOFETCH_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_path);
        let csv_path = std::env::var("GLUCOFETCH_CSV_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.csv_path);
        let lookback_days = std::env::var("GLUCOFETCH_LOOKBACK_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|days| *days > 0)
            .unwrap_or(defaults.lookback_days);

        Self {
            bind,
            token_path,
            csv_path,
            lookback_days,
        }
    }

    /// Builder: set the bind address.
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Builder: set the credential path.
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Builder: set the CSV output path.
    #[must_use]
    pub fn with_csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = path.into();
        self
    }

    /// Builder: set the retrieval lookback in days.
    #[must_use]
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    /// The lookback as a chrono duration.
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(self.lookback_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.token_path, PathBuf::from("tokens.json"));
        assert_eq!(config.csv_path, PathBuf::from("glucose_readings.csv"));
        assert_eq!(config.lookback_days, 30);
    }

    #[test]
    fn custom_config() {
        let config = ServerConfig::default()
            .with_bind(SocketAddr::from(([0, 0, 0, 0], 9000)))
            .with_token_path("/var/lib/glucofetch/tokens.json")
            .with_csv_path("/var/lib/glucofetch/readings.csv")
            .with_lookback_days(7);

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.lookback(), chrono::Duration::days(7));
    }
}
