//! HTTP routes and handlers.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Deserialize;
use tracing::info;

use glucofetch_core::TimeWindow;
use glucofetch_provider::DexcomProvider;

use crate::error::ServerResult;
use crate::sink::CsvSink;

/// Shared state handed to every handler: the single owned provider (and its
/// credential store) plus the output sink.
pub struct AppState {
    /// The vendor client.
    pub provider: DexcomProvider,
    /// Where fetched readings are written.
    pub sink: CsvSink,
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/fetch-egvs", get(fetch_egvs))
        .route("/refresh", get(refresh))
        .with_state(state)
}

/// `GET /` - capability/status descriptor.
async fn home(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = state.provider.config();
    Json(serde_json::json!({
        "message": "glucofetch: Dexcom OAuth + CSV export",
        "endpoints": ["/login", "/callback", "/fetch-egvs", "/refresh"],
        "auth_url": config.login_url(),
        "redirect_uri": config.redirect_uri,
        "authenticated": state.provider.is_authenticated(),
    }))
}

/// `GET /login` - 302 to the vendor's consent page.
async fn login(State(state): State<Arc<AppState>>) -> Response {
    let url = state.provider.authorization_url(None);
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: String,
}

/// `GET /callback?code=...` - authorization-code exchange.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> ServerResult<Json<serde_json::Value>> {
    let tokens = state.provider.exchange_code(&params.code).await?;
    info!("login flow completed");
    Ok(Json(serde_json::json!({
        "message": "Tokens received and saved!",
        "tokens": tokens,
    })))
}

/// `GET /fetch-egvs` - retrieve the lookback window and export it.
async fn fetch_egvs(State(state): State<Arc<AppState>>) -> ServerResult<Json<serde_json::Value>> {
    let window = TimeWindow::lookback(state.provider.config().lookback);
    let readings = state.provider.fetch_readings(&window).await?;

    // The export always reflects the latest retrieval, even an empty one
    state.sink.write(&readings)?;

    if readings.is_empty() {
        return Ok(Json(serde_json::json!({
            "message": "No data returned from Dexcom.",
        })));
    }

    Ok(Json(serde_json::json!({
        "message": format!(
            "Saved {} records to {}",
            readings.len(),
            state.sink.path().display()
        ),
        "file": state.sink.path(),
    })))
}

/// `GET /refresh` - manual token refresh.
async fn refresh(State(state): State<Arc<AppState>>) -> ServerResult<Json<serde_json::Value>> {
    state.provider.refresh_access_token().await?;
    Ok(Json(serde_json::json!({
        "message": "Access token refreshed!",
        "tokens": state.provider.store().get(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use glucofetch_provider::{Credential, DexcomConfig, TokenStore};

    fn app_in(dir: &TempDir, base_url: Option<&str>) -> (Router, Arc<AppState>) {
        let mut config = DexcomConfig::new(
            "client-id",
            "client-secret",
            "https://localhost:8080/callback",
            dir.path().join("tokens.json"),
        );
        if let Some(base_url) = base_url {
            config = config.with_base_url(base_url);
        }
        let state = Arc::new(AppState {
            provider: DexcomProvider::new(config),
            sink: CsvSink::new(dir.path().join("readings.csv")),
        });
        (build_router(state.clone()), state)
    }

    fn seed_credential(dir: &TempDir, access: &str, refresh: Option<&str>) {
        TokenStore::new(dir.path().join("tokens.json"))
            .set(Credential::new(access, refresh.map(String::from)))
            .unwrap();
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn home_describes_the_service() {
        let dir = TempDir::new().unwrap();
        let (router, _) = app_in(&dir, None);

        let (status, body) = get(router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], false);
        assert!(
            body["endpoints"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!("/fetch-egvs"))
        );
    }

    #[tokio::test]
    async fn login_redirects_to_the_vendor() {
        let dir = TempDir::new().unwrap();
        let (router, _) = app_in(&dir, None);

        let response = router
            .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://api.dexcom.com/v2/oauth2/login?"));
        assert!(location.contains("client_id=client-id"));
        assert!(location.contains("response_type=code"));
    }

    #[tokio::test]
    async fn callback_exchanges_and_reports_tokens() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let (router, _) = app_in(&dir, Some(&server.uri()));

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "acc",
                "refresh_token": "ref",
                "expires_in": 7200,
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(router, "/callback?code=auth-code").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Tokens received and saved!");
        assert_eq!(body["tokens"]["access_token"], "acc");
        assert!(dir.path().join("tokens.json").exists());
    }

    #[tokio::test]
    async fn callback_failure_carries_the_vendor_status() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let (router, _) = app_in(&dir, Some(&server.uri()));

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let (status, body) = get(router, "/callback?code=bad").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn fetch_reports_no_data_but_still_writes_the_file() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        seed_credential(&dir, "valid", Some("refresh"));
        let (router, state) = app_in(&dir, Some(&server.uri()));

        Mock::given(method("GET"))
            .and(path("/users/self/egvs"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "egvs": [] })),
            )
            .mount(&server)
            .await;

        let (status, body) = get(router, "/fetch-egvs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No data returned from Dexcom.");
        assert!(state.sink.path().exists());
    }

    #[tokio::test]
    async fn fetch_exports_the_batch() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        seed_credential(&dir, "valid", Some("refresh"));
        let (router, state) = app_in(&dir, Some(&server.uri()));

        Mock::given(method("GET"))
            .and(path("/users/self/egvs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "egvs": [
                    { "value": 104, "trend": "flat" },
                    { "value": 98, "trend": "fortyFiveDown" },
                ]
            })))
            .mount(&server)
            .await;

        let (status, body) = get(router, "/fetch-egvs").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().starts_with("Saved 2 records"));

        let content = std::fs::read_to_string(state.sink.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().next().unwrap(), "trend,value");
    }

    #[tokio::test]
    async fn refresh_without_credential_is_an_error_response() {
        let dir = TempDir::new().unwrap();
        let (router, _) = app_in(&dir, None);

        let (status, body) = get(router, "/refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("no refresh token"));
    }
}
