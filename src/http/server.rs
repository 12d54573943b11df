//! HTTP server setup and handlers.
//!
//! # Responsibilities
//! - Create the Axum router for both screens and the JSON API
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Bind to a listener and drain on shutdown

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, MatchedPath, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::donation::{
    ConnectionStatus, Dashboard, DonationError, DonationForm, DonationReceipt, DonationService,
    StatsSnapshot,
};
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::ApiError;
use crate::observability::metrics;

const CONNECT_SCREEN: &str = include_str!("assets/connect.html");
const DONATE_SCREEN: &str = include_str!("assets/donate.html");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DonationService>,
}

/// HTTP server for the donation app.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the donation service.
    pub fn new(config: &AppConfig, service: Arc<DonationService>) -> Self {
        let state = AppState { service };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request),
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        Router::new()
            .route("/", get(connect_screen))
            .route("/main", get(donate_screen))
            .route("/health", get(health))
            .route("/api/session", get(session_status))
            .route("/api/connect", post(connect))
            .route("/api/disconnect", post(disconnect))
            .route("/api/stats", get(stats))
            .route("/api/donate", post(donate))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(layers)
    }

    /// The router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

/// Connection screen.
async fn connect_screen() -> Html<&'static str> {
    Html(CONNECT_SCREEN)
}

/// Donation screen; only reachable with a persisted address.
async fn donate_screen(State(state): State<AppState>) -> Response {
    if state.service.session().wallet_address().is_none() {
        return Redirect::to("/").into_response();
    }
    Html(DONATE_SCREEN).into_response()
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn session_status(State(state): State<AppState>) -> Json<ConnectionStatus> {
    Json(state.service.connection_status().await)
}

#[derive(Serialize)]
struct Connected {
    address: String,
}

async fn connect(State(state): State<AppState>) -> Result<Json<Connected>, ApiError> {
    let address = state.service.connect().await?;
    Ok(Json(Connected { address }))
}

async fn disconnect(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.service.disconnect()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stats(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    Ok(Json(state.service.dashboard().await?))
}

#[derive(Serialize)]
struct Donated {
    #[serde(flatten)]
    receipt: DonationReceipt,
    stats: StatsSnapshot,
}

async fn donate(
    State(state): State<AppState>,
    payload: Result<Json<DonationForm>, JsonRejection>,
) -> Result<Json<Donated>, ApiError> {
    // Malformed bodies get the same error shape as every other failure
    let Json(form) = payload.map_err(|e| DonationError::Validation(e.body_text()))?;
    let receipt = state.service.donate(&form).await?;
    Ok(Json(Donated {
        receipt,
        stats: state.service.stats(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donation::{MockStats, PaymentFlow};
    use crate::session::SessionStore;
    use crate::stellar::{HorizonClient, UnavailableWallet, WalletProvider};
    use axum::http::header;
    use tower::ServiceExt;

    const ADDRESS: &str = "GAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQDZ7H";

    fn server() -> (HttpServer, Arc<DonationService>) {
        let config = AppConfig::default();
        let wallet: Arc<dyn WalletProvider> = Arc::new(UnavailableWallet);
        let horizon = HorizonClient::new("http://127.0.0.1:9", 2).unwrap();
        let flow = PaymentFlow::new(horizon, wallet.clone(), &config.network);
        let service = Arc::new(DonationService::new(
            SessionStore::new(None),
            wallet,
            flow,
            Arc::new(MockStats),
        ));
        (HttpServer::new(&config, service.clone()), service)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_main_redirects_without_address() {
        let (server, service) = server();

        let response = server.router().oneshot(get("/main")).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");

        service.session().set_wallet_address(ADDRESS).unwrap();
        let response = server.router().oneshot(get("/main")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let (server, _) = server();
        let response = server.router().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "fixed-id")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "fixed-id");
    }

    #[tokio::test]
    async fn test_connect_without_wallet_is_503() {
        let (server, _) = server();
        let request = Request::builder()
            .method("POST")
            .uri("/api/connect")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_stats_requires_address() {
        let (server, _) = server();
        let response = server.router().oneshot(get("/api/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_donation_body() {
        let (server, service) = server();
        service.session().set_wallet_address(ADDRESS).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/api/donate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"amount": 5, "recipient": "GABC"}"#))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "validation");
        assert!(body["error"].is_string());
    }
}
