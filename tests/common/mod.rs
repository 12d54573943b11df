//! Shared utilities for integration testing.
//!
//! `start_mock_horizon` serves the two Horizon resources the payment flow
//! touches and records every submitted envelope. `start_app` runs the real
//! service against it on an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use hopechain::config::schema::TESTNET_PASSPHRASE;
use hopechain::config::AppConfig;
use hopechain::donation::{DonationService, MockStats, PaymentFlow};
use hopechain::session::SessionStore;
use hopechain::stellar::{HorizonClient, KeypairWallet, WalletProvider};
use hopechain::{HttpServer, Shutdown};

/// Seed of 32 bytes of 0x07; test use only.
pub const DONOR_SECRET: &str = "SADQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQP54X";
pub const DONOR_ADDRESS: &str = "GDVEU3DD4KOFECV66VIHWEZOYX4ZKR3WV27L464SIIPOU2IUI3JCZA57";
pub const RECIPIENT: &str = "GD6ROJBYLKQMOW3E7N4M2YBPUHMZD7PL65VRHRMO24BOVSBV5H3BQRSL";
pub const DONOR_SEQUENCE: i64 = 4_294_967_296;
pub const SUBMITTED_HASH: &str = "3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889";

/// How the mock answers `POST /transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Accept,
    Reject,
}

#[derive(Clone)]
struct HorizonState {
    accounts: Arc<HashMap<String, i64>>,
    submissions: Arc<Mutex<Vec<String>>>,
    account_hits: Arc<AtomicUsize>,
    mode: SubmitMode,
}

/// Handle on a running mock Horizon.
pub struct MockHorizon {
    pub addr: SocketAddr,
    state: HorizonState,
}

impl MockHorizon {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base64 envelopes received, in order.
    pub fn submissions(&self) -> Vec<String> {
        self.state.submissions.lock().unwrap().clone()
    }

    pub fn account_hits(&self) -> usize {
        self.state.account_hits.load(Ordering::SeqCst)
    }

    /// Any request at all reached Horizon.
    pub fn was_contacted(&self) -> bool {
        self.account_hits() > 0 || !self.submissions().is_empty()
    }
}

async fn account(
    State(state): State<HorizonState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.account_hits.fetch_add(1, Ordering::SeqCst);
    match state.accounts.get(&id) {
        Some(sequence) => (
            StatusCode::OK,
            Json(json!({
                "id": id,
                "account_id": id,
                "sequence": sequence.to_string(),
                "balances": [{ "balance": "10000.0000000", "asset_type": "native" }]
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "type": "https://stellar.org/horizon-errors/not_found",
                "title": "Resource Missing",
                "status": 404
            })),
        ),
    }
}

async fn transactions(
    State(state): State<HorizonState>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let tx = form.get("tx").cloned().unwrap_or_default();
    state.submissions.lock().unwrap().push(tx);

    match state.mode {
        SubmitMode::Accept => (
            StatusCode::OK,
            Json(json!({
                "hash": SUBMITTED_HASH,
                "ledger": 123456,
                "successful": true
            })),
        ),
        SubmitMode::Reject => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "type": "https://stellar.org/horizon-errors/transaction_failed",
                "title": "Transaction Failed",
                "status": 400,
                "extras": {
                    "result_codes": {
                        "transaction": "tx_failed",
                        "operations": ["op_no_destination"]
                    }
                }
            })),
        ),
    }
}

/// Start a mock Horizon knowing the donor account.
pub async fn start_mock_horizon(mode: SubmitMode) -> MockHorizon {
    let mut accounts = HashMap::new();
    accounts.insert(DONOR_ADDRESS.to_string(), DONOR_SEQUENCE);
    start_mock_horizon_with(accounts, mode).await
}

pub async fn start_mock_horizon_with(accounts: HashMap<String, i64>, mode: SubmitMode) -> MockHorizon {
    let state = HorizonState {
        accounts: Arc::new(accounts),
        submissions: Arc::new(Mutex::new(Vec::new())),
        account_hits: Arc::new(AtomicUsize::new(0)),
        mode,
    };

    let app = Router::new()
        .route("/accounts/{id}", get(account))
        .route("/transactions", post(transactions))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockHorizon { addr, state }
}

/// A running HopeChain service.
pub struct TestApp {
    pub url: String,
    pub service: Arc<DonationService>,
    shutdown: Shutdown,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn donor_wallet() -> Arc<dyn WalletProvider> {
    Arc::new(KeypairWallet::from_secret(DONOR_SECRET, TESTNET_PASSPHRASE).unwrap())
}

/// Start the service against `horizon_url` with the donor's key-pair wallet.
pub async fn start_app(horizon_url: &str, session_path: Option<PathBuf>) -> TestApp {
    start_app_with_wallet(horizon_url, session_path, donor_wallet()).await
}

pub async fn start_app_with_wallet(
    horizon_url: &str,
    session_path: Option<PathBuf>,
    wallet: Arc<dyn WalletProvider>,
) -> TestApp {
    let mut config = AppConfig::default();
    config.network.horizon_url = horizon_url.to_string();

    let session = match session_path {
        Some(path) => SessionStore::load_from_file(path).unwrap(),
        None => SessionStore::new(None),
    };
    let horizon = HorizonClient::new(horizon_url, 5).unwrap();
    let flow = PaymentFlow::new(horizon, wallet.clone(), &config.network);
    let service = Arc::new(DonationService::new(
        session,
        wallet,
        flow,
        Arc::new(MockStats),
    ));

    let server = HttpServer::new(&config, service.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestApp {
        url: format!("http://{}", addr),
        service,
        shutdown,
    }
}
