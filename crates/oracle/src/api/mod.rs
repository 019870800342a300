use crate::{
    Error,
    pipeline::{Pipeline, SettleRequest, boost::BoostGrant, disburse::PayoutStatus, oracle},
    store::SettlementRecord,
    util::format_amount,
};
use alloy::primitives::{Address, U256};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{str::FromStr, sync::Arc, time::Instant};
use tracing::error;

pub struct AppState {
    pub pipeline: Pipeline,
    pub started: Instant,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fortune", post(settle))
        .route("/api/history/{address}", get(history))
        .route("/api/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FortuneRequest {
    tx_hash: String,
    #[serde(default)]
    wish: String,
    #[serde(default)]
    boost_tx_hash: Option<String>,
    #[serde(default)]
    network: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FortuneResponse {
    outcome: String,
    tier: u8,
    emoji: &'static str,
    blessing: String,
    amount: String,
    payout: String,
    payout_wei: String,
    payout_status: PayoutStatus,
    payout_tx_hash: Option<String>,
    penalties: Vec<String>,
    penalty_multiplier: f64,
    boost: Option<BoostGrant>,
    network: String,
    explorer_url: String,
}

impl From<SettlementRecord> for FortuneResponse {
    fn from(record: SettlementRecord) -> Self {
        let emoji = if record.tier == oracle::REJECTED_TIER {
            "\u{1F64F}"
        } else {
            oracle::tier_spec(record.tier).emoji
        };
        let payout = U256::from_str(&record.payout_wei)
            .map(format_amount)
            .unwrap_or_else(|_| record.payout_wei.clone());

        Self {
            outcome: record.outcome,
            tier: record.tier,
            emoji,
            blessing: record.blessing,
            amount: record.amount,
            payout,
            payout_wei: record.payout_wei,
            payout_status: record.payout_status,
            payout_tx_hash: record.payout_tx_hash,
            penalties: record.penalties,
            penalty_multiplier: record.penalty_multiplier,
            boost: record.boost,
            network: record.network,
            explorer_url: record.explorer_url,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn settle(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FortuneRequest>, JsonRejection>,
) -> Response {
    // Body and schema problems are caller faults, same 400 class as a
    // malformed hash.
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: rejection.body_text(),
                }),
            )
                .into_response();
        }
    };

    let request = SettleRequest {
        tx_hash: request.tx_hash,
        wish: request.wish,
        boost_tx_hash: request.boost_tx_hash,
        network: request.network,
    };

    match state.pipeline.settle(request).await {
        Ok(record) => Json(FortuneResponse::from(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn history(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Response {
    match state.pipeline.history(&address).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => error_response(err),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let mut networks = serde_json::Map::new();
    for network in state.pipeline.networks().iter() {
        // A zero treasury is the placeholder config, not a dead RPC.
        let entry: Value = if network.treasury() == Address::ZERO {
            json!({ "error": "not configured" })
        } else {
            match network.client.get_balance(network.treasury()).await {
                Ok(balance) => json!({
                    "treasury": network.settings.treasury_address,
                    "balance": format!("{} {}", format_amount(balance), network.settings.currency),
                    "rpc": network.settings.rpc_url,
                    "explorer": network.settings.explorer_url,
                }),
                Err(_) => json!({ "error": "connection failed" }),
            }
        };
        networks.insert(network.name().to_string(), entry);
    }

    Json(json!({
        "status": "ok",
        "uptime": format!("{}s", state.started.elapsed().as_secs()),
        "networks": networks,
    }))
    .into_response()
}

/// Caller faults map to 400 with the rejection reason; anything else is a
/// generic 500 that leaks no internals.
fn error_response(err: Error) -> Response {
    if err.is_rejection() {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response()
    } else {
        error!(?err, "request failed unexpectedly");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "internal error".to_string(),
            }),
        )
            .into_response()
    }
}
