use axum::{
    extract::{Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use glazery_types::{Address, TxEnvelope, TxParams};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::Simulator;

/// HTTP surface over a [`Simulator`], route-compatible with the hosted game
/// API.
pub struct Api {
    simulator: Arc<Simulator>,
}

#[derive(Deserialize)]
struct StateQuery {
    #[serde(rename = "userAddress")]
    user_address: Option<String>,
}

#[derive(Deserialize)]
struct PlayerQuery {
    player: String,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/get-game-state", get(get_game_state))
            .route("/api/transaction", get(get_transaction))
            .route("/api/approve-lp", get(get_approve_lp))
            .route("/api/blaze-transaction", get(get_blaze_transaction))
            .with_state(self.simulator.clone())
    }
}

async fn get_game_state(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Query(query): Query<StateQuery>,
) -> Response {
    if simulator.take_state_failure() {
        return (StatusCode::SERVICE_UNAVAILABLE, "simulated outage").into_response();
    }
    debug!(user_address = ?query.user_address, "serving game state");
    Json(simulator.state()).into_response()
}

fn parse_player(query: &PlayerQuery) -> Result<Address, Response> {
    query.player.parse().map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid player address: {err}"),
        )
            .into_response()
    })
}

fn params_response(
    simulator: &Simulator,
    query: &PlayerQuery,
    build: impl FnOnce(&Simulator, &Address) -> TxParams,
) -> Response {
    if simulator.take_params_failure() {
        return (StatusCode::SERVICE_UNAVAILABLE, "simulated outage").into_response();
    }
    let player = match parse_player(query) {
        Ok(player) => player,
        Err(response) => return response,
    };
    let params = build(simulator, &player);
    Json(TxEnvelope { params }).into_response()
}

async fn get_transaction(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Query(query): Query<PlayerQuery>,
) -> Response {
    params_response(&simulator, &query, Simulator::glaze_params)
}

async fn get_approve_lp(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Query(query): Query<PlayerQuery>,
) -> Response {
    params_response(&simulator, &query, Simulator::approve_lp_params)
}

async fn get_blaze_transaction(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Query(query): Query<PlayerQuery>,
) -> Response {
    params_response(&simulator, &query, Simulator::blaze_params)
}
