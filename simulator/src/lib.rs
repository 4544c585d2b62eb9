//! In-process implementation of the remote game API, used by tests and local
//! development in place of the hosted backend.

use glazery_types::{Address, GameState, TxParams, WeiAmount};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

mod api;
pub use api::Api;

/// Contract the glaze transaction is aimed at.
pub const MULTICALL_ADDRESS: &str = "0xe03a89eb8b75d73caf762a81da260106fd42f18a";
/// LP token contract targeted by approvals and buys.
pub const LP_TOKEN_ADDRESS: &str = "0xc3b9bd6f7d4bfcc22696a7bc1cc83948a33d7fab";

// 4-byte markers so tests can tell which endpoint produced a calldata blob.
const GLAZE_SELECTOR: &str = "474c415a";
const APPROVE_SELECTOR: &str = "41505056";
const BLAZE_SELECTOR: &str = "424c5a45";

/// Holds the game snapshot served over HTTP and produces ready-to-sign
/// transaction parameters on demand.
pub struct Simulator {
    state: Mutex<GameState>,
    param_counter: AtomicU64,
    state_failures: AtomicUsize,
    params_failures: AtomicUsize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GameState::default()),
            param_counter: AtomicU64::new(0),
            state_failures: AtomicUsize::new(0),
            params_failures: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> GameState {
        self.state.lock().unwrap().clone()
    }

    pub fn set_state(&self, state: GameState) {
        *self.state.lock().unwrap() = state;
    }

    /// Mutate the served snapshot in place, e.g. to mark an approval as
    /// landed or to credit a balance between polls.
    pub fn update_state(&self, f: impl FnOnce(&mut GameState)) {
        f(&mut self.state.lock().unwrap());
    }

    /// Make the next `n` game-state fetches fail with 503.
    pub fn fail_state_requests(&self, n: usize) {
        self.state_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` transaction-parameter fetches fail with 503.
    pub fn fail_params_requests(&self, n: usize) {
        self.params_failures.store(n, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    pub(crate) fn take_state_failure(&self) -> bool {
        Self::take_failure(&self.state_failures)
    }

    pub(crate) fn take_params_failure(&self) -> bool {
        Self::take_failure(&self.params_failures)
    }

    fn calldata(&self, selector: &str, player: &Address) -> String {
        let nonce = self.param_counter.fetch_add(1, Ordering::SeqCst);
        format!(
            "0x{selector}{}{nonce:016x}",
            player.as_str().trim_start_matches("0x")
        )
    }

    pub fn glaze_params(&self, player: &Address) -> TxParams {
        TxParams {
            to: MULTICALL_ADDRESS.parse().expect("static address"),
            data: self.calldata(GLAZE_SELECTOR, player),
            value: Some(WeiAmount::new("0x2386f26fc10000")),
        }
    }

    pub fn approve_lp_params(&self, player: &Address) -> TxParams {
        TxParams {
            to: LP_TOKEN_ADDRESS.parse().expect("static address"),
            data: self.calldata(APPROVE_SELECTOR, player),
            value: None,
        }
    }

    pub fn blaze_params(&self, player: &Address) -> TxParams {
        TxParams {
            to: LP_TOKEN_ADDRESS.parse().expect("static address"),
            data: self.calldata(BLAZE_SELECTOR, player),
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glazery_types::TxEnvelope;
    use std::net::SocketAddr;
    use std::sync::Arc;

    async fn serve(simulator: Arc<Simulator>) -> (String, tokio::task::JoinHandle<()>) {
        let router = Api::new(simulator).router();
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .await
                .unwrap();
        });
        (base_url, handle)
    }

    #[tokio::test]
    async fn test_serves_game_state_and_params() {
        let simulator = Arc::new(Simulator::new());
        simulator.update_state(|state| {
            state.price = "5000".to_string();
            state.blaze.user_needs_approval = false;
        });
        let (base_url, handle) = serve(simulator.clone()).await;

        let state: GameState = reqwest::get(format!("{base_url}/api/get-game-state"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state.price, "5000");
        assert!(!state.blaze.user_needs_approval);

        let player = "0x1111111111111111111111111111111111111111";
        let envelope: TxEnvelope =
            reqwest::get(format!("{base_url}/api/transaction?player={player}"))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(envelope.params.to.as_str(), MULTICALL_ADDRESS);
        assert!(envelope.params.data.contains(&player[2..]));
        assert!(envelope.params.value.is_some());

        let envelope: TxEnvelope =
            reqwest::get(format!("{base_url}/api/approve-lp?player={player}"))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(envelope.params.to.as_str(), LP_TOKEN_ADDRESS);
        assert!(envelope.params.value.is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn test_injected_failures_and_bad_player() {
        let simulator = Arc::new(Simulator::new());
        simulator.fail_state_requests(1);
        let (base_url, handle) = serve(simulator.clone()).await;

        let response = reqwest::get(format!("{base_url}/api/get-game-state"))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        // The failure budget is spent; the next fetch succeeds.
        let response = reqwest::get(format!("{base_url}/api/get-game-state"))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let response = reqwest::get(format!("{base_url}/api/transaction?player=nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        handle.abort();
    }
}
