use crate::adapter::WalletAdapter;
use crate::api::Client;
use crate::{Error, Result};
use glazery_types::{AddressStatus, GameState, SessionEvent, TransactionRequest, TxHash};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing knobs for the action flows.
#[derive(Clone, Copy, Debug)]
pub struct FlowConfig {
    /// How long to wait after a successful submission before refreshing the
    /// game state. The system is optimistic: it never tracks on-chain
    /// confirmation, it just gives the chain a head start before polling.
    pub post_submit_refresh: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            post_submit_refresh: Duration::from_secs(3),
        }
    }
}

/// What a blaze action did: the flow is two-step, approval first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlazeOutcome {
    /// The LP approval was submitted; the buy is unlocked for the next call.
    Approved(TxHash),
    /// The buy itself was submitted.
    Bought(TxHash),
}

/// Orchestrates the user-triggered game actions over the API client and the
/// wallet adapter.
///
/// Owns the latest game-state snapshot outright; there is no ambient shared
/// state. All mutation happens through `&mut self` between suspension
/// points.
pub struct Flows {
    api: Client,
    adapter: WalletAdapter,
    state: GameState,
    config: FlowConfig,
    in_flight: bool,
}

impl Flows {
    pub fn new(api: Client, adapter: WalletAdapter) -> Self {
        Self {
            api,
            adapter,
            state: GameState::default(),
            config: FlowConfig::default(),
            in_flight: false,
        }
    }

    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn adapter(&self) -> &WalletAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut WalletAdapter {
        &mut self.adapter
    }

    /// Resolve the wallet address and fetch the initial snapshot. The
    /// returned status tells the caller whether to present a connect
    /// affordance.
    pub async fn init(&mut self) -> AddressStatus {
        let status = self.adapter.resolve_address().await;
        self.refresh().await;
        status
    }

    /// Fetch a fresh game-state snapshot. A failed fetch is logged and
    /// leaves the last snapshot in place; the next poll retries implicitly.
    pub async fn refresh(&mut self) {
        match self.api.game_state(self.adapter.address()).await {
            Ok(state) => {
                debug!("game state refreshed");
                self.state = state;
            }
            Err(err) => warn!(error = %err, "game state fetch failed; keeping last snapshot"),
        }
    }

    async fn refresh_after_delay(&mut self) {
        tokio::time::sleep(self.config.post_submit_refresh).await;
        self.refresh().await;
    }

    /// React to a session event from the adapter. Address and chain changes
    /// rebuild all dependent state in full rather than patching piecemeal.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AddressChanged(_) | SessionEvent::Invalidated => {
                self.refresh().await;
            }
            SessionEvent::Disconnected => info!("wallet disconnected"),
        }
    }

    fn begin_submission(&mut self) -> Result<()> {
        // Single-flight: a second action started while one is running is
        // rejected instead of racing it.
        if self.in_flight {
            return Err(Error::SubmissionInFlight);
        }
        self.in_flight = true;
        Ok(())
    }

    /// The primary action: fetch server-prepared parameters and submit.
    pub async fn glaze(&mut self) -> Result<TxHash> {
        self.begin_submission()?;
        let result = self.glaze_inner().await;
        self.in_flight = false;
        result
    }

    async fn glaze_inner(&mut self) -> Result<TxHash> {
        let address = self.adapter.address().cloned().ok_or(Error::NotConnected)?;
        let params = self.api.glaze_params(&address).await?;
        let request = TransactionRequest::from_params(address, params)?;
        let hash = self.adapter.submit(&request).await?;
        info!(hash = %hash, "glaze submitted");
        self.refresh_after_delay().await;
        Ok(hash)
    }

    /// The two-step buy: approval first when the server says one is needed,
    /// then a balance-checked buy.
    pub async fn blaze(&mut self) -> Result<BlazeOutcome> {
        self.begin_submission()?;
        let result = self.blaze_inner().await;
        self.in_flight = false;
        result
    }

    async fn blaze_inner(&mut self) -> Result<BlazeOutcome> {
        let address = self.adapter.address().cloned().ok_or(Error::NotConnected)?;

        if self.state.blaze.user_needs_approval {
            let params = self.api.approve_lp_params(&address).await?;
            let request = TransactionRequest::from_params(address, params)?;
            let hash = self.adapter.submit(&request).await?;
            // Unlock the buy locally before the server catches up.
            self.state.blaze.user_needs_approval = false;
            info!(hash = %hash, "approval submitted");
            self.refresh_after_delay().await;
            return Ok(BlazeOutcome::Approved(hash));
        }

        let available = self.state.blaze.lp_balance();
        let needed = self.state.blaze.lp_price();
        if available < needed {
            return Err(Error::InsufficientBalance { needed, available });
        }

        let params = self.api.blaze_params(&address).await?;
        let request = TransactionRequest::from_params(address, params)?;
        let hash = self.adapter.submit(&request).await?;
        info!(hash = %hash, "buy submitted");
        self.refresh_after_delay().await;
        Ok(BlazeOutcome::Bought(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{addr, MockHost, MockProvider};
    use crate::tests::TestContext;
    use glazery_simulator::{LP_TOKEN_ADDRESS, MULTICALL_ADDRESS};
    use std::sync::Arc;

    fn instant_config() -> FlowConfig {
        FlowConfig {
            post_submit_refresh: Duration::ZERO,
        }
    }

    async fn embedded_flows(ctx: &TestContext, provider: Arc<MockProvider>) -> Flows {
        let host = MockHost::embedded(provider);
        let adapter = WalletAdapter::resolve(&host).await;
        Flows::new(ctx.create_client(), adapter).with_config(instant_config())
    }

    #[tokio::test]
    async fn test_init_resolves_address_and_fetches_state() {
        let ctx = TestContext::new().await;
        ctx.simulator.update_state(|state| {
            state.price = "777".to_string();
        });
        let mut flows = embedded_flows(&ctx, MockProvider::embedded(vec![addr(1)])).await;

        let status = flows.init().await;
        assert_eq!(status.address(), Some(&addr(1)));
        assert_eq!(flows.state().price, "777");
    }

    #[tokio::test]
    async fn test_glaze_submits_server_params_and_refreshes() {
        let ctx = TestContext::new().await;
        let provider = MockProvider::embedded(vec![addr(1)]);
        let mut flows = embedded_flows(&ctx, provider.clone()).await;
        flows.init().await;

        ctx.simulator.update_state(|state| {
            state.price = "after-glaze".to_string();
        });

        flows.glaze().await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.sender(), &addr(1));
        assert_eq!(request.recipient().as_str(), MULTICALL_ADDRESS);
        // The optimistic post-submit refresh already picked up the new
        // snapshot.
        assert_eq!(flows.state().price, "after-glaze");
    }

    #[tokio::test]
    async fn test_glaze_requires_connected_wallet() {
        let ctx = TestContext::new().await;
        let host = MockHost::extension(MockProvider::extension(vec![addr(2)]));
        let adapter = WalletAdapter::resolve(&host).await;
        let mut flows =
            Flows::new(ctx.create_client(), adapter).with_config(instant_config());

        assert_eq!(
            flows.init().await,
            glazery_types::AddressStatus::ManualConnectionRequired
        );
        assert!(matches!(flows.glaze().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_blaze_approves_then_buys() {
        let ctx = TestContext::new().await;
        ctx.simulator.update_state(|state| {
            state.blaze.user_lp_balance_formatted = "10.0".to_string();
            state.blaze.price_formatted = "1.0".to_string();
            // user_needs_approval defaults to true
        });
        let provider = MockProvider::embedded(vec![addr(1)]);
        let mut flows = embedded_flows(&ctx, provider.clone()).await;
        flows.init().await;
        assert!(flows.state().blaze.user_needs_approval);

        // Keep the server lagging behind so only the local flip can unlock
        // the buy.
        ctx.simulator.fail_state_requests(1);
        let outcome = flows.blaze().await.unwrap();
        assert!(matches!(outcome, BlazeOutcome::Approved(_)));
        assert!(!flows.state().blaze.user_needs_approval);
        assert_eq!(
            provider.last_request().unwrap().recipient().as_str(),
            LP_TOKEN_ADDRESS
        );

        let outcome = flows.blaze().await.unwrap();
        assert!(matches!(outcome, BlazeOutcome::Bought(_)));
        assert_eq!(provider.sends(), 2);
    }

    #[tokio::test]
    async fn test_blaze_rejects_insufficient_balance() {
        let ctx = TestContext::new().await;
        ctx.simulator.update_state(|state| {
            state.blaze.user_needs_approval = false;
            state.blaze.user_lp_balance_formatted = "0.5".to_string();
            state.blaze.price_formatted = "1.0".to_string();
        });
        let provider = MockProvider::embedded(vec![addr(1)]);
        let mut flows = embedded_flows(&ctx, provider.clone()).await;
        flows.init().await;

        let err = flows.blaze().await.unwrap_err();
        let Error::InsufficientBalance { needed, available } = err else {
            panic!("expected InsufficientBalance, got {err:?}");
        };
        assert_eq!(needed, 1.0);
        assert_eq!(available, 0.5);
        // Nothing was submitted.
        assert_eq!(provider.sends(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_snapshot() {
        let ctx = TestContext::new().await;
        ctx.simulator.update_state(|state| {
            state.price = "keep-me".to_string();
        });
        let mut flows = embedded_flows(&ctx, MockProvider::embedded(vec![addr(1)])).await;
        flows.init().await;

        ctx.simulator.fail_state_requests(1);
        flows.refresh().await;
        assert_eq!(flows.state().price, "keep-me");
    }

    #[tokio::test]
    async fn test_single_flight_guard() {
        let ctx = TestContext::new().await;
        let mut flows = embedded_flows(&ctx, MockProvider::embedded(vec![addr(1)])).await;
        flows.init().await;

        flows.in_flight = true;
        assert!(matches!(flows.glaze().await, Err(Error::SubmissionInFlight)));
        assert!(matches!(flows.blaze().await, Err(Error::SubmissionInFlight)));

        // The guard releases once the running action finishes.
        flows.in_flight = false;
        assert!(flows.glaze().await.is_ok());
    }

    #[tokio::test]
    async fn test_session_events_trigger_full_resync() {
        let ctx = TestContext::new().await;
        let provider = MockProvider::extension(vec![addr(2)]);
        let host = MockHost::extension(provider.clone());
        let adapter = WalletAdapter::resolve(&host).await;
        let mut flows =
            Flows::new(ctx.create_client(), adapter).with_config(instant_config());
        flows.init().await;
        flows.adapter_mut().connect().await.unwrap();

        ctx.simulator.update_state(|state| {
            state.price = "post-switch".to_string();
        });
        provider.emit(glazery_types::ProviderEvent::AccountsChanged(vec![addr(8)]));
        let event = flows.adapter_mut().next_event().await.unwrap();
        flows.handle_event(event).await;

        assert_eq!(flows.adapter().address(), Some(&addr(8)));
        assert_eq!(flows.state().price, "post-switch");
    }
}
