use serde::{Deserialize, Serialize};

use crate::transaction::{Address, WeiAmount};

/// Ready-to-sign transaction parameters as returned by the game API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParams {
    pub to: Address,
    /// Calldata as a hex string.
    pub data: String,
    /// Missing on some endpoints; treated as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WeiAmount>,
}

/// Envelope the transaction-parameter endpoints wrap their payload in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEnvelope {
    pub params: TxParams,
}

/// Snapshot of the blaze (LP buy-in) side of the game.
///
/// Amounts arrive both raw (stringified integers) and pre-formatted for
/// display; the client-side sufficiency check runs on the formatted values,
/// matching the reference behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlazeState {
    pub epoch_id: u64,
    pub price: String,
    pub price_formatted: String,
    pub weth_balance: String,
    pub weth_balance_formatted: String,
    pub user_lp_balance: String,
    pub user_lp_balance_formatted: String,
    pub payment_token: Option<Address>,
    /// Defaults to `true` when the server omits it: an unknown approval
    /// state must gate the buy behind an approval.
    pub user_needs_approval: bool,
}

impl Default for BlazeState {
    fn default() -> Self {
        Self {
            epoch_id: 0,
            price: "0".to_string(),
            price_formatted: "0".to_string(),
            weth_balance: "0".to_string(),
            weth_balance_formatted: "0".to_string(),
            user_lp_balance: "0".to_string(),
            user_lp_balance_formatted: "0".to_string(),
            payment_token: None,
            user_needs_approval: true,
        }
    }
}

impl BlazeState {
    /// LP tokens the user holds, from the display form. Unparseable values
    /// count as zero, which fails the sufficiency check.
    pub fn lp_balance(&self) -> f64 {
        self.user_lp_balance_formatted.parse().unwrap_or(0.0)
    }

    /// LP tokens one buy costs, from the display form.
    pub fn lp_price(&self) -> f64 {
        self.price_formatted.parse().unwrap_or(0.0)
    }
}

/// Snapshot of the game state as returned by `GET /api/get-game-state`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub current_miner: Option<Address>,
    pub price: String,
    pub price_in_eth: String,
    pub current_dps: String,
    pub current_dps_formatted: String,
    pub user_donut_balance: String,
    pub user_donut_balance_formatted: String,
    pub user_eth_balance: String,
    pub user_eth_balance_formatted: String,
    pub claimable_donuts: String,
    pub claimable_donuts_formatted: String,
    pub total_donut_supply: String,
    pub total_donut_supply_formatted: String,
    pub time_as_miner: u64,
    pub seconds_until_halving: u64,
    pub blaze: BlazeState,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_miner: None,
            price: "0".to_string(),
            price_in_eth: "0.0".to_string(),
            current_dps: "0".to_string(),
            current_dps_formatted: "0".to_string(),
            user_donut_balance: "0".to_string(),
            user_donut_balance_formatted: "0".to_string(),
            user_eth_balance: "0".to_string(),
            user_eth_balance_formatted: "0".to_string(),
            claimable_donuts: "0".to_string(),
            claimable_donuts_formatted: "0".to_string(),
            total_donut_supply: "0".to_string(),
            total_donut_supply_formatted: "0".to_string(),
            time_as_miner: 0,
            seconds_until_halving: 0,
            blaze: BlazeState::default(),
        }
    }
}
