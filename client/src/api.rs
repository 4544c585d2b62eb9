use crate::{Error, Result};
use glazery_types::{Address, GameState, TxEnvelope, TxParams};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// HTTP client for the remote game API.
///
/// All endpoints are simple unauthenticated GETs. Construction validates the
/// base URL scheme; everything else is per-call.
pub struct Client {
    client: reqwest::Client,
    pub base_url: Url,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::FailedWithBody { status, body });
        }
        Ok(response.json().await?)
    }

    /// Fetch the current game-state snapshot, optionally scoped to a user so
    /// the server includes their balances and approval status.
    pub async fn game_state(&self, user_address: Option<&Address>) -> Result<GameState> {
        let mut url = self.base_url.join("api/get-game-state")?;
        if let Some(address) = user_address {
            url.query_pairs_mut()
                .append_pair("userAddress", address.as_str());
        }
        self.get_json(url).await
    }

    async fn tx_params(&self, path: &str, player: &Address) -> Result<TxParams> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair("player", player.as_str());
        let envelope: TxEnvelope = self.get_json(url).await?;
        Ok(envelope.params)
    }

    /// Parameters for the primary (glaze) action.
    pub async fn glaze_params(&self, player: &Address) -> Result<TxParams> {
        self.tx_params("api/transaction", player).await
    }

    /// Parameters for the LP approval that gates the first buy.
    pub async fn approve_lp_params(&self, player: &Address) -> Result<TxParams> {
        self.tx_params("api/approve-lp", player).await
    }

    /// Parameters for the blaze (buy) action.
    pub async fn blaze_params(&self, player: &Address) -> Result<TxParams> {
        self.tx_params("api/blaze-transaction", player).await
    }
}
