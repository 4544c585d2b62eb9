use async_trait::async_trait;
use glazery_types::{Address, HostUser, ProviderEvent, TransactionRequest, TxHash};
use thiserror::Error;
use tokio::sync::mpsc;

/// Error surfaced by a wallet backend.
///
/// Retryability is classified by substring-matching the raw message (see
/// [`RetryPolicy`](crate::RetryPolicy)), so the message is preserved
/// verbatim rather than being decomposed into variants here.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A wallet backend: the narrow surface both the embedded mini-app wallet
/// and the browser-extension wallet are adapted to.
///
/// Downstream code matches on the resolved
/// [`WalletCapability`](glazery_types::WalletCapability) tag, never on the
/// shape of the object behind this trait.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account access, prompting the user if the backend requires
    /// approval. First entry is the active account.
    async fn request_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError>;

    /// Accounts already authorized, without prompting.
    async fn accounts(&self) -> std::result::Result<Vec<Address>, ProviderError>;

    /// Submit a transaction and return its hash. A single attempt; retry
    /// discipline lives in the adapter.
    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> std::result::Result<TxHash, ProviderError>;

    /// Take the backend's notification stream. Returns `None` once taken, or
    /// if the backend emits no notifications.
    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>>;

    /// Social context from the hosting runtime; embedded backends only.
    async fn host_user(&self) -> Option<HostUser> {
        None
    }
}
