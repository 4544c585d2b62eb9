use crate::provider::{ProviderError, WalletProvider};
use async_trait::async_trait;
use glazery_types::HostKind;
use std::sync::Arc;

/// The environment the application was started in, injected at startup.
///
/// Replaces ad hoc runtime sniffing (iframe-origin comparison, user-agent
/// substrings) with a single probe, so tests can substitute a fake host.
#[async_trait]
pub trait HostEnvironment: Send + Sync {
    /// One-shot environment probe.
    fn detect(&self) -> HostKind;

    /// Handshake with the embedded host's wallet. Only invoked when
    /// [`detect`](Self::detect) reports an embedded host.
    async fn embedded_provider(&self) -> std::result::Result<Arc<dyn WalletProvider>, ProviderError>;

    /// Browser-extension wallet, if one is present and self-identifies as
    /// the expected extension.
    fn extension_provider(&self) -> Option<Arc<dyn WalletProvider>>;
}
