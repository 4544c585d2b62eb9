use crate::host::HostEnvironment;
use crate::provider::WalletProvider;
use crate::{Error, FailureKind, Result};
use glazery_types::{
    Address, AddressStatus, HostKind, HostUser, ProviderEvent, SessionEvent, TransactionRequest,
    TxHash, WalletCapability, WalletSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Message fragments that signal a transient provider condition: request
/// timeout, upstream queue saturation, or a malformed/overloaded RPC
/// response.
const RETRYABLE_FRAGMENTS: [&str; 3] = ["timeout", "Queue is full", "JSON RPC"];

/// Default predicate for [`RetryPolicy::retryable`].
pub fn default_retryable(message: &str) -> bool {
    RETRYABLE_FRAGMENTS
        .iter()
        .any(|fragment| message.contains(fragment))
}

/// Retry discipline for transaction submission.
///
/// The delay is constant per attempt (not exponential), preserving the
/// reference behavior; tests inject zero delay and custom predicates.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Wait before every attempt after the first.
    pub delay: Duration,
    /// Classifies a provider error message as transient.
    pub retryable: fn(&str) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
            retryable: default_retryable,
        }
    }
}

/// Unifies the embedded and extension wallet backends behind one capability
/// interface and provides bounded-retry transaction submission.
///
/// Owns the [`WalletSession`]; the session's address is written only by
/// address resolution, connect, and provider-event application. Submission
/// only reads it.
pub struct WalletAdapter {
    provider: Option<Arc<dyn WalletProvider>>,
    session: WalletSession,
    host_user: Option<HostUser>,
    events: Option<mpsc::UnboundedReceiver<ProviderEvent>>,
    retry: RetryPolicy,
}

impl WalletAdapter {
    /// Resolve the active wallet capability: embedded host first, extension
    /// second, `None` otherwise. One-shot, best-effort; failures degrade to
    /// the next option.
    pub async fn resolve(host: &dyn HostEnvironment) -> Self {
        if host.detect() == HostKind::Embedded {
            match host.embedded_provider().await {
                Ok(provider) => {
                    info!("embedded wallet initialized");
                    return Self::bound(provider, WalletCapability::Embedded);
                }
                Err(err) => debug!(error = %err, "embedded wallet handshake failed"),
            }
        }

        if let Some(provider) = host.extension_provider() {
            info!("extension wallet detected (not connected yet)");
            return Self::bound(provider, WalletCapability::BrowserExtension);
        }

        info!("no wallet available");
        Self {
            provider: None,
            session: WalletSession::new(WalletCapability::None),
            host_user: None,
            events: None,
            retry: RetryPolicy::default(),
        }
    }

    fn bound(provider: Arc<dyn WalletProvider>, capability: WalletCapability) -> Self {
        Self {
            provider: Some(provider),
            session: WalletSession::new(capability),
            host_user: None,
            events: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn capability(&self) -> WalletCapability {
        self.session.capability
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn address(&self) -> Option<&Address> {
        self.session.address.as_ref()
    }

    /// Social identity from the embedded host, if one was fetched during
    /// address resolution.
    pub fn host_user(&self) -> Option<&HostUser> {
        self.host_user.as_ref()
    }

    /// Resolve the active address. Never errors: provider failures are
    /// logged and reported as a status the caller can act on.
    pub async fn resolve_address(&mut self) -> AddressStatus {
        let Some(provider) = self.provider.clone() else {
            return AddressStatus::Unavailable;
        };

        match self.session.capability {
            WalletCapability::Embedded => {
                // The host may rotate accounts between calls, so re-request
                // instead of trusting a cache.
                match provider.request_accounts().await {
                    Ok(accounts) => match accounts.into_iter().next() {
                        Some(address) => {
                            self.session.address = Some(address.clone());
                            if self.host_user.is_none() {
                                self.host_user = provider.host_user().await;
                            }
                            debug!(address = %address, "resolved embedded address");
                            AddressStatus::Resolved(address)
                        }
                        None => AddressStatus::Unavailable,
                    },
                    Err(err) => {
                        debug!(error = %err, "could not get embedded address");
                        AddressStatus::Unavailable
                    }
                }
            }
            WalletCapability::BrowserExtension => {
                if let Some(address) = &self.session.address {
                    return AddressStatus::Resolved(address.clone());
                }
                // Probe without prompting; only connect() may prompt.
                match provider.accounts().await {
                    Ok(accounts) => match accounts.into_iter().next() {
                        Some(address) => {
                            self.session.address = Some(address.clone());
                            debug!(address = %address, "found previously authorized account");
                            AddressStatus::Resolved(address)
                        }
                        None => AddressStatus::ManualConnectionRequired,
                    },
                    Err(err) => {
                        debug!(error = %err, "extension account probe failed");
                        AddressStatus::ManualConnectionRequired
                    }
                }
            }
            WalletCapability::None => AddressStatus::Unavailable,
        }
    }

    /// Request account access from the extension (user-approval prompt
    /// implied), cache the returned address, and take the provider's event
    /// stream for the rest of the session.
    pub async fn connect(&mut self) -> Result<Address> {
        if self.session.capability != WalletCapability::BrowserExtension {
            return Err(Error::NotAvailable);
        }
        let Some(provider) = self.provider.clone() else {
            return Err(Error::NoWallet);
        };

        let accounts = provider
            .request_accounts()
            .await
            .map_err(|err| Error::ConnectionFailed(err.to_string()))?;
        let Some(address) = accounts.into_iter().next() else {
            return Err(Error::ConnectionFailed(
                "no accounts authorized".to_string(),
            ));
        };

        self.session.address = Some(address.clone());
        if self.events.is_none() {
            self.events = provider.subscribe();
        }
        info!(address = %address, "extension wallet connected");
        Ok(address)
    }

    /// Wait for the next provider notification and fold it into the session.
    /// Returns `None` if no subscription was taken or the stream ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let events = self.events.as_mut()?;
        let event = events.recv().await?;
        Some(self.apply(event))
    }

    fn apply(&mut self, event: ProviderEvent) -> SessionEvent {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                Some(address) => {
                    info!(address = %address, "account changed");
                    self.session.address = Some(address.clone());
                    SessionEvent::AddressChanged(address)
                }
                None => {
                    info!("wallet disconnected");
                    self.session.address = None;
                    SessionEvent::Disconnected
                }
            },
            ProviderEvent::ChainChanged => {
                info!("chain changed; session invalidated");
                SessionEvent::Invalidated
            }
        }
    }

    /// Submit a transaction through the active provider, retrying transient
    /// failures up to the policy's attempt budget. Attempts are strictly
    /// sequential; each attempt after the first waits the policy delay.
    pub async fn submit(&self, request: &TransactionRequest) -> Result<TxHash> {
        let Some(provider) = &self.provider else {
            return Err(Error::NoWallet);
        };
        if self.session.address.is_none() {
            return Err(Error::NotConnected);
        }

        let mut attempts = 0;
        loop {
            if attempts > 0 {
                debug!(
                    attempt = attempts + 1,
                    max = self.retry.max_attempts,
                    "retrying transaction"
                );
                tokio::time::sleep(self.retry.delay).await;
            }
            match provider.send_transaction(request).await {
                Ok(hash) => {
                    info!(hash = %hash, wallet = self.session.capability.label(), "transaction sent");
                    return Ok(hash);
                }
                Err(err) => {
                    attempts += 1;
                    let message = err.to_string();
                    if !(self.retry.retryable)(&message) {
                        warn!(%message, "transaction failed with non-retryable error");
                        return Err(Error::Transaction {
                            kind: FailureKind::Permanent,
                            attempts,
                            message,
                        });
                    }
                    if attempts >= self.retry.max_attempts {
                        warn!(%message, attempts, "transaction failed after exhausting retries");
                        return Err(Error::Transaction {
                            kind: FailureKind::Transient,
                            attempts,
                            message,
                        });
                    }
                }
            }
        }
    }
}
