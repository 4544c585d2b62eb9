//! In-memory wallet and host doubles for tests.

use crate::host::HostEnvironment;
use crate::provider::{ProviderError, WalletProvider};
use async_trait::async_trait;
use glazery_types::{Address, HostKind, HostUser, ProviderEvent, TransactionRequest, TxHash};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Deterministic test address.
pub fn addr(n: u8) -> Address {
    format!("0x{n:040x}").parse().unwrap()
}

/// Scriptable wallet backend.
///
/// Embedded mocks hand out accounts without prompting; extension mocks keep
/// `accounts()` empty until `request_accounts()` has authorized the session,
/// matching the two real backends' connection models.
pub struct MockProvider {
    accounts: Mutex<Vec<Address>>,
    authorized: AtomicBool,
    request_failure: Mutex<Option<ProviderError>>,
    account_requests: AtomicUsize,
    send_outcomes: Mutex<VecDeque<Result<TxHash, ProviderError>>>,
    sends: AtomicUsize,
    last_request: Mutex<Option<TransactionRequest>>,
    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ProviderEvent>>>,
    host_user: Mutex<Option<HostUser>>,
}

impl MockProvider {
    fn new(accounts: Vec<Address>, authorized: bool) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            accounts: Mutex::new(accounts),
            authorized: AtomicBool::new(authorized),
            request_failure: Mutex::new(None),
            account_requests: AtomicUsize::new(0),
            send_outcomes: Mutex::new(VecDeque::new()),
            sends: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            host_user: Mutex::new(None),
        })
    }

    pub fn embedded(accounts: Vec<Address>) -> Arc<Self> {
        Self::new(accounts, true)
    }

    pub fn extension(accounts: Vec<Address>) -> Arc<Self> {
        Self::new(accounts, false)
    }

    pub fn with_host_user(self: Arc<Self>, id: u64, handle: &str) -> Arc<Self> {
        *self.host_user.lock().unwrap() = Some(HostUser {
            id,
            handle: handle.to_string(),
        });
        self
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    /// Fail the next `request_accounts` call, e.g. a user rejecting the
    /// connection prompt.
    pub fn fail_next_request(&self, error: ProviderError) {
        *self.request_failure.lock().unwrap() = Some(error);
    }

    /// Queue the outcome of the next `send_transaction` call. Unscripted
    /// sends succeed with a deterministic hash.
    pub fn script_send(&self, outcome: Result<TxHash, ProviderError>) {
        self.send_outcomes.lock().unwrap().push_back(outcome);
    }

    /// Push a provider notification to whoever holds the subscription.
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn account_requests(&self) -> usize {
        self.account_requests.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// The most recent request passed to `send_transaction`.
    pub fn last_request(&self) -> Option<TransactionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.request_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        if !self.authorized.load(Ordering::SeqCst) {
            return Ok(vec![]);
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TxHash, ProviderError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        let n = self.sends.fetch_add(1, Ordering::SeqCst);
        match self.send_outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(TxHash::new(format!("0xmock{n:x}"))),
        }
    }

    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>> {
        self.events_rx.lock().unwrap().take()
    }

    async fn host_user(&self) -> Option<HostUser> {
        self.host_user.lock().unwrap().clone()
    }
}

/// Fake host environment wired with optional embedded and extension wallets.
pub struct MockHost {
    kind: HostKind,
    embedded: Option<Arc<MockProvider>>,
    extension: Option<Arc<MockProvider>>,
}

impl MockHost {
    /// An embedded host whose wallet handshake succeeds.
    pub fn embedded(provider: Arc<MockProvider>) -> Self {
        Self {
            kind: HostKind::Embedded,
            embedded: Some(provider),
            extension: None,
        }
    }

    /// An embedded host whose handshake fails, with an extension wallet to
    /// degrade to.
    pub fn embedded_broken_with_extension(extension: Arc<MockProvider>) -> Self {
        Self {
            kind: HostKind::Embedded,
            embedded: None,
            extension: Some(extension),
        }
    }

    /// A plain browser tab with an extension wallet installed.
    pub fn extension(provider: Arc<MockProvider>) -> Self {
        Self {
            kind: HostKind::Standalone,
            embedded: None,
            extension: Some(provider),
        }
    }

    /// No wallet anywhere.
    pub fn bare() -> Self {
        Self {
            kind: HostKind::Standalone,
            embedded: None,
            extension: None,
        }
    }
}

#[async_trait]
impl HostEnvironment for MockHost {
    fn detect(&self) -> HostKind {
        self.kind
    }

    async fn embedded_provider(&self) -> Result<Arc<dyn WalletProvider>, ProviderError> {
        match &self.embedded {
            Some(provider) => Ok(provider.clone()),
            None => Err(ProviderError::new("embedded handshake failed")),
        }
    }

    fn extension_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.extension
            .as_ref()
            .map(|provider| provider.clone() as Arc<dyn WalletProvider>)
    }
}
