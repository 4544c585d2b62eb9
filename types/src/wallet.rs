use crate::transaction::Address;

/// What kind of environment the page is running in, as reported by the
/// injected host probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    /// Hosted inside a mini-app runtime that can supply an embedded wallet.
    Embedded,
    /// A plain browser tab; only an extension wallet can be present.
    Standalone,
}

/// The wallet backend the adapter is currently bound to. Resolved once at
/// initialization; exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletCapability {
    /// No usable wallet; terminal unless the environment changes.
    None,
    /// Wallet supplied by the hosting mini-app runtime. Addresses are
    /// re-requested per call since the host may rotate accounts.
    Embedded,
    /// Wallet supplied by a browser extension. Requires an explicit
    /// user-approved connection before an address is available.
    BrowserExtension,
}

impl WalletCapability {
    pub fn label(&self) -> &'static str {
        match self {
            WalletCapability::None => "none",
            WalletCapability::Embedded => "embedded",
            WalletCapability::BrowserExtension => "extension",
        }
    }
}

/// The adapter's held record of active capability and resolved address.
///
/// Owned exclusively by the adapter; `address` is set only by explicit
/// address-resolution or connect calls, never inferred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletSession {
    pub capability: WalletCapability,
    pub address: Option<Address>,
}

impl WalletSession {
    pub fn new(capability: WalletCapability) -> Self {
        Self {
            capability,
            address: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// Social identity supplied by an embedded host; unavailable on the
/// extension path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUser {
    pub id: u64,
    pub handle: String,
}

/// Notification raised by a wallet backend for the duration of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The authorized account list changed. Empty means disconnected.
    AccountsChanged(Vec<Address>),
    /// The provider switched networks.
    ChainChanged,
}

/// Session-level event the orchestrator reacts to, derived from provider
/// notifications after the session record has been updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The cached address moved to a new account. Dependent state (balances,
    /// display) must be resynced in full.
    AddressChanged(Address),
    /// The account list emptied; the cached address was cleared.
    Disconnected,
    /// Cross-chain state cannot be reconciled piecemeal; everything derived
    /// from the session must be rebuilt.
    Invalidated,
}

/// Result of an address-resolution call. Resolution never errors: provider
/// failures are logged and degrade to `Unavailable`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressStatus {
    Resolved(Address),
    /// An extension wallet is present but the user has not approved a
    /// connection; the caller should present a connect affordance.
    ManualConnectionRequired,
    Unavailable,
}

impl AddressStatus {
    pub fn address(&self) -> Option<&Address> {
        match self {
            AddressStatus::Resolved(address) => Some(address),
            _ => None,
        }
    }
}
