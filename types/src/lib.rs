pub mod api;
pub mod transaction;
pub mod wallet;

pub use api::{BlazeState, GameState, TxEnvelope, TxParams};
pub use transaction::{
    Address, AddressParseError, TransactionRequest, TransactionRequestError, TxHash, WeiAmount,
};
pub use wallet::{
    AddressStatus, HostKind, HostUser, ProviderEvent, SessionEvent, WalletCapability, WalletSession,
};
