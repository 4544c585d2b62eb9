pub mod adapter;
pub mod api;
pub mod flows;
pub mod host;
pub mod provider;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use adapter::{RetryPolicy, WalletAdapter};
pub use api::Client;
pub use flows::{BlazeOutcome, FlowConfig, Flows};

use thiserror::Error;

/// How a failed submission was classified by the retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Matched the transient-condition patterns; the attempt budget was
    /// spent before it cleared.
    Transient,
    /// Anything else; never retried.
    Permanent,
}

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed: {status}: {body}")]
    FailedWithBody {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
    #[error("invalid transaction parameters: {0}")]
    InvalidParams(#[from] glazery_types::TransactionRequestError),
    #[error("no wallet available")]
    NoWallet,
    #[error("wallet not connected")]
    NotConnected,
    #[error("explicit connect is only supported by extension wallets")]
    NotAvailable,
    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),
    #[error("transaction failed after {attempts} attempt(s): {message}")]
    Transaction {
        kind: FailureKind,
        attempts: usize,
        message: String,
    },
    #[error("another submission is already in flight")]
    SubmissionInFlight,
    #[error("insufficient LP balance: need {needed:.4}, have {available:.4}")]
    InsufficientBalance { needed: f64, available: f64 },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
