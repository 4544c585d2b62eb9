use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::api::TxParams;

/// Error type for address parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must be 0x-prefixed")]
    MissingPrefix,
    #[error("address must be 40 hex digits, got {0}")]
    BadLength(usize),
    #[error("address contains non-hex characters")]
    NotHex,
}

/// A 20-byte account address in its canonical `0x`-prefixed hex form.
///
/// Stored lowercased so equality and hashing are insensitive to the mixed-case
/// checksummed form wallets sometimes hand back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for display labels: first six characters, an ellipsis,
    /// and the last four (`0x1234...abcd`).
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(digits) = s.strip_prefix("0x") else {
            return Err(AddressParseError::MissingPrefix);
        };
        if digits.len() != 40 {
            return Err(AddressParseError::BadLength(digits.len()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError::NotHex);
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount of native currency as the API delivers it: an opaque
/// `0x`-prefixed quantity string, passed through to the wallet untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeiAmount(String);

impl WeiAmount {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn zero() -> Self {
        Self("0x0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WeiAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for WeiAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque transaction identifier returned by a wallet on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for building a [`TransactionRequest`] from server parameters.
#[derive(Error, Debug)]
pub enum TransactionRequestError {
    #[error("payload data is not valid hex: {0}")]
    InvalidPayload(#[from] hex::FromHexError),
}

/// A fully-formed transaction ready for submission through a wallet.
///
/// Immutable once constructed; built fresh per submission from the
/// server-supplied `{ to, data, value }` parameters plus the session address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    sender: Address,
    recipient: Address,
    payload_data: Bytes,
    value: WeiAmount,
}

impl TransactionRequest {
    /// Build a request from server-supplied parameters. The server encodes
    /// calldata as a hex string; a missing `value` means zero.
    pub fn from_params(
        sender: Address,
        params: TxParams,
    ) -> Result<Self, TransactionRequestError> {
        let digits = params.data.strip_prefix("0x").unwrap_or(&params.data);
        let payload_data = Bytes::from(hex::decode(digits)?);
        Ok(Self {
            sender,
            recipient: params.to,
            payload_data,
            value: params.value.unwrap_or_default(),
        })
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn payload_data(&self) -> &Bytes {
        &self.payload_data
    }

    /// Calldata re-encoded in the wire form wallets expect.
    pub fn payload_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.payload_data))
    }

    pub fn value(&self) -> &WeiAmount {
        &self.value
    }
}
