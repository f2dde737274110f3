//! Account and contract addresses.
//!
//! Two types live here:
//!
//! - [`Address`] is the canonical 20-byte form used for the contract address
//!   and for anything decoded from return data (the contract's owner). It
//!   parses `0x`-prefixed hex and formats with the EIP-55 mixed-case
//!   checksum.
//! - [`AccountAddress`] is whatever string the provider reported for an
//!   account the user controls. Wallets are not guaranteed to
//!   checksum-normalise, so it is kept verbatim and compared against
//!   [`Address`] values case-insensitively on the hex body.
//!
//! # Checksum rules
//!
//! ```text
//! 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed   mixed case: checksum verified
//! 0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed   all lower:  accepted unchecked
//! 0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED   all upper:  accepted unchecked
//! ```

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address as RawAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing an [`Address`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with '0x': '{0}'")]
    MissingPrefix(String),

    #[error("address must have 40 hex digits, got {1}: '{0}'")]
    InvalidLength(String, usize),

    #[error("address contains a non-hex character: '{0}'")]
    InvalidHex(String),

    #[error("address fails its EIP-55 checksum: '{0}'")]
    BadChecksum(String),
}

/// A canonical 20-byte address.
///
/// Serialises as its EIP-55 checksum string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(RawAddress);

impl Address {
    /// Construct from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(RawAddress::new(bytes))
    }

    /// Borrow the underlying 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0 .0 .0
    }

    /// Parse `0x` followed by exactly 40 hex digits.
    ///
    /// Mixed-case input must carry a valid EIP-55 checksum; single-case input
    /// is accepted as-is.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let body = strip_hex_prefix(s).ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

        if body.len() != 40 {
            return Err(AddressError::InvalidLength(s.to_string(), body.len()));
        }

        let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper {
            return RawAddress::parse_checksummed(format!("0x{body}"), None)
                .map(Self)
                .map_err(|e| match e {
                    alloy_primitives::AddressError::InvalidChecksum => {
                        AddressError::BadChecksum(s.to_string())
                    }
                    _ => AddressError::InvalidHex(s.to_string()),
                });
        }

        RawAddress::from_str(body)
            .map(Self)
            .map_err(|_| AddressError::InvalidHex(s.to_string()))
    }

    /// The EIP-55 checksum form, e.g. `0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed`.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_checksum()
    }
}

impl From<RawAddress> for Address {
    fn from(a: RawAddress) -> Self {
        Self(a)
    }
}

impl From<Address> for RawAddress {
    fn from(a: Address) -> Self {
        a.0
    }
}

/// An account address exactly as the provider reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Wrap a provider-reported address string. Surrounding whitespace is
    /// dropped; nothing else is normalised.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when this account designates `address`.
    ///
    /// Compares the hex bodies ignoring ASCII case, so a lower-cased account
    /// matches a checksummed owner.
    pub fn matches(&self, address: &Address) -> bool {
        match strip_hex_prefix(&self.0) {
            Some(body) => body.eq_ignore_ascii_case(&hex::encode(address.as_bytes())),
            None => false,
        }
    }

    /// Strictly parse this account into an [`Address`], e.g. to pass it as a
    /// contract call argument.
    pub fn to_address(&self) -> Result<Address, AddressError> {
        Address::parse(&self.0)
    }

    /// Shortened form for display; see [`display_address`].
    pub fn display(&self) -> String {
        display_address(self)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Address> for AccountAddress {
    fn from(a: Address) -> Self {
        Self(a.to_checksum())
    }
}

/// `0xABCD...EF12`: the first 6 and last 4 characters of the account joined
/// by an ellipsis.
///
/// Cosmetic only. Never compare or authorize on this value. Strings of 10
/// characters or fewer have nothing to elide and are returned unchanged.
pub fn display_address(account: &AccountAddress) -> String {
    let chars: Vec<char> = account.as_str().chars().collect();
    if chars.len() <= 10 {
        return account.as_str().to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
