//! Network-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stellar_xdr::curr::{MuxedAccount, Uint256};
use thiserror::Error;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::NetworkConfig;

/// Stroops per XLM (7 decimal places).
pub const STROOPS_PER_XLM: i64 = 10_000_000;

/// Decimal places an amount may carry.
pub const AMOUNT_DECIMALS: usize = 7;

/// Errors that can occur while talking to the network or building transactions.
#[derive(Debug, Error)]
pub enum StellarError {
    /// Transport-level failure (connect, TLS, body decoding).
    #[error("Horizon request failed: {0}")]
    Http(String),

    /// Horizon did not answer within the configured timeout.
    #[error("Horizon timeout after {0} seconds")]
    Timeout(u64),

    /// The account does not exist on the network (unfunded).
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Horizon answered with a problem document.
    #[error("Horizon returned {status} ({title}){}", format_result_codes(.result_codes))]
    Horizon {
        status: u16,
        title: String,
        result_codes: Option<ResultCodes>,
    },

    /// Envelope could not be encoded or decoded.
    #[error("XDR error: {0}")]
    Xdr(String),

    /// Not an `G...` account strkey.
    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    /// Not a decimal amount representable in stroops.
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
}

impl From<stellar_xdr::curr::Error> for StellarError {
    fn from(err: stellar_xdr::curr::Error) -> Self {
        StellarError::Xdr(err.to_string())
    }
}

/// Result type for network operations.
pub type StellarResult<T> = Result<T, StellarError>;

/// `extras.result_codes` of a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

fn format_result_codes(codes: &Option<ResultCodes>) -> String {
    match codes {
        Some(codes) => {
            let mut out = String::new();
            if let Some(tx) = &codes.transaction {
                out.push_str(&format!(": {}", tx));
            }
            if !codes.operations.is_empty() {
                out.push_str(&format!(" [{}]", codes.operations.join(", ")));
            }
            out
        }
        None => String::new(),
    }
}

/// Native asset amount, held in stroops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    /// Whole XLM, saturating at the representable maximum.
    pub fn from_xlm(xlm: i64) -> Self {
        Self(xlm.saturating_mul(STROOPS_PER_XLM))
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = StellarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StellarError::InvalidAmount(s.to_string());
        let trimmed = s.trim();

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > AMOUNT_DECIMALS {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: i64 = format!("{:0<width$}", frac, width = AMOUNT_DECIMALS)
            .parse()
            .map_err(|_| invalid())?;

        let stroops = whole
            .checked_mul(STROOPS_PER_XLM)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;

        Ok(Amount(if negative { -stroops } else { stroops }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = STROOPS_PER_XLM as u64;
        let whole = abs / per;
        let frac = abs % per;
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let frac = format!("{:07}", frac);
            write!(f, "{}{}.{}", sign, whole, frac.trim_end_matches('0'))
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Decoded ed25519 account identifier (`G...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_muxed(&self) -> MuxedAccount {
        MuxedAccount::Ed25519(Uint256(self.0))
    }

    /// Last four bytes of the key, used as a signature hint.
    pub fn signature_hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.0[28..]);
        hint
    }
}

impl FromStr for AccountId {
    type Err = StellarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        stellar_strkey::ed25519::PublicKey::from_string(s.trim())
            .map(|key| AccountId(key.0))
            .map_err(|_| StellarError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stellar_strkey::ed25519::PublicKey(self.0).to_string())
    }
}

impl TryFrom<&MuxedAccount> for AccountId {
    type Error = StellarError;

    fn try_from(account: &MuxedAccount) -> Result<Self, Self::Error> {
        match account {
            MuxedAccount::Ed25519(Uint256(bytes)) => Ok(AccountId(*bytes)),
            MuxedAccount::MuxedEd25519(_) => Err(StellarError::InvalidAddress(
                "muxed accounts are not supported".to_string(),
            )),
        }
    }
}

/// Account state needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: AccountId,
    /// Current sequence number; the next transaction uses `sequence + 1`.
    pub sequence: i64,
}

/// Successful submission as reported by Horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
    #[serde(default)]
    pub ledger: u64,
    #[serde(default = "default_successful")]
    pub successful: bool,
}

fn default_successful() -> bool {
    true
}
