use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuestbookError;

pub const NAME_MAX_CHARS: usize = 50;
pub const MESSAGE_MAX_CHARS: usize = 500;

const ADDRESS_HEX_LEN: usize = 40;

/// Well-known local development accounts, in signer order.
pub const DEV_ACCOUNTS: [&str; 3] = [
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
    "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
];

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(LedgerEntryId);

/// Client-side entry identifier. Ledger-backed entries carry the decimal
/// ledger id; simulated entries carry their creation time in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LedgerEntryId> for EntryId {
    fn from(value: LedgerEntryId) -> Self {
        Self(value.0.to_string())
    }
}

/// A 20-byte account address in canonical lowercase `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn parse(raw: &str) -> Result<Self, GuestbookError> {
        let raw = raw.trim();
        let hex = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| GuestbookError::InvalidAddress(raw.to_string()))?;
        if hex.len() != ADDRESS_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GuestbookError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn dev_account(index: usize) -> Result<Self, GuestbookError> {
        let raw = DEV_ACCOUNTS.get(index).ok_or_else(|| {
            GuestbookError::InvalidAddress(format!("no dev account at index {index}"))
        })?;
        Self::parse(raw)
    }

    /// Builds an address from 20 raw bytes.
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!("0x{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form used in entry badges: `0x12345678...abcd`.
    pub fn short(&self) -> String {
        let hex = &self.0[2..];
        format!("0x{}...{}", &hex[..8], &hex[ADDRESS_HEX_LEN - 4..])
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = GuestbookError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(value: AccountAddress) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub id: EntryId,
    pub address: String,
    pub name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl GuestbookEntry {
    /// Uppercased first character of the name, used as the avatar label.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AccountAddress>,
    pub draft_name: String,
    pub draft_message: String,
    pub connecting: bool,
    pub submitting: bool,
}

pub fn validate_entry_fields(name: &str, message: &str) -> Result<(), GuestbookError> {
    if name.trim().is_empty() || message.trim().is_empty() {
        return Err(GuestbookError::Validation(
            "name and message must both be filled in".into(),
        ));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(GuestbookError::Validation(format!(
            "name exceeds {NAME_MAX_CHARS} characters"
        )));
    }
    if message.chars().count() > MESSAGE_MAX_CHARS {
        return Err(GuestbookError::Validation(format!(
            "message exceeds {MESSAGE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Cuts `value` down to at most `max_chars` characters.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Relative age label for an entry: "Just now", "{H}h ago" or "{D}d ago".
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed_ms = (now - timestamp).num_milliseconds();
    let hours = elapsed_ms.div_euclid(60 * 60 * 1000);

    if hours < 1 {
        return "Just now".to_string();
    }
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}
