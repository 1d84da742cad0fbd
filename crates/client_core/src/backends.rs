//! Wallet and submission backends behind the client's two suspend points.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use shared::domain::{AccountAddress, EntryId, GuestbookEntry};
use storage::Storage;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(2000);

#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Asks the wallet to authorize this client and returns the account it
    /// connected with.
    async fn authorize(&self) -> Result<AccountAddress>;
}

#[async_trait]
pub trait EntrySubmitter: Send + Sync {
    /// Records a new entry and returns it as stored.
    async fn submit_entry(
        &self,
        author: &AccountAddress,
        name: &str,
        message: &str,
    ) -> Result<GuestbookEntry>;
}

pub struct MissingWalletConnector;

#[async_trait]
impl WalletConnector for MissingWalletConnector {
    async fn authorize(&self) -> Result<AccountAddress> {
        Err(anyhow!("wallet provider is unavailable"))
    }
}

pub struct MissingEntrySubmitter;

#[async_trait]
impl EntrySubmitter for MissingEntrySubmitter {
    async fn submit_entry(
        &self,
        _author: &AccountAddress,
        _name: &str,
        _message: &str,
    ) -> Result<GuestbookEntry> {
        Err(anyhow!("entry ledger is unavailable"))
    }
}

/// Wallet stand-in: waits `delay`, then connects with a fresh random account.
pub struct SimulatedWallet {
    delay: Duration,
}

impl SimulatedWallet {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedWallet {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_DELAY)
    }
}

#[async_trait]
impl WalletConnector for SimulatedWallet {
    async fn authorize(&self) -> Result<AccountAddress> {
        tokio::time::sleep(self.delay).await;

        let mut bytes = [0u8; 20];
        bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
        bytes[16..].copy_from_slice(&Uuid::new_v4().as_bytes()[..4]);
        Ok(AccountAddress::from_bytes(&bytes))
    }
}

/// Hands out one of the local development accounts after waiting `delay`.
pub struct DevAccountWallet {
    index: usize,
    delay: Duration,
}

impl DevAccountWallet {
    pub fn new(index: usize, delay: Duration) -> Self {
        Self { index, delay }
    }
}

#[async_trait]
impl WalletConnector for DevAccountWallet {
    async fn authorize(&self) -> Result<AccountAddress> {
        tokio::time::sleep(self.delay).await;
        Ok(AccountAddress::dev_account(self.index)?)
    }
}

/// Submission stand-in: waits `delay`, then mints the entry locally with a
/// millisecond-timestamp id.
pub struct SimulatedLedger {
    delay: Duration,
    last_id: Mutex<i64>,
}

impl SimulatedLedger {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_id: Mutex::new(0),
        }
    }
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_DELAY)
    }
}

#[async_trait]
impl EntrySubmitter for SimulatedLedger {
    async fn submit_entry(
        &self,
        author: &AccountAddress,
        name: &str,
        message: &str,
    ) -> Result<GuestbookEntry> {
        tokio::time::sleep(self.delay).await;

        let timestamp = Utc::now();
        let id = {
            let mut last_id = self.last_id.lock().await;
            // Two submissions inside the same millisecond still get distinct ids.
            *last_id = timestamp.timestamp_millis().max(*last_id + 1);
            *last_id
        };
        Ok(GuestbookEntry {
            id: EntryId::new(id.to_string()),
            address: author.short(),
            name: name.to_string(),
            message: message.to_string(),
            timestamp,
        })
    }
}

/// Appends entries to the SQLite ledger, which assigns the ids.
#[derive(Clone)]
pub struct LedgerSubmitter {
    storage: Storage,
    delay: Duration,
}

impl LedgerSubmitter {
    pub fn new(storage: Storage, delay: Duration) -> Self {
        Self { storage, delay }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

#[async_trait]
impl EntrySubmitter for LedgerSubmitter {
    async fn submit_entry(
        &self,
        author: &AccountAddress,
        name: &str,
        message: &str,
    ) -> Result<GuestbookEntry> {
        tokio::time::sleep(self.delay).await;
        let id = self.storage.add_entry(author, name, message).await?;
        debug!(entry_id = id.0, "ledger accepted entry");
        let stored = self
            .storage
            .get_entry(id)
            .await?
            .with_context(|| format!("ledger entry {} missing right after append", id.0))?;
        Ok(stored.to_guestbook_entry())
    }
}

#[cfg(test)]
#[path = "tests/backends_tests.rs"]
mod tests;
