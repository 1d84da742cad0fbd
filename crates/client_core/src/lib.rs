use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use shared::{
    domain::{validate_entry_fields, AccountAddress, GuestbookEntry, SessionSnapshot},
    error::GuestbookError,
    protocol::{GuestbookEvent, Notification},
};
use storage::{Storage, MAX_PAGE_LIMIT};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod backends;
mod entry_store;
mod session;
pub mod settings;

pub use backends::{
    DevAccountWallet, EntrySubmitter, LedgerSubmitter, MissingEntrySubmitter,
    MissingWalletConnector, SimulatedLedger, SimulatedWallet, WalletConnector,
};
pub use entry_store::EntryStore;
pub use settings::{load_settings, GuestbookSettings};

use session::SessionState;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct ClientState {
    session: SessionState,
    entries: EntryStore,
}

/// Guestbook state container plus the connect, disconnect and submit
/// handlers that drive it.
///
/// The state lock is never held across a wallet or submission call, so a
/// second connect or submit can arrive while one is outstanding; those are
/// rejected with [`GuestbookError::Busy`].
#[derive(Clone)]
pub struct GuestbookClient {
    state: Arc<Mutex<ClientState>>,
    wallet: Arc<dyn WalletConnector>,
    submitter: Arc<dyn EntrySubmitter>,
    events: broadcast::Sender<GuestbookEvent>,
    operation_timeout: Option<Duration>,
}

impl GuestbookClient {
    pub fn new(
        wallet: Arc<dyn WalletConnector>,
        submitter: Arc<dyn EntrySubmitter>,
        entries: EntryStore,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(ClientState {
                session: SessionState::default(),
                entries,
            })),
            wallet,
            submitter,
            events,
            operation_timeout: None,
        }
    }

    /// Fails a wallet or submission call that runs longer than `timeout`.
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Builds a client from settings. With a `database_url` the client submits
    /// to that ledger as a dev account and starts from the ledger's latest
    /// entries; otherwise both suspend points are simulated.
    pub async fn from_settings(settings: &GuestbookSettings) -> Result<Self> {
        let client = match settings.database_url.as_deref() {
            Some(database_url) => {
                let storage = Storage::new(database_url).await?;
                let entries = load_ledger_entries(&storage).await?;
                info!(
                    %database_url,
                    entries = entries.len(),
                    "guestbook client backed by ledger"
                );
                Self::new(
                    Arc::new(DevAccountWallet::new(
                        settings.dev_account,
                        settings.connect_delay(),
                    )),
                    Arc::new(LedgerSubmitter::new(storage, settings.submit_delay())),
                    entries,
                )
            }
            None => {
                let entries = if settings.seed_mock_entries {
                    EntryStore::seeded(Utc::now())
                } else {
                    EntryStore::default()
                };
                info!(entries = entries.len(), "guestbook client running simulated");
                Self::new(
                    Arc::new(SimulatedWallet::new(settings.connect_delay())),
                    Arc::new(SimulatedLedger::new(settings.submit_delay())),
                    entries,
                )
            }
        };
        Ok(client.with_operation_timeout(settings.operation_timeout()))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GuestbookEvent> {
        self.events.subscribe()
    }

    pub async fn session(&self) -> SessionSnapshot {
        self.state.lock().await.session.snapshot()
    }

    /// Entries newest first.
    pub async fn list(&self) -> Vec<GuestbookEntry> {
        self.state.lock().await.entries.list().to_vec()
    }

    pub async fn entry_count(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn connect(&self) -> Result<AccountAddress, GuestbookError> {
        let generation = {
            let mut state = self.state.lock().await;
            if let Some(address) = state.session.address.clone() {
                debug!(%address, "wallet: already connected");
                return Ok(address);
            }
            if state.session.connecting {
                return Err(GuestbookError::Busy("wallet connection"));
            }
            state.session.connecting = true;
            self.publish_session(&state.session);
            state.session.generation
        };

        info!("wallet: authorization requested");
        let outcome = self
            .bounded(self.wallet.authorize(), "wallet authorization")
            .await;

        let mut state = self.state.lock().await;
        if state.session.generation != generation {
            warn!("wallet: authorization finished after disconnect; discarding");
            self.notify(Notification::connection_failed());
            return Err(GuestbookError::Connection(
                "connection was cancelled by a disconnect".into(),
            ));
        }

        match outcome {
            Ok(address) => {
                state.session.mark_connected(address.clone());
                info!(%address, "wallet: connected");
                self.publish_session(&state.session);
                self.notify(Notification::wallet_connected(&address));
                Ok(address)
            }
            Err(error) => {
                state.session.connecting = false;
                warn!(%error, "wallet: connection failed");
                self.publish_session(&state.session);
                self.notify(Notification::connection_failed());
                Err(GuestbookError::Connection(error.to_string()))
            }
        }
    }

    /// Resets the session to disconnected with empty drafts. Entries are
    /// untouched.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        let was_connected = state.session.is_connected();
        state.session.reset();
        info!(was_connected, "wallet: disconnected");
        self.publish_session(&state.session);
        self.notify(Notification::wallet_disconnected());
    }

    pub async fn set_draft_name(&self, value: &str) -> Result<(), GuestbookError> {
        let mut state = self.state.lock().await;
        if !state.session.is_connected() {
            return Err(GuestbookError::NotConnected);
        }
        state.session.set_draft_name(value);
        Ok(())
    }

    pub async fn set_draft_message(&self, value: &str) -> Result<(), GuestbookError> {
        let mut state = self.state.lock().await;
        if !state.session.is_connected() {
            return Err(GuestbookError::NotConnected);
        }
        state.session.set_draft_message(value);
        Ok(())
    }

    /// Submits whatever is currently in the draft fields.
    pub async fn submit_draft(&self) -> Result<GuestbookEntry, GuestbookError> {
        let (name, message) = {
            let state = self.state.lock().await;
            (
                state.session.draft_name.clone(),
                state.session.draft_message.clone(),
            )
        };
        self.submit(&name, &message).await
    }

    pub async fn submit(&self, name: &str, message: &str) -> Result<GuestbookEntry, GuestbookError> {
        let (author, generation) = {
            let mut state = self.state.lock().await;
            let Some(author) = state.session.address.clone() else {
                self.notify(Notification::not_connected());
                return Err(GuestbookError::NotConnected);
            };
            if let Err(error) = validate_entry_fields(name, message) {
                if name.trim().is_empty() || message.trim().is_empty() {
                    self.notify(Notification::missing_information());
                } else {
                    self.notify(Notification::invalid_entry(error.to_string()));
                }
                return Err(error);
            }
            if state.session.submitting {
                return Err(GuestbookError::Busy("entry submission"));
            }
            state.session.set_draft_name(name);
            state.session.set_draft_message(message);
            state.session.submitting = true;
            self.publish_session(&state.session);
            (author, state.session.generation)
        };

        info!(author = %author, "guestbook: submitting entry");
        let outcome = self
            .bounded(
                self.submitter.submit_entry(&author, name, message),
                "entry submission",
            )
            .await;

        let mut state = self.state.lock().await;
        // A disconnect in the meantime already reset the in-flight flag and drafts.
        let same_session = state.session.generation == generation;
        if same_session {
            state.session.submitting = false;
        }

        let entry = match outcome {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "guestbook: submission failed; drafts kept for retry");
                self.publish_session(&state.session);
                self.notify(Notification::transaction_failed());
                return Err(GuestbookError::Submission(error.to_string()));
            }
        };

        if let Err(error) = state.entries.prepend(entry.clone()) {
            warn!(%error, "guestbook: rejected submitted entry");
            self.publish_session(&state.session);
            self.notify(Notification::transaction_failed());
            return Err(error);
        }
        if same_session {
            state.session.clear_drafts();
        } else {
            warn!(entry_id = %entry.id, "guestbook: entry landed after disconnect");
        }

        info!(entry_id = %entry.id, total = state.entries.len(), "guestbook: entry added");
        self.publish_session(&state.session);
        self.emit(GuestbookEvent::EntryAdded {
            entry: entry.clone(),
        });
        self.notify(Notification::message_added());
        Ok(entry)
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T>>,
        what: &str,
    ) -> Result<T> {
        match self.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| anyhow!("{what} timed out after {}ms", limit.as_millis()))?,
            None => operation.await,
        }
    }

    fn publish_session(&self, session: &SessionState) {
        self.emit(GuestbookEvent::SessionChanged(session.snapshot()));
    }

    fn notify(&self, notification: Notification) {
        debug!(title = %notification.title, destructive = notification.is_destructive(), "notification");
        self.emit(GuestbookEvent::Notification(notification));
    }

    fn emit(&self, event: GuestbookEvent) {
        // No subscribers is fine; the state container is the source of truth.
        let _ = self.events.send(event);
    }
}

async fn load_ledger_entries(storage: &Storage) -> Result<EntryStore> {
    let latest = storage.get_latest_entries(MAX_PAGE_LIMIT).await?;
    Ok(EntryStore::from_entries(
        latest.iter().map(|entry| entry.to_guestbook_entry()).collect(),
    ))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
