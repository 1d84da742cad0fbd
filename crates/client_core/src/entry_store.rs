use chrono::{DateTime, Duration, Utc};
use shared::{
    domain::{EntryId, GuestbookEntry},
    error::GuestbookError,
};

/// Guestbook entries held by the client, newest first. Entries are only ever
/// prepended; nothing is edited or removed.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    entries: Vec<GuestbookEntry>,
}

impl EntryStore {
    /// `entries` must already be ordered newest first.
    pub fn from_entries(entries: Vec<GuestbookEntry>) -> Self {
        Self { entries }
    }

    /// The three demo entries shown on a fresh page load.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let seed = |id: &str, address: &str, name: &str, message: &str, hours_ago: i64| {
            GuestbookEntry {
                id: EntryId::new(id),
                address: address.to_string(),
                name: name.to_string(),
                message: message.to_string(),
                timestamp: now - Duration::hours(hours_ago),
            }
        };

        Self::from_entries(vec![
            seed(
                "1",
                "0x1234...5678",
                "Alice",
                "¡Hola World Chain! Excited to be part of this amazing ecosystem 🌍",
                2,
            ),
            seed(
                "2",
                "0xabcd...efgh",
                "Bob",
                "Building the future of decentralized identity, one block at a time! 🚀",
                5,
            ),
            seed(
                "3",
                "0x9876...4321",
                "Charlie",
                "World Chain is revolutionizing how we think about digital identity. Amazing work! 💫",
                24,
            ),
        ])
    }

    pub fn prepend(&mut self, entry: GuestbookEntry) -> Result<(), GuestbookError> {
        if self.contains(&entry.id) {
            return Err(GuestbookError::Submission(format!(
                "duplicate entry id {}",
                entry.id
            )));
        }
        self.entries.insert(0, entry);
        Ok(())
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&GuestbookEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn list(&self) -> &[GuestbookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/entry_store_tests.rs"]
mod tests;
