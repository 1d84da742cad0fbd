use serde::{Deserialize, Serialize};

use crate::domain::{AccountAddress, GuestbookEntry, SessionSnapshot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    #[default]
    Default,
    Destructive,
}

/// A user-visible toast. Rendering is left to the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn wallet_connected(address: &AccountAddress) -> Self {
        Self::info("Wallet Connected", format!("Connected to {}", address.short()))
    }

    pub fn connection_failed() -> Self {
        Self::destructive(
            "Connection Failed",
            "Failed to connect wallet. Please try again.",
        )
    }

    pub fn wallet_disconnected() -> Self {
        Self::info("Wallet Disconnected", "Successfully disconnected from wallet")
    }

    pub fn missing_information() -> Self {
        Self::destructive(
            "Missing Information",
            "Please fill in both name and message fields.",
        )
    }

    pub fn invalid_entry(description: impl Into<String>) -> Self {
        Self::destructive("Invalid Entry", description)
    }

    pub fn not_connected() -> Self {
        Self::destructive(
            "Wallet Not Connected",
            "Connect your wallet before adding a message.",
        )
    }

    pub fn message_added() -> Self {
        Self::info(
            "Message Added!",
            "Your message has been added to the guestbook.",
        )
    }

    pub fn transaction_failed() -> Self {
        Self::destructive(
            "Transaction Failed",
            "Failed to add message. Please try again.",
        )
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GuestbookEvent {
    SessionChanged(SessionSnapshot),
    EntryAdded { entry: GuestbookEntry },
    Notification(Notification),
}
