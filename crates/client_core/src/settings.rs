use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "guestbook.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestbookSettings {
    /// Ledger to submit to. `None` runs fully simulated.
    pub database_url: Option<String>,
    pub connect_delay_ms: u64,
    pub submit_delay_ms: u64,
    pub seed_mock_entries: bool,
    pub operation_timeout_ms: Option<u64>,
    pub dev_account: usize,
}

impl Default for GuestbookSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            connect_delay_ms: 1500,
            submit_delay_ms: 2000,
            seed_mock_entries: true,
            operation_timeout_ms: None,
            dev_account: 0,
        }
    }
}

impl GuestbookSettings {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    database_url: Option<String>,
    connect_delay_ms: Option<u64>,
    submit_delay_ms: Option<u64>,
    seed_mock_entries: Option<bool>,
    operation_timeout_ms: Option<u64>,
    dev_account: Option<usize>,
}

pub fn load_settings() -> GuestbookSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then `path` if it exists, then environment overrides. Both the
/// `GUESTBOOK_*` and `APP__*` spellings are honoured; `APP__*` wins.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> GuestbookSettings {
    let mut settings = GuestbookSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable settings file"),
        }
    }

    let lookup = |suffix: &str| {
        env(&format!("APP__{suffix}")).or_else(|| env(&format!("GUESTBOOK_{suffix}")))
    };

    if let Some(v) = lookup("DATABASE_URL") {
        settings.database_url = (!v.trim().is_empty()).then_some(v);
    }
    if let Some(v) = lookup("CONNECT_DELAY_MS").and_then(|v| parse_env("CONNECT_DELAY_MS", &v)) {
        settings.connect_delay_ms = v;
    }
    if let Some(v) = lookup("SUBMIT_DELAY_MS").and_then(|v| parse_env("SUBMIT_DELAY_MS", &v)) {
        settings.submit_delay_ms = v;
    }
    if let Some(v) = lookup("SEED_MOCK_ENTRIES").and_then(|v| parse_env("SEED_MOCK_ENTRIES", &v)) {
        settings.seed_mock_entries = v;
    }
    if let Some(v) =
        lookup("OPERATION_TIMEOUT_MS").and_then(|v| parse_env("OPERATION_TIMEOUT_MS", &v))
    {
        settings.operation_timeout_ms = Some(v);
    }
    if let Some(v) = lookup("DEV_ACCOUNT").and_then(|v| parse_env("DEV_ACCOUNT", &v)) {
        settings.dev_account = v;
    }

    settings
}

fn apply_file_settings(settings: &mut GuestbookSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.database_url {
        settings.database_url = Some(v);
    }
    if let Some(v) = file_cfg.connect_delay_ms {
        settings.connect_delay_ms = v;
    }
    if let Some(v) = file_cfg.submit_delay_ms {
        settings.submit_delay_ms = v;
    }
    if let Some(v) = file_cfg.seed_mock_entries {
        settings.seed_mock_entries = v;
    }
    if let Some(v) = file_cfg.operation_timeout_ms {
        settings.operation_timeout_ms = Some(v);
    }
    if let Some(v) = file_cfg.dev_account {
        settings.dev_account = v;
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw, "ignoring unparsable setting override");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
