use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

use shared::domain::{
    validate_entry_fields, AccountAddress, EntryId, GuestbookEntry, LedgerEntryId,
};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://guestbook.db";

/// Upper bound on the rows returned by a single paged or latest-entries read.
pub const MAX_PAGE_LIMIT: u32 = 100;

const ENTRY_COLUMNS: &str = "id, author, name, message, created_at";

/// Append-only guestbook ledger. Entries get monotonically increasing ids
/// starting at 1 and are never updated or removed.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub author: AccountAddress,
    pub name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn to_guestbook_entry(&self) -> GuestbookEntry {
        GuestbookEntry {
            id: EntryId::from(self.id),
            address: self.author.short(),
            name: self.name.clone(),
            message: self.message.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let database_url = normalize_database_url(database_url);
        ensure_sqlite_parent_dir_exists(&database_url)?;

        let connect_options =
            SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
        let pool = pool_options(&database_url)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open ledger database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run ledger migrations")?;
        info!(%database_url, "guestbook ledger ready");
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn add_entry(
        &self,
        author: &AccountAddress,
        name: &str,
        message: &str,
    ) -> Result<LedgerEntryId> {
        validate_entry_fields(name, message)?;

        let rec = sqlx::query(
            "INSERT INTO guestbook_entries (author, name, message, created_at)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(author.as_str())
        .bind(name)
        .bind(message)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await
        .context("failed to append guestbook entry")?;
        let id = LedgerEntryId(rec.get::<i64, _>(0));
        debug!(entry_id = id.0, author = %author, "appended guestbook entry");
        Ok(id)
    }

    pub async fn get_entry(&self, id: LedgerEntryId) -> Result<Option<LedgerEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM guestbook_entries WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| entry_from_row(&r)).transpose()
    }

    /// Entries in id order, skipping the first `offset`.
    pub async fn get_entries(&self, offset: u32, limit: u32) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM guestbook_entries ORDER BY id ASC LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit.min(MAX_PAGE_LIMIT)))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(entry_from_row).collect()
    }

    pub async fn get_entries_by_user(&self, author: &AccountAddress) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM guestbook_entries WHERE lower(author) = ? ORDER BY id ASC"
        ))
        .bind(author.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(entry_from_row).collect()
    }

    /// Newest first.
    pub async fn get_latest_entries(&self, count: u32) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM guestbook_entries ORDER BY id DESC LIMIT ?"
        ))
        .bind(i64::from(count.min(MAX_PAGE_LIMIT)))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(entry_from_row).collect()
    }

    pub async fn get_total_entries(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guestbook_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total)?)
    }

    pub async fn entry_count(&self) -> Result<u64> {
        self.get_total_entries().await
    }
}

fn pool_options(database_url: &str) -> SqlitePoolOptions {
    if database_url.contains(":memory:") {
        // Every connection to `sqlite::memory:` opens its own private database,
        // and closing the only one drops the ledger.
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    SqlitePoolOptions::new().max_connections(5)
}

fn entry_from_row(row: &SqliteRow) -> Result<LedgerEntry> {
    let id = LedgerEntryId(row.try_get::<i64, _>("id")?);
    let author_raw: String = row.try_get("author")?;
    let author = AccountAddress::parse(&author_raw)
        .with_context(|| format!("entry {} has a corrupt author address", id.0))?;
    let created_at: i64 = row.try_get("created_at")?;
    let timestamp = DateTime::<Utc>::from_timestamp(created_at, 0)
        .ok_or_else(|| anyhow!("entry {} has an out-of-range timestamp", id.0))?;

    Ok(LedgerEntry {
        id,
        author,
        name: row.try_get("name")?,
        message: row.try_get("message")?,
        timestamp,
    })
}

/// Accepts bare file paths as well as `sqlite:` URLs.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return DEFAULT_DATABASE_URL.to_string();
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
