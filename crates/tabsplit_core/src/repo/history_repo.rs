//! Bounded bill-history store.
//!
//! # Responsibility
//! - Persist the "recent bills" list consumed by the history screen.
//! - Enforce a bounded size by evicting the oldest entries.
//!
//! # Invariants
//! - At most `HISTORY_CAPACITY` entries survive any write.
//! - Listing returns newest-first, ties broken by bill id for stability.
//! - The core only derives `fully_paid`; everything else is caller data.

use crate::model::bill::BillId;
use crate::repo::bill_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Upper bound on retained history entries (matches the original app's
/// "keep last 20" list behavior).
pub const HISTORY_CAPACITY: usize = 20;

/// One row of the recent-bills list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    pub bill_id: BillId,
    pub restaurant: String,
    /// Unix epoch milliseconds when the bill entered the history.
    pub recorded_at: i64,
    /// Derived by the core: `outstanding == 0`.
    pub fully_paid: bool,
}

/// Repository interface for the bounded history list.
pub trait HistoryRepository {
    /// Inserts or refreshes one entry, then evicts beyond capacity.
    fn record(&self, entry: &HistoryEntry) -> RepoResult<()>;
    /// Lists entries newest-first.
    fn list(&self) -> RepoResult<Vec<HistoryEntry>>;
    fn set_fully_paid(&self, bill_id: BillId, fully_paid: bool) -> RepoResult<()>;
    fn delete(&self, bill_id: BillId) -> RepoResult<()>;
}

/// SQLite-backed history repository.
pub struct SqliteHistoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn evict_beyond_capacity(&self) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM history
             WHERE bill_uuid NOT IN (
                SELECT bill_uuid FROM history
                ORDER BY recorded_at DESC, bill_uuid ASC
                LIMIT ?1
             );",
            [HISTORY_CAPACITY as i64],
        )?;
        Ok(())
    }
}

impl HistoryRepository for SqliteHistoryRepository<'_> {
    fn record(&self, entry: &HistoryEntry) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO history (bill_uuid, restaurant, recorded_at, fully_paid)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(bill_uuid) DO UPDATE SET
                restaurant = excluded.restaurant,
                recorded_at = excluded.recorded_at,
                fully_paid = excluded.fully_paid;",
            params![
                entry.bill_id.to_string(),
                entry.restaurant.as_str(),
                entry.recorded_at,
                i64::from(entry.fully_paid),
            ],
        )?;
        tx.commit()?;

        self.evict_beyond_capacity()
    }

    fn list(&self) -> RepoResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT bill_uuid, restaurant, recorded_at, fully_paid
             FROM history
             ORDER BY recorded_at DESC, bill_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_history_row(row)?);
        }
        Ok(entries)
    }

    fn set_fully_paid(&self, bill_id: BillId, fully_paid: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE history SET fully_paid = ?1 WHERE bill_uuid = ?2;",
            params![i64::from(fully_paid), bill_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::BillNotFound(bill_id));
        }
        Ok(())
    }

    fn delete(&self, bill_id: BillId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM history WHERE bill_uuid = ?1;",
            [bill_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::BillNotFound(bill_id));
        }
        Ok(())
    }
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryEntry> {
    let uuid_text: String = row.get("bill_uuid")?;
    let bill_id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in history.bill_uuid"
        ))
    })?;

    let fully_paid = match row.get::<_, i64>("fully_paid")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid fully_paid value `{other}` in history.fully_paid"
            )));
        }
    };

    Ok(HistoryEntry {
        bill_id,
        restaurant: row.get("restaurant")?,
        recorded_at: row.get("recorded_at")?,
        fully_paid,
    })
}
