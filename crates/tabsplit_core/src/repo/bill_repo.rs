//! Bill repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable persistence APIs for bills and their settlements.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Bill::validate()` before SQL mutations.
//! - Settlement storage is replace-wholesale: a new settlement atomically
//!   removes the previous one, carrying paid flags forward.
//! - Monetary columns hold integer cents; no floating point touches disk.

use crate::db::DbError;
use crate::model::bill::{Bill, BillId, Item, ItemId};
use crate::model::money::Money;
use crate::model::settlement::{PaidLedger, Settlement, SettlementEntry};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for bill persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(crate::model::bill::BillValidationError),
    Db(DbError),
    BillNotFound(BillId),
    PersonNotFound { bill_id: BillId, person: String },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::BillNotFound(id) => write!(f, "bill not found: {id}"),
            Self::PersonNotFound { bill_id, person } => {
                write!(f, "person `{person}` not found in settlement of bill {bill_id}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted bill data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<crate::model::bill::BillValidationError> for RepoError {
    fn from(value: crate::model::bill::BillValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for bill and settlement persistence.
pub trait BillRepository {
    fn create_bill(&self, bill: &Bill) -> RepoResult<BillId>;
    fn get_bill(&self, id: BillId) -> RepoResult<Option<Bill>>;
    /// Replaces the stored settlement wholesale, persisting paid flags.
    fn replace_settlement(
        &self,
        id: BillId,
        settlement: &Settlement,
        ledger: &PaidLedger,
    ) -> RepoResult<()>;
    fn load_settlement(&self, id: BillId) -> RepoResult<Option<(Settlement, PaidLedger)>>;
    fn set_paid(&self, id: BillId, person: &str, paid: bool) -> RepoResult<()>;
}

/// SQLite-backed bill repository.
pub struct SqliteBillRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBillRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn bill_exists(&self, id: BillId) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM bills WHERE uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl BillRepository for SqliteBillRepository<'_> {
    fn create_bill(&self, bill: &Bill) -> RepoResult<BillId> {
        bill.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO bills (
                uuid,
                restaurant,
                subtotal_cents,
                tax_cents,
                tip_cents,
                total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                bill.id.to_string(),
                bill.restaurant.as_str(),
                bill.subtotal.cents(),
                bill.tax.cents(),
                bill.tip.cents(),
                bill.total.cents(),
            ],
        )?;

        for item in &bill.items {
            tx.execute(
                "INSERT INTO bill_items (bill_uuid, item_id, name, price_cents)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    bill.id.to_string(),
                    item.id,
                    item.name.as_str(),
                    item.price.cents(),
                ],
            )?;
        }
        tx.commit()?;

        Ok(bill.id)
    }

    fn get_bill(&self, id: BillId) -> RepoResult<Option<Bill>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, restaurant, subtotal_cents, tax_cents, tip_cents, total_cents
             FROM bills
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut bill = parse_bill_row(row)?;

        let mut items_stmt = self.conn.prepare(
            "SELECT item_id, name, price_cents
             FROM bill_items
             WHERE bill_uuid = ?1
             ORDER BY item_id ASC;",
        )?;
        let mut item_rows = items_stmt.query([id.to_string()])?;
        while let Some(item_row) = item_rows.next()? {
            bill.items.push(Item {
                id: item_row.get::<_, ItemId>("item_id")?,
                name: item_row.get("name")?,
                price: Money::from_cents(item_row.get("price_cents")?),
            });
        }

        Ok(Some(bill))
    }

    fn replace_settlement(
        &self,
        id: BillId,
        settlement: &Settlement,
        ledger: &PaidLedger,
    ) -> RepoResult<()> {
        if !self.bill_exists(id)? {
            return Err(RepoError::BillNotFound(id));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM settlement_entries WHERE bill_uuid = ?1;",
            [id.to_string()],
        )?;

        for (position, entry) in settlement.entries().iter().enumerate() {
            let paid = ledger.is_paid(&entry.person).unwrap_or(false);
            tx.execute(
                "INSERT INTO settlement_entries (
                    bill_uuid,
                    person,
                    position,
                    item_total_cents,
                    tax_share_cents,
                    tip_share_cents,
                    total_due_cents,
                    paid,
                    revision
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    id.to_string(),
                    entry.person.as_str(),
                    position as i64,
                    entry.item_total.cents(),
                    entry.tax_share.cents(),
                    entry.tip_share.cents(),
                    entry.total_due.cents(),
                    i64::from(paid),
                    settlement.revision(),
                ],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    fn load_settlement(&self, id: BillId) -> RepoResult<Option<(Settlement, PaidLedger)>> {
        let mut stmt = self.conn.prepare(
            "SELECT person, item_total_cents, tax_share_cents, tip_share_cents,
                    total_due_cents, paid, revision
             FROM settlement_entries
             WHERE bill_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;

        let mut entries = Vec::new();
        let mut flags = Vec::new();
        let mut revision: u64 = 0;
        while let Some(row) = rows.next()? {
            let person: String = row.get("person")?;
            let paid = match row.get::<_, i64>("paid")? {
                0 => false,
                1 => true,
                other => {
                    return Err(RepoError::InvalidData(format!(
                        "invalid paid value `{other}` in settlement_entries.paid"
                    )));
                }
            };
            revision = row.get::<_, i64>("revision")? as u64;
            entries.push(SettlementEntry {
                person: person.clone(),
                item_total: Money::from_cents(row.get("item_total_cents")?),
                tax_share: Money::from_cents(row.get("tax_share_cents")?),
                tip_share: Money::from_cents(row.get("tip_share_cents")?),
                total_due: Money::from_cents(row.get("total_due_cents")?),
            });
            flags.push((person, paid));
        }

        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some((
            Settlement::from_parts(entries, revision),
            PaidLedger::from_flags(flags),
        )))
    }

    fn set_paid(&self, id: BillId, person: &str, paid: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE settlement_entries
             SET paid = ?1
             WHERE bill_uuid = ?2 AND person = ?3;",
            params![i64::from(paid), id.to_string(), person],
        )?;

        if changed == 0 {
            return Err(RepoError::PersonNotFound {
                bill_id: id,
                person: person.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bill_row(row: &Row<'_>) -> RepoResult<Bill> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in bills.uuid"))
    })?;

    Ok(Bill {
        id,
        restaurant: row.get("restaurant")?,
        items: Vec::new(),
        subtotal: Money::from_cents(row.get("subtotal_cents")?),
        tax: Money::from_cents(row.get("tax_cents")?),
        tip: Money::from_cents(row.get("tip_cents")?),
        total: Money::from_cents(row.get("total_cents")?),
    })
}
