// ABOUTME: Record store persisting the single current DataRecord as a JSON document.
// ABOUTME: The schema's singleton slot guarantees at most one record, even under concurrent first reads.

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use ratekeeper_core::{DataFields, DataRecord, DataUpdate};
use ulid::Ulid;

use crate::db::{SharedConnection, lock};
use crate::error::{StoreError, is_constraint_violation};

/// Persists the current rate record.
#[derive(Clone)]
pub struct RecordStore {
    conn: SharedConnection,
}

impl RecordStore {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Insert the built-in default record unless one already exists, and
    /// return whichever record is current afterwards.
    pub fn create_default(&self) -> Result<DataRecord, StoreError> {
        let conn = lock(&self.conn)?;
        insert_default(&conn)
    }

    /// Return the current record without creating one.
    pub fn find_first(&self) -> Result<Option<DataRecord>, StoreError> {
        let conn = lock(&self.conn)?;
        read_first(&conn)
    }

    /// Return the current record, creating the default if the store is empty.
    pub fn find_current(&self) -> Result<DataRecord, StoreError> {
        let conn = lock(&self.conn)?;
        match read_first(&conn)? {
            Some(record) => Ok(record),
            None => insert_default(&conn),
        }
    }

    /// Insert a new record built from request fields.
    /// Fails with `AlreadyExists` when a current record is already stored.
    pub fn create(&self, fields: DataFields) -> Result<DataRecord, StoreError> {
        let record = DataRecord::from_fields(fields)?;
        let document = serde_json::to_string(&record)?;

        let conn = lock(&self.conn)?;
        let inserted = conn.execute(
            "INSERT INTO records (record_id, document) VALUES (?1, ?2)",
            params![record.record_id.to_string(), document],
        );
        match inserted {
            Ok(_) => {
                tracing::debug!("created data record {}", record.record_id);
                Ok(record)
            }
            Err(e) if is_constraint_violation(&e) => {
                let existing = read_first(&conn)?
                    .map(|r| r.record_id)
                    .unwrap_or(record.record_id);
                Err(StoreError::AlreadyExists(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the fields present in `update` on the record with the given id.
    pub fn update(&self, record_id: &Ulid, update: DataUpdate) -> Result<DataRecord, StoreError> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut record = read_by_id(&tx, record_id)?.ok_or(StoreError::NotFound(*record_id))?;
        record.apply(update)?;
        write(&tx, &record)?;
        tx.commit()?;

        tracing::debug!("updated data record {}", record_id);
        Ok(record)
    }

    /// Remove one bill item by id. An unknown item id leaves the record as is.
    pub fn remove_item(&self, record_id: &Ulid, item_id: &Ulid) -> Result<DataRecord, StoreError> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut record = read_by_id(&tx, record_id)?.ok_or(StoreError::NotFound(*record_id))?;
        if record.remove_item(item_id) {
            write(&tx, &record)?;
            tx.commit()?;
            tracing::debug!("removed item {} from data record {}", item_id, record_id);
        } else {
            tracing::debug!("item {} not present on data record {}", item_id, record_id);
        }
        Ok(record)
    }
}

fn insert_default(conn: &Connection) -> Result<DataRecord, StoreError> {
    let record = DataRecord::default_record();
    let inserted = conn.execute(
        "INSERT INTO records (record_id, document) VALUES (?1, ?2)
         ON CONFLICT(slot) DO NOTHING",
        params![record.record_id.to_string(), serde_json::to_string(&record)?],
    )?;
    if inserted == 1 {
        tracing::info!("created default data record {}", record.record_id);
    }
    read_first(conn)?.ok_or(StoreError::NotFound(record.record_id))
}

fn read_first(conn: &Connection) -> Result<Option<DataRecord>, StoreError> {
    let document: Option<String> = conn
        .query_row("SELECT document FROM records LIMIT 1", [], |row| row.get(0))
        .optional()?;
    Ok(document.map(|d| serde_json::from_str(&d)).transpose()?)
}

fn read_by_id(conn: &Connection, record_id: &Ulid) -> Result<Option<DataRecord>, StoreError> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM records WHERE record_id = ?1",
            params![record_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(document.map(|d| serde_json::from_str(&d)).transpose()?)
}

fn write(conn: &Connection, record: &DataRecord) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE records SET document = ?2 WHERE record_id = ?1",
        params![record.record_id.to_string(), serde_json::to_string(record)?],
    )?;
    Ok(())
}
