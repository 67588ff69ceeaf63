//! Append-only SQLite corpus of previously ingested documents.
//!
//! One table, the legacy `documents` schema: structured fields as
//! columns, `items` and `additional_fields` as JSON text so the corpus
//! stays readable without migration tooling. Rows are created once at
//! ingestion time and never updated or deleted — the fraud signal
//! depends on history being append-only.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags, params};
use thiserror::Error;

use crate::{DocumentRecord, LineItem};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Decode outcome of a stored `items` column.
///
/// A malformed column is carried as a marker instead of aborting the
/// fetch: the risk engine degrades that record's item-set similarity
/// to 0 and the rest of the scoring run proceeds.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredItems {
    Decoded(Vec<LineItem>),
    Malformed,
}

/// A persisted document: the parsed record plus its raw text, the
/// store-assigned identifier, and the ingestion timestamp.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: i64,
    pub record: DocumentRecord,
    /// Items as decoded from the `items` column. `record.items` is left
    /// empty when this is [`StoredItems::Malformed`].
    pub items: StoredItems,
    pub raw_text: String,
    pub created_at: String,
}

/// Open a SQLite connection with WAL mode and standard pragmas.
fn open_sqlite(path: &Path) -> Result<Connection, rusqlite::Error> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(conn)
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
     id               INTEGER PRIMARY KEY AUTOINCREMENT,
     document_type    TEXT NOT NULL,
     vendor           TEXT NOT NULL,
     client           TEXT NOT NULL,
     date             TEXT,
     postal_code      TEXT NOT NULL,
     items            TEXT NOT NULL,
     total            REAL NOT NULL,
     signatory        TEXT NOT NULL,
     reference_number TEXT NOT NULL,
     additional_fields TEXT NOT NULL,
     raw_text         TEXT NOT NULL,
     created_at       TEXT NOT NULL
 );
 CREATE INDEX IF NOT EXISTS idx_documents_type ON documents (document_type);";

/// Durable, append-only collection of [`StoredDocument`]s.
///
/// The store is the only shared mutable resource in the system. The
/// connection sits behind a `Mutex`, so identifier assignment is atomic:
/// two concurrent inserts never receive the same id, and a reader never
/// observes a partially written row (single-statement commit under WAL).
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    /// Open (or create) the corpus database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = open_sqlite(path)?;
        conn.execute_batch(CREATE_TABLE)?;
        tracing::info!(path = %path.display(), "opened document store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a transient in-memory corpus (tests, dry runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a record with its raw text and return the assigned id.
    ///
    /// Never overwrites an existing id; ids are monotonically increasing
    /// across the lifetime of the corpus.
    pub fn insert(&self, record: &DocumentRecord, raw_text: &str) -> Result<i64, StoreError> {
        let items_json = serde_json::to_string(&record.items)?;
        let additional_json = serde_json::to_string(&record.additional_fields)?;
        let created_at = chrono::Utc::now().to_rfc3339();

        let conn = self.conn.lock().expect("document store mutex poisoned");
        conn.execute(
            "INSERT INTO documents (document_type, vendor, client, date, postal_code,
                                    items, total, signatory, reference_number,
                                    additional_fields, raw_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.document_type,
                record.vendor,
                record.client,
                record.date,
                record.postal_code,
                items_json,
                record.total,
                record.signatory,
                record.reference_number,
                additional_json,
                raw_text,
                created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch every stored document of `document_type` other than
    /// `exclude_id`.
    ///
    /// Row order is stable but unspecified; callers must not depend on
    /// it for result determinism — the risk engine's own sort is
    /// authoritative.
    pub fn fetch_comparison_set(
        &self,
        exclude_id: i64,
        document_type: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let conn = self.conn.lock().expect("document store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, document_type, vendor, client, date, postal_code,
                    items, total, signatory, reference_number,
                    additional_fields, raw_text, created_at
             FROM documents
             WHERE document_type = ?1 AND id != ?2",
        )?;

        let rows = stmt.query_map(params![document_type, exclude_id], |row| {
            let id: i64 = row.get(0)?;
            let items_json: String = row.get(6)?;
            let additional_json: String = row.get(10)?;

            let items = match serde_json::from_str::<Vec<LineItem>>(&items_json) {
                Ok(items) => StoredItems::Decoded(items),
                Err(e) => {
                    tracing::warn!(id, error = %e, "malformed items JSON in stored document");
                    StoredItems::Malformed
                }
            };
            let additional_fields = serde_json::from_str(&additional_json).unwrap_or_default();

            let record = DocumentRecord {
                vendor: row.get(2)?,
                client: row.get(3)?,
                date: row.get(4)?,
                postal_code: row.get(5)?,
                items: match &items {
                    StoredItems::Decoded(items) => items.clone(),
                    StoredItems::Malformed => Vec::new(),
                },
                total: row.get(7)?,
                signatory: row.get(8)?,
                document_type: row.get(1)?,
                reference_number: row.get(9)?,
                additional_fields,
            };

            Ok(StoredDocument {
                id,
                record,
                items,
                raw_text: row.get(11)?,
                created_at: row.get(12)?,
            })
        })?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        Ok(documents)
    }
}
