use super::Catalog;
use crate::error::{NeurosiftError, Result};
use crate::types::{
    ImageRecord, InsertOutcome, ModalityLabel, NewImageRecord, RecordFilter, RecordId,
    StorageBackend,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, patient_id, series_id, graphic_id, storage_key, caption, \
     modality, is_valid, collected_at FROM image_metadata";

/// Catalog backed by an SQLite database file
///
/// The `(patient_id, graphic_id)` pair carries a UNIQUE constraint, and
/// each insert runs in its own transaction.
pub struct SqliteCatalog {
    conn: Connection,
    backend: StorageBackend,
}

impl SqliteCatalog {
    /// Opens (or creates) the catalog database at `path`
    pub fn open(path: impl AsRef<Path>, backend: StorageBackend) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!("Catalog opened at {} ({})", path.display(), backend);
        Self::with_connection(conn, backend)
    }

    /// Opens a private in-memory database
    pub fn open_in_memory(backend: StorageBackend) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, backend)
    }

    fn with_connection(conn: Connection, backend: StorageBackend) -> Result<Self> {
        let catalog = SqliteCatalog { conn, backend };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Creates the table and indexes if they don't exist
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS image_metadata (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id      TEXT NOT NULL,
                series_id       TEXT NOT NULL,
                graphic_id      TEXT NOT NULL,
                storage_key     TEXT NOT NULL,
                caption         TEXT NOT NULL DEFAULT '',
                modality        TEXT,
                is_valid        INTEGER NOT NULL DEFAULT 1,
                collected_at    TEXT NOT NULL,
                UNIQUE(patient_id, graphic_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_image_metadata_modality
             ON image_metadata(modality)",
            [],
        )?;

        Ok(())
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    let modality = row
        .get::<_, Option<String>>(6)?
        .map(|s| s.parse::<ModalityLabel>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, e.into()))?;

    let collected_at: String = row.get(8)?;
    let collected_at = DateTime::parse_from_rfc3339(&collected_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(ImageRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        series_id: row.get(2)?,
        graphic_id: row.get(3)?,
        storage_key: row.get(4)?,
        caption: row.get(5)?,
        modality,
        is_valid: row.get(7)?,
        collected_at,
    })
}

/// Compiles a filter to a WHERE clause and its positional parameters
fn where_clause(filter: &RecordFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    let mut membership = |column: &str, values: Vec<String>| {
        if values.is_empty() {
            clauses.push("0".to_string());
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        clauses.push(format!("{} IN ({})", column, placeholders));
        params.extend(values);
    };

    if let Some(ref patients) = filter.patient_ids {
        let mut values: Vec<String> = patients.iter().cloned().collect();
        values.sort();
        membership("patient_id", values);
    }

    if let Some(ref modalities) = filter.modalities {
        let mut values: Vec<String> = modalities.iter().map(|m| m.as_str().to_string()).collect();
        values.sort();
        membership("modality", values);
    }

    if filter.unlabeled_only {
        clauses.push("modality IS NULL".to_string());
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

impl Catalog for SqliteCatalog {
    fn insert_if_absent(&mut self, record: NewImageRecord) -> Result<InsertOutcome> {
        let tx = self.conn.transaction()?;

        let existing: Option<RecordId> = tx
            .query_row(
                "SELECT id FROM image_metadata WHERE patient_id = ?1 AND graphic_id = ?2",
                params![record.key.patient_id, record.key.graphic_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            debug!("Metadata already exists for {}", record.key);
            return Ok(InsertOutcome {
                id,
                inserted: false,
            });
        }

        tx.execute(
            "INSERT INTO image_metadata
                (patient_id, series_id, graphic_id, storage_key, caption, modality, is_valid, collected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, 1, ?6)",
            params![
                record.key.patient_id,
                record.series_id,
                record.key.graphic_id,
                self.backend.storage_key(&record.key.graphic_id),
                record.caption,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("Saved metadata for {}", record.key);
        Ok(InsertOutcome { id, inserted: true })
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>> {
        let (clause, params) = where_clause(filter);
        let sql = format!("{}{} ORDER BY id", SELECT_COLUMNS, clause);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), row_to_record)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    fn list_distinct_patients(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT patient_id FROM image_metadata")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut patients = BTreeSet::new();
        for patient in rows {
            patients.insert(patient?);
        }
        Ok(patients)
    }

    fn update_modality(&mut self, id: RecordId, label: ModalityLabel) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE image_metadata SET modality = ?1 WHERE id = ?2",
            params![label.as_str(), id],
        )?;
        if changed == 0 {
            return Err(NeurosiftError::RecordNotFound(id));
        }
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<ImageRecord>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_record)
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::contract;
    use crate::types::RecordKey;
    use tempfile::TempDir;

    fn catalog() -> SqliteCatalog {
        SqliteCatalog::open_in_memory(StorageBackend::Local).unwrap()
    }

    #[test]
    fn test_insert_is_idempotent() {
        contract::insert_is_idempotent(&mut catalog());
    }

    #[test]
    fn test_insert_assigns_defaults() {
        contract::insert_assigns_defaults(&mut catalog(), "local");
    }

    #[test]
    fn test_bucket_prefix() {
        let mut catalog =
            SqliteCatalog::open_in_memory(StorageBackend::Bucket("neuro-images".into())).unwrap();
        contract::insert_assigns_defaults(&mut catalog, "neuro-images");
    }

    #[test]
    fn test_same_graphic_different_patient() {
        contract::same_graphic_different_patient(&mut catalog());
    }

    #[test]
    fn test_update_and_query() {
        contract::update_and_query(&mut catalog());
    }

    #[test]
    fn test_update_unknown_id_fails() {
        contract::update_unknown_id_fails(&mut catalog());
    }

    #[test]
    fn test_empty_membership_matches_nothing() {
        contract::empty_membership_matches_nothing(&mut catalog());
    }

    #[test]
    fn test_failed_insert_leaves_nothing_behind() {
        let mut catalog = catalog();
        catalog
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_inserts BEFORE INSERT ON image_metadata
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result =
            catalog.insert_if_absent(NewImageRecord::new(RecordKey::new("P1", "g.png"), "1.2"));
        assert!(matches!(result, Err(NeurosiftError::CatalogError(_))));
        assert!(catalog.query(&RecordFilter::default()).unwrap().is_empty());
        assert!(catalog.list_distinct_patients().unwrap().is_empty());

        // The connection stays usable once the trigger is gone
        catalog.conn.execute_batch("DROP TRIGGER reject_inserts;").unwrap();
        let outcome = catalog
            .insert_if_absent(NewImageRecord::new(RecordKey::new("P1", "g.png"), "1.2"))
            .unwrap();
        assert!(outcome.inserted);
    }

    #[test]
    fn test_where_clause() {
        let (clause, params) = where_clause(&RecordFilter::default());
        assert!(clause.is_empty());
        assert!(params.is_empty());

        let filter = RecordFilter::default()
            .with_patients(["B", "A"])
            .with_modalities([ModalityLabel::T1])
            .unlabeled_only(true);
        let (clause, params) = where_clause(&filter);
        assert_eq!(
            clause,
            " WHERE patient_id IN (?, ?) AND modality IN (?) AND modality IS NULL"
        );
        assert_eq!(params, vec!["A", "B", "T1"]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        {
            let mut catalog = SqliteCatalog::open(&path, StorageBackend::Local).unwrap();
            let id = catalog
                .insert_if_absent(NewImageRecord::new(RecordKey::new("P1", "g.png"), "1.2"))
                .unwrap()
                .id;
            catalog.update_modality(id, ModalityLabel::Dti).unwrap();
        }

        let mut catalog = SqliteCatalog::open(&path, StorageBackend::Local).unwrap();
        let records = catalog.query(&RecordFilter::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].modality, Some(ModalityLabel::Dti));

        let again = catalog
            .insert_if_absent(NewImageRecord::new(RecordKey::new("P1", "g.png"), "1.2"))
            .unwrap();
        assert!(!again.inserted);
    }

    #[test]
    fn test_unparseable_modality_surfaces_error() {
        let catalog = catalog();
        catalog
            .conn
            .execute(
                "INSERT INTO image_metadata
                    (patient_id, series_id, graphic_id, storage_key, modality, collected_at)
                 VALUES ('P', 's', 'g', 'local/g', 'SWI', ?1)",
                params![Utc::now().to_rfc3339()],
            )
            .unwrap();
        assert!(catalog.query(&RecordFilter::default()).is_err());
    }
}
