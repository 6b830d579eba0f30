use super::{ErrorSink, SimilarityStore};
use crate::embeddings::util::{decode_vec_f32, encode_vec_f32, euclidean_distance};
use crate::errors::StoreError;
use crate::model::{Embedding, ErrorRecord, NearestMatch, NewRecord, QueryRecord, StoreStats};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    pub fn get_record(&self, id: i64) -> Result<Option<QueryRecord>, StoreError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, user_id, input_text, output_text, model_name, latency_ms, success, created_at
                 FROM inference_logs WHERE id = ?1",
                params![id],
                |row| {
                    Ok(QueryRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        input_text: row.get(2)?,
                        output_text: row.get(3)?,
                        model_name: row.get(4)?,
                        latency_ms: row.get::<_, i64>(5)?.max(0) as u64,
                        success: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn recent_errors(&self, limit: u32) -> Result<Vec<ErrorRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, inference_id, error_type, error_message, created_at
             FROM error_logs
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(ErrorRecord {
                    id: row.get(0)?,
                    inference_id: row.get(1)?,
                    error_type: row.get(2)?,
                    error_message: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.lock()?;
        let count = |sql: &str| -> Result<u64, StoreError> {
            let n: i64 = conn.query_row(sql, [], |r| r.get(0))?;
            Ok(n.max(0) as u64)
        };
        let records = count("SELECT COUNT(*) FROM inference_logs")?;
        let embeddings = count("SELECT COUNT(*) FROM embeddings")?;
        let errors = count("SELECT COUNT(*) FROM error_logs")?;
        let last_record_at: Option<String> = conn
            .query_row(
                "SELECT created_at FROM inference_logs ORDER BY id DESC LIMIT 1",
                [],
                |r| r.get(0),
            )
            .optional()?;

        Ok(StoreStats {
            records,
            embeddings,
            errors,
            last_record_at,
        })
    }
}

impl SimilarityStore for Store {
    fn find_nearest(&self, query: &Embedding) -> Result<Option<NearestMatch>, StoreError> {
        let conn = self.lock()?;
        // Exact scan. Rows come back in id order so the strict `<` below keeps
        // the lowest id on equal distances.
        let mut stmt = conn.prepare(
            "SELECT inf.id, inf.input_text, inf.output_text, emb.vec
             FROM inference_logs inf
             JOIN embeddings emb ON emb.inference_id = inf.id
             WHERE inf.success = 1 AND emb.model = ?1 AND emb.dims = ?2
             ORDER BY inf.id ASC",
        )?;
        let mut rows = stmt.query(params![query.model, query.dims() as i64])?;

        let mut best: Option<(i64, f64)> = None;
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let blob: Vec<u8> = row.get(3)?;
            let stored = decode_vec_f32(&blob)?;
            let distance = euclidean_distance(&query.values, &stored).ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "embedding for record {} has {} values, dims column says {}",
                    id,
                    stored.len(),
                    query.dims()
                ))
            })?;
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        drop(rows);
        drop(stmt);

        let Some((record_id, distance)) = best else {
            return Ok(None);
        };

        let (input_text, output_text): (String, String) = conn.query_row(
            "SELECT input_text, output_text FROM inference_logs WHERE id = ?1",
            params![record_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        Ok(Some(NearestMatch {
            record_id,
            input_text,
            output_text,
            distance,
        }))
    }

    fn append(&self, record: &NewRecord<'_>) -> Result<i64, StoreError> {
        let blob = encode_vec_f32(&record.embedding.values);
        let created_at = chrono::Utc::now().to_rfc3339();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO inference_logs(user_id, model_name, input_text, output_text, latency_ms, success, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.user_id,
                record.model_name,
                record.input_text,
                record.output_text,
                record.latency_ms as i64,
                true,
                created_at
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO embeddings(inference_id, model, dims, vec) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                record.embedding.model,
                record.embedding.dims() as i64,
                blob
            ],
        )?;
        tx.commit()?;
        Ok(id)
    }
}

impl ErrorSink for Store {
    fn record_error(
        &self,
        inference_id: Option<i64>,
        error_type: &str,
        error_message: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO error_logs(inference_id, error_type, error_message, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                inference_id,
                error_type,
                error_message,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
