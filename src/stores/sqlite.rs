//! SQLite-backed chunk store with vector search via `sqlite-vec`.
//!
//! Each collection lives in its own database file under the store directory,
//! addressed by its logical name. Records are keyed by chunk id in a plain
//! table; embeddings live in a `vec0` virtual table sharing rowids with it.
//! The distance metric is pinned to cosine in collection metadata at
//! creation; the embedding dimension is fixed by the first upsert.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, ffi};
use tracing::{error, info, warn};

use super::{QueryHit, VectorStore, doc_id_from_chunk_id};
use crate::config::RagConfig;
use crate::types::{DocumentChunk, RagError};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS chunks (
    chunk_id TEXT PRIMARY KEY,
    doc_id   TEXT NOT NULL,
    content  TEXT NOT NULL,
    metadata TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS collection_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

/// Persistent vector collection with replace-by-key upserts and cosine
/// nearest-neighbor queries.
///
/// Opening is the only fatal operation: a store that cannot create its
/// directory, load the vector extension, or pin its metric is unusable and
/// construction fails. Everything after that degrades per the operation
/// boundary rule.
#[derive(Clone)]
pub struct SqliteChunkStore {
    conn: Connection,
    collection: String,
}

impl SqliteChunkStore {
    /// Opens (or creates) the collection `collection` under `dir`.
    pub async fn open(dir: impl AsRef<Path>, collection: &str) -> Result<Self, RagError> {
        register_sqlite_vec()?;

        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|err| {
            RagError::Configuration(format!(
                "cannot create store directory {}: {err}",
                dir.display()
            ))
        })?;

        let db_path = collection_path(dir, collection);
        info!(
            collection,
            path = %db_path.display(),
            "opening vector store collection"
        );

        let conn = Connection::open(&db_path)
            .await
            .map_err(|err| RagError::StoreInit(err.to_string()))?;

        // The extension must answer before anything else touches the file.
        conn.call(|conn| {
            conn.query_row("SELECT vec_version()", [], |row| row.get::<_, String>(0))
        })
        .await
        .map_err(|err| RagError::StoreInit(format!("sqlite-vec unavailable: {err}")))?;

        let metric: String = conn
            .call(|conn| {
                conn.execute_batch(SCHEMA)?;
                conn.execute(
                    "INSERT INTO collection_meta(key, value) VALUES ('distance_metric', 'cosine')
                     ON CONFLICT(key) DO NOTHING",
                    [],
                )?;
                conn.query_row(
                    "SELECT value FROM collection_meta WHERE key = 'distance_metric'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(|err| RagError::StoreInit(err.to_string()))?;

        if metric != "cosine" {
            return Err(RagError::StoreInit(format!(
                "collection '{collection}' was created with distance metric '{metric}'; \
                 recreate it to change metrics"
            )));
        }

        let store = Self {
            conn,
            collection: collection.to_string(),
        };
        info!(
            collection,
            count = store.count().await,
            "vector store collection ready"
        );
        Ok(store)
    }

    /// Opens the collection named by the configuration.
    pub async fn from_config(config: &RagConfig) -> Result<Self, RagError> {
        Self::open(&config.store_path, &config.collection).await
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn upsert_rows(&self, rows: Vec<Row>, dimension: usize) -> Result<usize, RagError> {
        self.conn
            .call::<_, _, tokio_rusqlite::rusqlite::Error>(move |conn| {
                let tx = conn
                    .transaction()?;

                let have_vec_table: i64 = tx
                    .query_row(VEC_TABLE_PROBE, [], |row| row.get(0))?;
                if have_vec_table == 0 {
                    tx.execute_batch(&format!(
                        "CREATE VIRTUAL TABLE chunks_vec USING vec0(embedding float[{dimension}])"
                    ))?;
                    tx.execute(
                        "INSERT INTO collection_meta(key, value) VALUES ('embedding_dimension', ?1)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        [dimension.to_string()],
                    )?;
                }

                let mut written = 0usize;
                for row in rows {
                    tx.execute(
                        "INSERT INTO chunks(chunk_id, doc_id, content, metadata)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(chunk_id) DO UPDATE SET
                             doc_id = excluded.doc_id,
                             content = excluded.content,
                             metadata = excluded.metadata",
                        (&row.chunk_id, &row.doc_id, &row.content, &row.metadata),
                    )?;

                    let rowid: i64 = tx
                        .query_row(
                            "SELECT rowid FROM chunks WHERE chunk_id = ?1",
                            [&row.chunk_id],
                            |r| r.get(0),
                        )?;

                    tx.execute("DELETE FROM chunks_vec WHERE rowid = ?1", [rowid])?;
                    tx.execute(
                        "INSERT INTO chunks_vec(rowid, embedding) VALUES (?1, vec_f32(?2))",
                        (rowid, &row.embedding),
                    )?;

                    written += 1;
                }

                tx.commit()?;
                Ok(written)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }

    async fn search(
        &self,
        embedding_json: String,
        n_results: usize,
    ) -> Result<Vec<QueryHit>, RagError> {
        let raw = self
            .conn
            .call::<_, _, tokio_rusqlite::rusqlite::Error>(move |conn| {
                let have_vec_table: i64 = conn
                    .query_row(VEC_TABLE_PROBE, [], |row| row.get(0))?;
                if have_vec_table == 0 {
                    return Ok(Vec::new());
                }
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT c.chunk_id, c.doc_id, c.content, c.metadata,
                                vec_distance_cosine(v.embedding, vec_f32(?1)) AS distance
                         FROM chunks c
                         JOIN chunks_vec v ON v.rowid = c.rowid
                         ORDER BY distance ASC, c.rowid ASC
                         LIMIT {n_results}"
                    ))?;

                let rows = stmt
                    .query_map([&embedding_json], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, f32>(4)?,
                        ))
                    })?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        let hits = raw
            .into_iter()
            .map(|(chunk_id, stored_doc_id, content, metadata, distance)| {
                let doc_id = if stored_doc_id.is_empty() {
                    doc_id_from_chunk_id(&chunk_id)
                } else {
                    stored_doc_id
                };
                QueryHit {
                    chunk: DocumentChunk {
                        doc_id,
                        chunk_id,
                        text: content,
                        metadata: serde_json::from_str(&metadata).unwrap_or_default(),
                    },
                    distance,
                }
            })
            .collect();
        Ok(hits)
    }

    async fn count_records(&self) -> Result<usize, RagError> {
        self.conn
            .call::<_, _, tokio_rusqlite::rusqlite::Error>(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }
}

#[async_trait]
impl VectorStore for SqliteChunkStore {
    async fn upsert(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> usize {
        if chunks.is_empty() || embeddings.is_empty() || chunks.len() != embeddings.len() {
            warn!(
                collection = %self.collection,
                chunks = chunks.len(),
                embeddings = embeddings.len(),
                "rejecting upsert: chunks or embeddings empty or mismatched"
            );
            return 0;
        }

        let dimension = embeddings[0].len();
        let rows: Vec<Row> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Row {
                chunk_id: chunk.chunk_id.clone(),
                doc_id: chunk.doc_id.clone(),
                content: chunk.text.clone(),
                metadata: chunk.metadata.to_string(),
                embedding: serde_json::to_string(embedding).unwrap_or_else(|_| "[]".to_string()),
            })
            .collect();

        info!(
            collection = %self.collection,
            count = rows.len(),
            "upserting chunk records"
        );
        match self.upsert_rows(rows, dimension).await {
            Ok(written) => {
                let count = self.count().await;
                info!(
                    collection = %self.collection,
                    written,
                    count,
                    "upsert complete"
                );
                written
            }
            Err(err) => {
                error!(collection = %self.collection, error = %err, "upsert failed; nothing written");
                0
            }
        }
    }

    async fn query(&self, query_embedding: &[f32], n_results: usize) -> Vec<QueryHit> {
        if query_embedding.is_empty() {
            warn!(collection = %self.collection, "rejecting query: empty query embedding");
            return Vec::new();
        }
        if n_results == 0 {
            warn!(collection = %self.collection, "rejecting query: n_results must be at least 1");
            return Vec::new();
        }

        let embedding_json = match serde_json::to_string(query_embedding) {
            Ok(json) => json,
            Err(err) => {
                error!(collection = %self.collection, error = %err, "query embedding not serializable");
                return Vec::new();
            }
        };

        match self.search(embedding_json, n_results).await {
            Ok(hits) => hits,
            Err(err) => {
                error!(collection = %self.collection, error = %err, "query failed");
                Vec::new()
            }
        }
    }

    async fn count(&self) -> usize {
        match self.count_records().await {
            Ok(count) => count,
            Err(err) => {
                error!(collection = %self.collection, error = %err, "count failed");
                0
            }
        }
    }
}

/// One serialized record ready for the write transaction.
struct Row {
    chunk_id: String,
    doc_id: String,
    content: String,
    metadata: String,
    embedding: String,
}

/// The vec0 table is created lazily by the first upsert, so reads must probe
/// for it before joining against it.
const VEC_TABLE_PROBE: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'chunks_vec'";

fn collection_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.sqlite3"))
}

/// Registers the sqlite-vec extension for every connection opened by this
/// process. Safe to call repeatedly; the registration happens once.
fn register_sqlite_vec() -> Result<(), RagError> {
    static REGISTRATION: OnceLock<Result<(), String>> = OnceLock::new();

    REGISTRATION
        .get_or_init(|| unsafe {
            type SqliteExtensionInit = unsafe extern "C" fn(
                *mut ffi::sqlite3,
                *mut *mut c_char,
                *const ffi::sqlite3_api_routines,
            ) -> i32;

            let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
            let init_fn: SqliteExtensionInit =
                transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
            let rc = ffi::sqlite3_auto_extension(Some(init_fn));
            if rc != 0 {
                Err(format!("failed to register sqlite-vec extension (code {rc})"))
            } else {
                Ok(())
            }
        })
        .clone()
        .map_err(RagError::StoreInit)
}
