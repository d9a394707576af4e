//! SQLite-backed [`VectorStore`] implementation.
//!
//! Chunks live in `chunks`, their embeddings in `chunk_vectors` as
//! little-endian f32 BLOBs. Every `add_chunks` call is one transaction.
//! Similarity search loads all vectors and ranks them by cosine similarity.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use manual_qa_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use manual_qa_core::models::{Chunk, Provenance};
use manual_qa_core::store::{Candidate, VectorStore};

/// SQLite implementation of the [`VectorStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    /// Embedding model name recorded with each vector.
    model: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, model: impl Into<String>) -> Self {
        Self {
            pool,
            model: model.into(),
        }
    }
}

fn row_to_chunk(row: &SqliteRow) -> Result<Chunk> {
    let category: String = row.get("category");
    let priority: String = row.get("priority");
    let page: i64 = row.get("page");
    Ok(Chunk {
        id: row.get("id"),
        chunk_index: row.get("chunk_index"),
        text: row.get("text"),
        category: category.parse()?,
        priority: priority.parse()?,
        provenance: Provenance::new(row.get::<String, _>("source"), page as u32),
        hash: row.get("hash"),
    })
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn add_chunks(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != vectors.len() {
            bail!(
                "chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            );
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for (chunk, vector) in chunks.iter().zip(vectors) {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, source, page, chunk_index, category, priority, text, hash, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.provenance.source)
            .bind(chunk.provenance.page as i64)
            .bind(chunk.chunk_index)
            .bind(chunk.category.as_str())
            .bind(chunk.priority.as_str())
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert chunk {}", chunk.id))?;

            sqlx::query(
                "INSERT INTO chunk_vectors (chunk_id, embedding, model, dims) VALUES (?, ?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(vec_to_blob(vector))
            .bind(&self.model)
            .bind(vector.len() as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn similarity_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<Candidate>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.source, c.page, c.chunk_index, c.category, c.priority,
                   c.text, c.hash, cv.embedding
            FROM chunk_vectors cv
            JOIN chunks c ON c.id = cv.chunk_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let vector = blob_to_vec(&blob);
            candidates.push(Candidate {
                chunk: row_to_chunk(row)?,
                score: cosine_similarity(query_vec, &vector),
                vector,
            });
        }

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);

        Ok(candidates)
    }

    async fn count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn count_by_category(&self) -> Result<Vec<(String, u64)>> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) AS n FROM chunks GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let n: i64 = row.get("n");
                (row.get("category"), n as u64)
            })
            .collect())
    }
}
