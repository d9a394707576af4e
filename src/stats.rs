//! Database statistics.
//!
//! `mqa stats` summarises what is indexed: chunk and embedding counts, the
//! category mix the segmenter produced, and a per-manual breakdown.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;
use crate::migrate::create_schema;

/// Per-manual breakdown.
struct SourceStats {
    source: String,
    chunk_count: i64,
    page_count: i64,
    last_ingest_ts: Option<i64>,
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;

    let total_chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(&pool)
        .await?;
    let total_embedded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors")
        .fetch_one(&pool)
        .await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Manual QA — Database Stats");
    println!("==========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Chunks:      {}", total_chunks);
    println!(
        "  Embedded:    {} / {} ({}%)",
        total_embedded,
        total_chunks,
        if total_chunks > 0 {
            (total_embedded * 100) / total_chunks
        } else {
            0
        }
    );

    let category_rows = sqlx::query(
        "SELECT category, COUNT(*) AS n FROM chunks GROUP BY category ORDER BY n DESC, category",
    )
    .fetch_all(&pool)
    .await?;

    if !category_rows.is_empty() {
        println!();
        println!("  By category:");
        for row in &category_rows {
            let category: String = row.get("category");
            let n: i64 = row.get("n");
            println!("    {:<14} {:>8}", category, n);
        }
    }

    let source_rows = sqlx::query(
        r#"
        SELECT
            source,
            COUNT(*) AS chunk_count,
            COUNT(DISTINCT page) AS page_count,
            MAX(created_at) AS last_ingest
        FROM chunks
        GROUP BY source
        ORDER BY chunk_count DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let source_stats: Vec<SourceStats> = source_rows
        .iter()
        .map(|row| SourceStats {
            source: row.get("source"),
            chunk_count: row.get("chunk_count"),
            page_count: row.get("page_count"),
            last_ingest_ts: row.get("last_ingest"),
        })
        .collect();

    if !source_stats.is_empty() {
        println!();
        println!("  By manual:");
        println!(
            "  {:<32} {:>6} {:>8}   {}",
            "SOURCE", "PAGES", "CHUNKS", "LAST INGEST"
        );
        println!("  {}", "-".repeat(66));

        for s in &source_stats {
            let ingest_display = match s.last_ingest_ts {
                Some(ts) => format_ts_relative(ts),
                None => "never".to_string(),
            };
            println!(
                "  {:<32} {:>6} {:>8}   {}",
                s.source, s.page_count, s.chunk_count, ingest_display
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_humanised() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn relative_timestamps() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_ts_relative(now), "just now");
        assert_eq!(format_ts_relative(now - 120), "2 mins ago");
        assert_eq!(format_ts_relative(now - 3600), "1 hour ago");
        assert_eq!(format_ts_relative(now - 86400 * 3), "3 days ago");
    }
}
