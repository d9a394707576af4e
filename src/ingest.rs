//! `mqa ingest`: extract PDFs and push them through the ingestion pipeline.
//!
//! Each file is ingested independently. A failing file is reported and
//! skipped; the command exits non-zero at the end if any file failed.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use manual_qa_core::segment::Segmenter;

use crate::app::open_assistant;
use crate::config::Config;
use crate::extract::document_from_path;
use crate::progress::ProgressMode;

pub async fn run_ingest(
    config: &Config,
    paths: &[PathBuf],
    dry_run: bool,
    progress: ProgressMode,
) -> Result<()> {
    if paths.is_empty() {
        bail!("No input files given");
    }

    if dry_run {
        return dry_run_ingest(config, paths);
    }

    let assistant = open_assistant(config).await?;
    let reporter = progress.reporter();

    let mut failures: Vec<(PathBuf, String)> = Vec::new();
    let mut total_chunks = 0usize;

    for path in paths {
        let document = match document_from_path(path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("ingest {}  failed: {:#}", path.display(), e);
                failures.push((path.clone(), format!("{:#}", e)));
                continue;
            }
        };

        match assistant.ingest(&document, reporter.as_ref()).await {
            Ok(report) => {
                println!("ingest {}", report.source);
                println!("  pages: {}", report.pages);
                println!("  chunks added: {}", report.chunks_added);
                for (category, n) in &report.chunk_types {
                    println!("    {:<14} {}", category, n);
                }
                total_chunks += report.chunks_added;
            }
            Err(e) => {
                eprintln!("ingest {}  failed: {}", path.display(), e);
                failures.push((path.clone(), e.to_string()));
            }
        }
    }

    if !failures.is_empty() {
        bail!(
            "{} of {} files failed to ingest",
            failures.len(),
            paths.len()
        );
    }

    println!("ok ({} chunks)", total_chunks);
    Ok(())
}

/// Extract and segment only; nothing is embedded or written.
fn dry_run_ingest(config: &Config, paths: &[PathBuf]) -> Result<()> {
    let segmenter = Segmenter::new(config.chunking.segmenter_config());
    let mut failed = 0usize;

    for path in paths {
        let document = match document_from_path(path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("ingest {}  failed: {:#}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let chunks = segmenter.segment(&document);
        let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for chunk in &chunks {
            *by_category.entry(chunk.category.as_str()).or_insert(0) += 1;
        }

        println!("ingest {} (dry-run)", document.source);
        println!("  pages: {}", document.pages.len());
        println!("  chunks: {}", chunks.len());
        for (category, n) in &by_category {
            println!("    {:<14} {}", category, n);
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed to extract", failed, paths.len());
    }
    Ok(())
}
