//! # Manual QA
//!
//! Grounded question answering over technical manuals.
//!
//! The domain logic (segmentation, classification, retrieval, re-ranking,
//! prompt composition, conversation memory) lives in [`manual_qa_core`].
//! This crate supplies everything that touches the outside world: TOML
//! configuration, SQLite persistence, the OpenAI clients, PDF extraction,
//! the `mqa` CLI and the HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────┐   ┌───────────┐
//! │   PDF    │──▶│ Segment+Classify │──▶│  SQLite   │
//! │ extract  │   │     + Embed      │   │ chunks+vec│
//! └──────────┘   └──────────────────┘   └─────┬─────┘
//!                                             │
//!                    ┌────────────────────────┤
//!                    ▼                        ▼
//!               ┌──────────┐            ┌──────────┐
//!               │   CLI    │            │   HTTP   │
//!               │  (mqa)   │            │  (axum)  │
//!               └──────────┘            └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite vector store |
//! | [`openai`] | Shared OpenAI request/retry helper |
//! | [`embedding`] | Embedding providers |
//! | [`llm`] | Chat completion clients |
//! | [`extract`] | PDF text extraction |
//! | [`progress`] | Ingestion progress on stderr |
//! | [`app`] | Assistant wiring |
//! | [`ingest`], [`ask`], [`stats`] | CLI commands |
//! | [`server`] | HTTP server |

pub mod app;
pub mod ask;
pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod migrate;
pub mod openai;
pub mod progress;
pub mod server;
pub mod sqlite_store;
pub mod stats;
