//! Ingestion progress reporting.
//!
//! Progress is emitted on **stderr** so stdout remains parseable for scripts.
//! Reporters implement the core [`IngestObserver`] trait and receive one
//! [`IngestEvent`] per pipeline phase.

use std::io::Write;

use manual_qa_core::ingest::{IngestEvent, IngestObserver, NoProgress};

/// Human-friendly progress on stderr: "ingest press.pdf  embedding  64 / 1,200 chunks".
pub struct StderrProgress;

impl IngestObserver for StderrProgress {
    fn on_event(&self, source: &str, event: IngestEvent) {
        let line = match event {
            IngestEvent::Segmented { pages, chunks } => format!(
                "ingest {}  segmented  {} pages -> {} chunks\n",
                source,
                format_number(pages as u64),
                format_number(chunks as u64)
            ),
            IngestEvent::Embedding { done, total } => format!(
                "ingest {}  embedding  {} / {} chunks\n",
                source,
                format_number(done as u64),
                format_number(total as u64)
            ),
            IngestEvent::Stored { chunks } => format!(
                "ingest {}  stored  {} chunks\n",
                source,
                format_number(chunks as u64)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl IngestObserver for JsonProgress {
    fn on_event(&self, source: &str, event: IngestEvent) {
        let mut obj = match serde_json::to_value(event) {
            Ok(v) => v,
            Err(_) => return,
        };
        if let Some(map) = obj.as_object_mut() {
            map.insert("source".to_string(), serde_json::json!(source));
        }
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn IngestObserver> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "off" | "none" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => anyhow::bail!("Unknown progress mode: {}. Use human, json or off.", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn progress_mode_parse() {
        assert_eq!("json".parse::<ProgressMode>().unwrap(), ProgressMode::Json);
        assert_eq!("human".parse::<ProgressMode>().unwrap(), ProgressMode::Human);
        assert_eq!("off".parse::<ProgressMode>().unwrap(), ProgressMode::Off);
        assert!("loud".parse::<ProgressMode>().is_err());
    }

    #[test]
    fn json_event_shape() {
        let v = serde_json::to_value(IngestEvent::Embedding { done: 64, total: 100 }).unwrap();
        assert_eq!(v["event"], "embedding");
        assert_eq!(v["done"], 64);
    }
}
