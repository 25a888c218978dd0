//! In-memory structured diagnostic log for authoring-time debugging
//!
//! Not on the hot path: the whole facility is a no-op until enabled.
//! Entries are append-only, held behind a single mutex so multi-threaded
//! hosts need no additional synchronization.

use crate::error::Result;
use crate::utils::{current_memory_bytes, epoch_millis};
use serde::Serialize;
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
    pub context: HashMap<String, String>,
    pub memory_bytes: u64,
    pub backtrace: Vec<String>,
}

/// Aggregate counts for the authoring UI
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogStats {
    pub total: usize,
    pub by_level: HashMap<String, usize>,
    pub first_timestamp_ms: Option<u64>,
    pub last_timestamp_ms: Option<u64>,
}

struct LoggerState {
    enabled: bool,
    level: LogLevel,
    entries: Vec<LogEntry>,
}

pub struct DiagnosticLogger {
    state: Mutex<LoggerState>,
}

impl DiagnosticLogger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoggerState {
                enabled: false,
                level: LogLevel::Debug,
                entries: Vec::new(),
            }),
        }
    }

    pub fn enable(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.enabled = true;
        }
    }

    pub fn disable(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.enabled = false;
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        if let Ok(mut state) = self.state.lock() {
            state.level = level;
        }
    }

    /// Record one entry. No-op unless enabled and `level` meets the
    /// configured threshold.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, context: HashMap<String, String>) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => return,
        };
        if !state.enabled || level < state.level {
            return;
        }
        state.entries.push(LogEntry {
            timestamp_ms: epoch_millis(),
            level,
            message: message.into(),
            context,
            memory_bytes: current_memory_bytes(),
            backtrace: short_backtrace(),
        });
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.state
            .lock()
            .map(|state| state.entries.clone())
            .unwrap_or_default()
    }

    pub fn logs_by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }

    pub fn formatted_logs(&self) -> Vec<String> {
        self.logs()
            .iter()
            .map(|entry| {
                let context = if entry.context.is_empty() {
                    String::new()
                } else {
                    let mut pairs: Vec<String> = entry
                        .context
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect();
                    pairs.sort();
                    format!(" [{}]", pairs.join(" "))
                };
                format!(
                    "[{}] [{}] {}{}",
                    entry.timestamp_ms,
                    entry.level.as_str().to_uppercase(),
                    entry.message,
                    context
                )
            })
            .collect()
    }

    pub fn stats(&self) -> LogStats {
        let entries = self.logs();
        let mut by_level: HashMap<String, usize> = HashMap::new();
        for entry in &entries {
            *by_level.entry(entry.level.as_str().to_string()).or_insert(0) += 1;
        }
        LogStats {
            total: entries.len(),
            by_level,
            first_timestamp_ms: entries.first().map(|e| e.timestamp_ms),
            last_timestamp_ms: entries.last().map(|e| e.timestamp_ms),
        }
    }

    pub fn export_to_file(&self, path: &std::path::Path) -> Result<()> {
        let entries = self.logs();
        let mut file = std::fs::File::create(path)?;
        let json = serde_json::to_string_pretty(&entries)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
        }
    }
}

impl Default for DiagnosticLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Short call-stack summary: the first three caller frames, with the
/// capture machinery itself filtered out. Best-effort; release builds
/// without symbols may yield fewer frames.
fn short_backtrace() -> Vec<String> {
    let raw = Backtrace::force_capture().to_string();
    raw.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            // Frame lines look like "N: symbol"; skip location-only lines
            let (_, symbol) = trimmed.split_once(": ")?;
            Some(symbol.to_string())
        })
        .filter(|symbol| {
            !symbol.contains("short_backtrace")
                && !symbol.contains("Backtrace")
                && !symbol.contains("backtrace::")
        })
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_disabled_logger_records_nothing() {
        let logger = DiagnosticLogger::new();
        logger.log(LogLevel::Error, "dropped", HashMap::new());
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_level_threshold() {
        let logger = DiagnosticLogger::new();
        logger.enable();
        logger.set_level(LogLevel::Warning);
        logger.log(LogLevel::Debug, "below", HashMap::new());
        logger.log(LogLevel::Info, "below", HashMap::new());
        logger.log(LogLevel::Warning, "at", HashMap::new());
        logger.log(LogLevel::Critical, "above", HashMap::new());
        assert_eq!(logger.logs().len(), 2);
    }

    #[test]
    fn test_logs_by_level_and_stats() {
        let logger = DiagnosticLogger::new();
        logger.enable();
        logger.log(LogLevel::Info, "a", HashMap::new());
        logger.log(LogLevel::Error, "b", HashMap::new());
        logger.log(LogLevel::Error, "c", HashMap::new());

        assert_eq!(logger.logs_by_level(LogLevel::Error).len(), 2);
        let stats = logger.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_level.get("error"), Some(&2));
        assert!(stats.first_timestamp_ms.is_some());
    }

    #[test]
    fn test_formatted_logs_include_context() {
        let logger = DiagnosticLogger::new();
        logger.enable();
        logger.log(
            LogLevel::Info,
            "compiled",
            ctx(&[("directive", "type=post")]),
        );
        let formatted = logger.formatted_logs();
        assert_eq!(formatted.len(), 1);
        assert!(formatted[0].contains("[INFO]"));
        assert!(formatted[0].contains("compiled"));
        assert!(formatted[0].contains("directive=type=post"));
    }

    #[test]
    fn test_clear() {
        let logger = DiagnosticLogger::new();
        logger.enable();
        logger.log(LogLevel::Info, "a", HashMap::new());
        logger.clear();
        assert!(logger.logs().is_empty());
        assert_eq!(logger.stats().total, 0);
    }

    #[test]
    fn test_export_to_file() {
        let logger = DiagnosticLogger::new();
        logger.enable();
        logger.log(LogLevel::Warning, "exported", ctx(&[("k", "v")]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.json");
        logger.export_to_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert!(contents.contains("exported"));
    }

    #[test]
    fn test_backtrace_capped_at_three_frames() {
        let logger = DiagnosticLogger::new();
        logger.enable();
        logger.log(LogLevel::Info, "traced", HashMap::new());
        let entries = logger.logs();
        assert!(entries[0].backtrace.len() <= 3);
    }
}
