//! Structured logging for the page controller.
//!
//! Every record is a single JSON line on stderr (stdout belongs to the CLI
//! snapshot). When `LOG_DIR` is set, records are also appended to
//! `<LOG_DIR>/<run_id>/events.jsonl` so a session can be replayed later.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok(raw) => Self::parse(raw).unwrap_or(Level::Info),
            Err(_) => Level::Info,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "fatal" => Some(Level::Fatal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Insight,   // Query submission and result transitions
    Vote,      // Vote submission and pulse
    Chart,     // Dataset fetch and chart mounting
    Reveal,    // Scroll reveal transitions
    Transport, // HTTP round trips
    System,    // Startup, config
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Insight => "insight",
            Domain::Vote => "vote",
            Domain::Chart => "chart",
            Domain::Reveal => "reveal",
            Domain::Transport => "transport",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS is a comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Sequence counter and run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let events = std::env::var("LOG_DIR")
            .ok()
            .and_then(|base| open_events_sink(PathBuf::from(base), &run_id));
        RunContext { run_id, events }
    })
}

fn open_events_sink(base: PathBuf, run_id: &str) -> Option<Mutex<BufWriter<File>>> {
    let run_dir = base.join(run_id);
    if let Err(err) = create_dir_all(&run_dir) {
        eprintln!("[log] failed to create run dir: {}", err);
        return None;
    }
    match File::create(run_dir.join("events.jsonl")) {
        Ok(file) => Some(Mutex::new(BufWriter::new(file))),
        Err(err) => {
            eprintln!("[log] failed to create events log: {}", err);
            None
        }
    }
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["index", "mount", "path", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }
    let line = format_record(level, domain, event, fields);
    if let Some(events) = &ensure_run_context().events {
        write_line(events, &line);
    }
    eprintln!("{}", line);
}

fn format_record(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) -> String {
    let ctx = ensure_run_context();
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

/// Terminal transitions (success or failure) log at info, the rest at debug.
pub fn log_insight_transition(state: &str, terminal: bool, markup_len: usize, seq: u64) {
    let level = if terminal { Level::Info } else { Level::Debug };
    log(
        level,
        Domain::Insight,
        "transition",
        obj(&[
            ("state", v_str(state)),
            ("markup_len", json!(markup_len)),
            ("request_seq", json!(seq)),
        ]),
    );
}

/// Failure swallowed by a silent fetch policy. The user never sees these.
pub fn log_suppressed(domain: Domain, operation: &str, error: &str) {
    log(
        Level::Warn,
        domain,
        "suppressed_error",
        obj(&[("operation", v_str(operation)), ("msg", v_str(error))]),
    );
}

pub fn log_chart_mount(mount: &str, kind: &str, points: usize) {
    log(
        Level::Info,
        Domain::Chart,
        "mounted",
        obj(&[
            ("mount", v_str(mount)),
            ("kind", v_str(kind)),
            ("points", json!(points)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Timing scope that emits a trace record on drop. Wraps each HTTP round trip.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Transport, "profile", fields);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_level_parse_rejects_unknown() {
        assert_eq!(Level::parse("warn"), Some(Level::Warn));
        assert_eq!(Level::parse("loud"), None);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_record_lifts_top_level_keys() {
        let line = format_record(
            Level::Warn,
            Domain::Vote,
            "suppressed_error",
            obj(&[("index", json!(3)), ("msg", v_str("boom")), ("extra", json!(true))]),
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["component"], "vote");
        assert_eq!(parsed["lvl"], "WARN");
        assert_eq!(parsed["index"], 3);
        assert_eq!(parsed["msg"], "boom");
        assert_eq!(parsed["data"]["extra"], true);
    }

    #[test]
    fn test_events_sink_creates_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = open_events_sink(dir.path().to_path_buf(), "r-test").unwrap();
        write_line(&sink, "{\"seq\":1}");
        let written = std::fs::read_to_string(dir.path().join("r-test/events.jsonl")).unwrap();
        assert_eq!(written.trim(), "{\"seq\":1}");
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
