/// FootySignal — Logger
/// tracing init + volitelný JSONL event stream (EVENT_LOG_DIR)

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `RUST_LOG` wins when set; otherwise
/// `info`, or `debug` with the verbose toggle on.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(fallback))
        )
        .try_init();
}

/// Append-only JSONL stream, one file per UTC day. Without a directory
/// every `log` call is a no-op.
pub struct EventLogger {
    log_dir: Option<PathBuf>,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: Some(dir) }
    }

    pub fn disabled() -> Self {
        Self { log_dir: None }
    }

    pub fn from_option(log_dir: Option<PathBuf>) -> Self {
        match log_dir {
            Some(dir) => Self::new(dir),
            None      => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.log_dir.is_some()
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let Some(dir) = &self.log_dir else {
            return Ok(());
        };
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct SignalSentEvent {
    pub ts:            String,
    pub event:         &'static str,   // "SIGNAL_SENT"
    pub key:           String,
    pub league:        String,
    pub home:          String,
    pub away:          String,
    pub average_goals: f64,
    pub minute:        u32,
    pub match_kind:    String,         // "exact" | "containment" | "token_set" | "similarity"
}

#[derive(Serialize, Debug)]
pub struct CycleSummaryEvent {
    pub ts:            String,
    pub event:         &'static str,   // "CYCLE_SUMMARY"
    pub rows:          usize,
    pub candidates:    usize,
    pub live_events:   usize,
    pub matched:       usize,
    pub signals_sent:  usize,
    pub notify_failed: usize,
}

#[derive(Serialize, Debug)]
pub struct ApiStatusEvent {
    pub ts:      String,
    pub event:   &'static str,         // "API_STATUS"
    pub source:  String,               // "schedule_csv" | "live_events" | "telegram"
    pub ok:      bool,
    pub message: String,
}
