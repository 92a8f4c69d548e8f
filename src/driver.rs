/// FootySignal — Cycle Driver
///
/// Jeden cyklus:
///   1. stáhne CSV plán (bez řádků → konec cyklu)
///   2. pre-match guardy (liga, AVG, forma) → kandidáti
///   3. live feed jen když existuje aspoň jeden kandidát
///   4. evaluace, Telegram, záznam klíče až po úspěšném odeslání
///
/// Chyby zdrojů ukončí cyklus typed errorem; smyčka počká backoff a jede dál.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use live_monitor::{LiveEvent, LiveFeedError, LiveMonitor};
use logger::{now_iso, ApiStatusEvent, CycleSummaryEvent, EventLogger, SignalSentEvent};
use schedule_reader::{ScheduleError, ScheduleReader, ScheduleRow};
use signal_engine::{alert, Rejection, SentRegistry, Signal, SignalEvaluator, Verdict};
use std::time::Duration;
use telegram_notifier::{NotifyError, TelegramNotifier};
use thiserror::Error;
use tracing::{debug, info, warn};

// ── Seams ────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>, ScheduleError>;
}

#[async_trait]
pub trait LiveSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<LiveEvent>, LiveFeedError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl ScheduleSource for ScheduleReader {
    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>, ScheduleError> {
        ScheduleReader::fetch_rows(self).await
    }
}

#[async_trait]
impl LiveSource for LiveMonitor {
    async fn fetch_events(&self) -> Result<Vec<LiveEvent>, LiveFeedError> {
        LiveMonitor::fetch_events(self).await
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        TelegramNotifier::send(self, text).await.map(|_| ())
    }
}

// ── Cycle ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("schedule unavailable: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("live feed unavailable: {0}")]
    Live(#[from] LiveFeedError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub rows: usize,
    pub candidates: usize,
    pub live_events: usize,
    /// Candidates that found a live counterpart.
    pub matched: usize,
    pub signals_sent: usize,
    pub suppressed: usize,
    pub notify_failed: usize,
    /// No candidate passed the pre-match guards, live feed not called.
    pub live_skipped: bool,
}

pub struct CycleDriver<S, L, N> {
    schedule: S,
    live: L,
    notifier: N,
    evaluator: SignalEvaluator,
    sent: SentRegistry,
    events_log: EventLogger,
}

impl<S, L, N> CycleDriver<S, L, N>
where
    S: ScheduleSource,
    L: LiveSource,
    N: Notifier,
{
    pub fn new(schedule: S, live: L, notifier: N, evaluator: SignalEvaluator) -> Self {
        Self {
            schedule,
            live,
            notifier,
            evaluator,
            sent: SentRegistry::new(),
            events_log: EventLogger::disabled(),
        }
    }

    pub fn with_event_log(mut self, events_log: EventLogger) -> Self {
        self.events_log = events_log;
        self
    }

    pub fn sent(&self) -> &SentRegistry {
        &self.sent
    }

    pub fn reset_sent(&mut self) {
        self.sent.clear();
    }

    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::default();

        let rows = match self.schedule.fetch_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                self.api_status("schedule_csv", false, e.to_string());
                return Err(e.into());
            }
        };
        report.rows = rows.len();
        if rows.is_empty() {
            info!("Schedule empty, nothing to check");
            self.log_summary(&report);
            return Ok(report);
        }

        let candidates: Vec<&ScheduleRow> = rows
            .iter()
            .filter(|row| match self.evaluator.prefilter(row) {
                Ok(_) => true,
                Err(r) => {
                    debug!("skip {} vs {}: {}", row.home_team, row.away_team, r);
                    false
                }
            })
            .collect();
        report.candidates = candidates.len();
        if candidates.is_empty() {
            info!("{} rows, no candidates, live feed skipped", report.rows);
            report.live_skipped = true;
            self.log_summary(&report);
            return Ok(report);
        }

        let events = match self.live.fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                self.api_status("live_events", false, e.to_string());
                return Err(e.into());
            }
        };
        let events = self.evaluator.admissible_events(events);
        report.live_events = events.len();
        info!(
            "{} rows, {} candidates, {} live events",
            report.rows, report.candidates, report.live_events
        );

        for row in candidates {
            match self.evaluator.evaluate(row, &events, &self.sent, now) {
                Verdict::Rejected(r) => {
                    if !r.is_prematch() && r != Rejection::NoLiveMatch {
                        report.matched += 1;
                    }
                    debug!("{} vs {}: {}", row.home_team, row.away_team, r);
                }
                Verdict::Suppressed(key) => {
                    report.matched += 1;
                    report.suppressed += 1;
                    debug!("{} already notified", key);
                }
                Verdict::Eligible(signal) => {
                    report.matched += 1;
                    match self.notifier.send(&signal.text).await {
                        Ok(()) => {
                            info!(
                                "🚨 SIGNAL {} vs {} @ {}' (avg {:.2}, {})",
                                signal.home, signal.away, signal.minute, signal.average_goals, signal.match_kind
                            );
                            self.log_signal(&signal);
                            self.sent.record(signal.key);
                            report.signals_sent += 1;
                        }
                        Err(e) => {
                            warn!("Notify failed for {} vs {}: {}", signal.home, signal.away, e);
                            self.api_status("telegram", false, e.to_string());
                            report.notify_failed += 1;
                        }
                    }
                }
            }
        }

        info!(
            "Cycle done: {} matched, {} sent, {} suppressed, {} failed",
            report.matched, report.signals_sent, report.suppressed, report.notify_failed
        );
        self.log_summary(&report);
        Ok(report)
    }

    /// Best-effort, failures only logged.
    pub async fn announce(&self, text: &str) {
        if let Err(e) = self.notifier.send(text).await {
            warn!("Telegram announce failed: {}", e);
        }
    }

    pub async fn announce_startup(&self) {
        let cfg = self.evaluator.config();
        self.announce(&alert::format_startup(cfg.min_average_goals, &cfg.window.to_string()))
            .await;
    }

    pub async fn announce_shutdown(&self) {
        self.announce(&alert::format_shutdown()).await;
    }

    /// Never returns; cancel it from the outside (ctrl-c in main).
    pub async fn run_forever(&mut self, interval: Duration, error_backoff: Duration) {
        loop {
            info!("--- Signal cycle ---");
            let pause = match self.run_cycle(Utc::now()).await {
                Ok(_) => interval,
                Err(e) => {
                    warn!("Cycle failed: {}. Retrying in {}s", e, error_backoff.as_secs());
                    error_backoff
                }
            };
            tokio::time::sleep(pause).await;
        }
    }

    // ── JSONL ────────────────────────────────────────────────────────────────

    fn log_signal(&self, signal: &Signal) {
        let ev = SignalSentEvent {
            ts: now_iso(),
            event: "SIGNAL_SENT",
            key: signal.key.to_string(),
            league: signal.league.clone(),
            home: signal.home.clone(),
            away: signal.away.clone(),
            average_goals: signal.average_goals,
            minute: signal.minute,
            match_kind: signal.match_kind.to_string(),
        };
        if let Err(e) = self.events_log.log(&ev) {
            warn!("event log write failed: {}", e);
        }
    }

    fn log_summary(&self, report: &CycleReport) {
        let ev = CycleSummaryEvent {
            ts: now_iso(),
            event: "CYCLE_SUMMARY",
            rows: report.rows,
            candidates: report.candidates,
            live_events: report.live_events,
            matched: report.matched,
            signals_sent: report.signals_sent,
            notify_failed: report.notify_failed,
        };
        if let Err(e) = self.events_log.log(&ev) {
            warn!("event log write failed: {}", e);
        }
    }

    fn api_status(&self, source: &str, ok: bool, message: String) {
        let ev = ApiStatusEvent {
            ts: now_iso(),
            event: "API_STATUS",
            source: source.to_string(),
            ok,
            message,
        };
        if let Err(e) = self.events_log.log(&ev) {
            warn!("event log write failed: {}", e);
        }
    }
}
