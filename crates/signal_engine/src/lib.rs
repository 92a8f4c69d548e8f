/// FootySignal — Signal Evaluator
///
/// Pro každý řádek CSV a každý cyklus:
///   CANDIDATE → MATCHED → SCORE_CHECKED → WINDOW_CHECKED → ELIGIBLE → NOTIFIED | SUPPRESSED
///
/// Guardy běží v pevném pořadí a končí na prvním selhání:
///   liga → AVG gólů → forma → live match → 0-0 → okno minut → duplicita

pub mod alert;
pub mod registry;

use chrono::{DateTime, Utc};
use fixture_matcher::{resolve_elapsed, EventMatcher, FixtureMatcher, MatchKind, MinuteSource};
use live_monitor::LiveEvent;
use schedule_reader::ScheduleRow;
use std::fmt;
use tracing::debug;

pub use registry::{NotificationKey, SentRegistry};

pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &[
    "Esoccer", "Volta", "8 mins play", "H2H GG", "Futsal", "Beach", "Penalty", "Esports",
];

// ── Config ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinuteWindow {
    /// Elapsed ≥ N.
    AtLeast(u32),
    /// min ≤ elapsed ≤ max.
    Range { min: u32, max: u32 },
}

impl MinuteWindow {
    pub fn contains(&self, minute: u32) -> bool {
        match *self {
            MinuteWindow::AtLeast(min) => minute >= min,
            MinuteWindow::Range { min, max } => (min..=max).contains(&minute),
        }
    }
}

impl fmt::Display for MinuteWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinuteWindow::AtLeast(min) => write!(f, "≥{min}'"),
            MinuteWindow::Range { min, max } => write!(f, "{min}'–{max}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub min_average_goals: f64,
    /// `None` disables the form filter.
    pub min_team_form: Option<f64>,
    pub window: MinuteWindow,
    /// Lowercase substrings.
    pub exclude_keywords: Vec<String>,
    pub blacklist: Vec<String>,
    /// Empty = every league allowed.
    pub whitelist: Vec<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_average_goals: 2.5,
            min_team_form: None,
            window: MinuteWindow::Range { min: 50, max: 56 },
            exclude_keywords: DEFAULT_EXCLUDE_KEYWORDS.iter().map(|k| k.to_lowercase()).collect(),
            blacklist: Vec::new(),
            whitelist: Vec::new(),
        }
    }
}

// ── Verdict ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    LeagueExcluded { keyword: String },
    LeagueNotWhitelisted,
    AverageGoalsMissing,
    AverageGoalsBelowThreshold { value: f64 },
    TeamFormBelowThreshold { value: f64 },
    NoLiveMatch,
    ScoreUnavailable,
    NotGoalless { home: u32, away: u32 },
    MinuteUnresolved,
    OutsideWindow { minute: u32 },
}

impl Rejection {
    /// Pre-match guards need no live data.
    pub fn is_prematch(&self) -> bool {
        matches!(
            self,
            Rejection::LeagueExcluded { .. }
                | Rejection::LeagueNotWhitelisted
                | Rejection::AverageGoalsMissing
                | Rejection::AverageGoalsBelowThreshold { .. }
                | Rejection::TeamFormBelowThreshold { .. }
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::LeagueExcluded { keyword } => write!(f, "league excluded by '{keyword}'"),
            Rejection::LeagueNotWhitelisted => f.write_str("league not whitelisted"),
            Rejection::AverageGoalsMissing => f.write_str("average goals missing"),
            Rejection::AverageGoalsBelowThreshold { value } => write!(f, "average goals {value:.2} below threshold"),
            Rejection::TeamFormBelowThreshold { value } => write!(f, "team form {value:.2} below threshold"),
            Rejection::NoLiveMatch => f.write_str("no matching live event"),
            Rejection::ScoreUnavailable => f.write_str("live score unavailable"),
            Rejection::NotGoalless { home, away } => write!(f, "score {home}-{away}"),
            Rejection::MinuteUnresolved => f.write_str("elapsed minute unresolved"),
            Rejection::OutsideWindow { minute } => write!(f, "{minute}' outside window"),
        }
    }
}

/// Everything needed to notify and audit one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub key: NotificationKey,
    pub text: String,
    pub home: String,
    pub away: String,
    pub league: String,
    pub average_goals: f64,
    pub minute: u32,
    pub minute_source: MinuteSource,
    pub score: (u32, u32),
    pub match_kind: MatchKind,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Rejected(Rejection),
    Suppressed(NotificationKey),
    Eligible(Signal),
}

// ── Evaluator ────────────────────────────────────────────────────────────────

pub struct SignalEvaluator<M = FixtureMatcher> {
    cfg: SignalConfig,
    matcher: M,
}

impl SignalEvaluator<FixtureMatcher> {
    pub fn new(cfg: SignalConfig) -> Self {
        Self::with_matcher(cfg, FixtureMatcher::default())
    }
}

impl<M: EventMatcher> SignalEvaluator<M> {
    pub fn with_matcher(cfg: SignalConfig, matcher: M) -> Self {
        Self { cfg, matcher }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.cfg
    }

    /// League, average-goals and form guards. Returns the average on success.
    pub fn prefilter(&self, row: &ScheduleRow) -> Result<f64, Rejection> {
        self.check_league(&row.league)?;

        let avg = row.average_goals.ok_or(Rejection::AverageGoalsMissing)?;
        if avg < self.cfg.min_average_goals {
            return Err(Rejection::AverageGoalsBelowThreshold { value: avg });
        }

        if let (Some(min), Some(form)) = (self.cfg.min_team_form, row.team_form) {
            if form < min {
                return Err(Rejection::TeamFormBelowThreshold { value: form });
            }
        }
        Ok(avg)
    }

    /// League exclusion (keywords, blacklist) and whitelist. Empty names pass.
    pub fn check_league(&self, league: &str) -> Result<(), Rejection> {
        if league.trim().is_empty() {
            return Ok(());
        }
        if let Some(keyword) = self.excluding_keyword(league) {
            return Err(Rejection::LeagueExcluded { keyword: keyword.to_string() });
        }
        let lower = league.to_lowercase();
        if !self.cfg.whitelist.is_empty() && !self.cfg.whitelist.iter().any(|w| lower.contains(w.as_str())) {
            return Err(Rejection::LeagueNotWhitelisted);
        }
        Ok(())
    }

    fn excluding_keyword(&self, league: &str) -> Option<&str> {
        let lower = league.to_lowercase();
        self.cfg
            .exclude_keywords
            .iter()
            .chain(self.cfg.blacklist.iter())
            .find(|k| !k.is_empty() && lower.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Drops live events whose own league is excluded (e-soccer with real
    /// club names in brackets, futsal, ...). Whitelist is not applied here:
    /// live league naming differs from the schedule's.
    pub fn admissible_events(&self, events: Vec<LiveEvent>) -> Vec<LiveEvent> {
        events
            .into_iter()
            .filter(|ev| self.excluding_keyword(&ev.league).is_none())
            .collect()
    }

    pub fn evaluate(
        &self,
        row: &ScheduleRow,
        events: &[LiveEvent],
        sent: &SentRegistry,
        now: DateTime<Utc>,
    ) -> Verdict {
        let average_goals = match self.prefilter(row) {
            Ok(avg) => avg,
            Err(r) => return Verdict::Rejected(r),
        };

        let Some(found) = self.matcher.find(row, events) else {
            return Verdict::Rejected(Rejection::NoLiveMatch);
        };
        let ev = found.event;
        debug!(
            "{} vs {} ↔ {} vs {} ({})",
            row.home_team, row.away_team, ev.home_team, ev.away_team, found.kind
        );

        let Some(score) = ev.score() else {
            return Verdict::Rejected(Rejection::ScoreUnavailable);
        };
        if score != (0, 0) {
            return Verdict::Rejected(Rejection::NotGoalless { home: score.0, away: score.1 });
        }

        let Some(elapsed) = resolve_elapsed(row, ev, now) else {
            return Verdict::Rejected(Rejection::MinuteUnresolved);
        };
        if !self.cfg.window.contains(elapsed.minutes) {
            return Verdict::Rejected(Rejection::OutsideWindow { minute: elapsed.minutes });
        }

        let key = NotificationKey::for_pair(row, ev);
        if sent.contains(&key) {
            return Verdict::Suppressed(key);
        }

        let league = if row.league.is_empty() { ev.league.clone() } else { row.league.clone() };
        let text = alert::format_signal(
            &row.home_team,
            &row.away_team,
            &league,
            average_goals,
            elapsed.minutes,
            score,
        );
        Verdict::Eligible(Signal {
            key,
            text,
            home: row.home_team.clone(),
            away: row.away_team.clone(),
            league,
            average_goals,
            minute: elapsed.minutes,
            minute_source: elapsed.source,
            score,
            match_kind: found.kind,
            event_id: ev.event_id.clone(),
        })
    }
}
