//! Elapsed-minute resolution for a matched pair.
//!
//! Reported clock first, then kickoff (live event before schedule row).
//! Integer minutes, floor division, UTC only.

use chrono::{DateTime, Utc};
use live_monitor::LiveEvent;
use schedule_reader::ScheduleRow;

/// Reported clocks above this are treated as garbage.
pub const MAX_REPORTED_MINUTE: u32 = 150;
/// Derived minutes above this mean a stale or wrong kickoff.
pub const MAX_DERIVED_MINUTE: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinuteSource {
    Reported,
    LiveKickoff,
    ScheduleKickoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedMinutes {
    pub minutes: u32,
    pub source: MinuteSource,
}

/// `None` = unresolved; the fixture is skipped this cycle.
pub fn resolve_elapsed(row: &ScheduleRow, ev: &LiveEvent, now: DateTime<Utc>) -> Option<ElapsedMinutes> {
    if let Some(m) = ev.elapsed_minutes.filter(|m| *m <= MAX_REPORTED_MINUTE) {
        return Some(ElapsedMinutes { minutes: m, source: MinuteSource::Reported });
    }
    let (kickoff, source) = match (ev.kickoff, row.kickoff) {
        (Some(k), _) => (k, MinuteSource::LiveKickoff),
        (None, Some(k)) => (k, MinuteSource::ScheduleKickoff),
        (None, None) => return None,
    };
    minutes_since(kickoff, now).map(|minutes| ElapsedMinutes { minutes, source })
}

/// floor((now − kickoff) / 60 s). `None` before kickoff or past the stale bound.
pub fn minutes_since(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> Option<u32> {
    let secs = (now - kickoff).num_seconds();
    if secs < 0 {
        return None;
    }
    u32::try_from(secs / 60)
        .ok()
        .filter(|m| *m <= MAX_DERIVED_MINUTE)
}
