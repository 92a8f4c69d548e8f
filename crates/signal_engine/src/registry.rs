//! Duplicate suppression. Owned by the driver, lives for the process,
//! never persisted, no eviction (one day of fixtures per run).

use chrono::{DateTime, Utc};
use fixture_matcher::canonical;
use live_monitor::LiveEvent;
use schedule_reader::ScheduleRow;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey(String);

impl NotificationKey {
    /// `event:<id>` when the provider gives an id, otherwise
    /// `fixture:<home>|<away>|<league>[|<kickoff date>]` from canonical names.
    pub fn for_pair(row: &ScheduleRow, ev: &LiveEvent) -> Self {
        let id = ev.event_id.trim();
        if !id.is_empty() {
            return Self(format!("event:{id}"));
        }
        let mut key = format!(
            "fixture:{}|{}|{}",
            canonical(&row.home_team),
            canonical(&row.away_team),
            canonical(&row.league),
        );
        if let Some(kickoff) = ev.kickoff.or(row.kickoff) {
            key.push('|');
            key.push_str(&kickoff_day(kickoff));
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn kickoff_day(kickoff: DateTime<Utc>) -> String {
    kickoff.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Default)]
pub struct SentRegistry {
    keys: HashSet<NotificationKey>,
}

impl SentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.keys.contains(key)
    }

    /// `false` when the key was already present.
    pub fn record(&mut self, key: NotificationKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pair() -> (ScheduleRow, LiveEvent) {
        let row = ScheduleRow::new("England Premier League", "Chelsea", "Arsenal", 3.1);
        let ev = LiveEvent {
            home_team: "Chelsea FC".into(),
            away_team: "Arsenal FC".into(),
            ..Default::default()
        };
        (row, ev)
    }

    #[test]
    fn event_id_takes_priority() {
        let (row, mut ev) = pair();
        ev.event_id = " 171234 ".into();
        assert_eq!(NotificationKey::for_pair(&row, &ev).as_str(), "event:171234");
    }

    #[test]
    fn fixture_key_from_normalised_names() {
        let (row, mut ev) = pair();
        assert_eq!(
            NotificationKey::for_pair(&row, &ev).as_str(),
            "fixture:chelsea|arsenal|england premier league"
        );
        ev.kickoff = Utc.with_ymd_and_hms(2025, 10, 15, 19, 0, 0).single();
        assert_eq!(
            NotificationKey::for_pair(&row, &ev).as_str(),
            "fixture:chelsea|arsenal|england premier league|2025-10-15"
        );
    }

    #[test]
    fn registry_records_once() {
        let (row, ev) = pair();
        let key = NotificationKey::for_pair(&row, &ev);
        let mut sent = SentRegistry::new();
        assert!(!sent.contains(&key));
        assert!(sent.record(key.clone()));
        assert!(!sent.record(key.clone()));
        assert!(sent.contains(&key));
        assert_eq!(sent.len(), 1);
        sent.clear();
        assert!(sent.is_empty());
    }
}
