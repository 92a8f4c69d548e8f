//! Pairs a schedule row with at most one live event.
//!
//! Per side (home vs home, away vs away) the rules are, strongest first:
//!   1. exact canonical string
//!   2. containment of one canonical string in the other
//!   3. token set: subset, or ≥2 shared tokens when both sides have ≥2
//!
//! The pair matches when both sides pass one of 1–3. Otherwise the
//! similarity fallback (normalised Levenshtein) must clear the loose
//! threshold on both sides and the strict one on at least one side.
//! Kickoff corroboration then vetoes pairs whose start times are too far
//! apart. First candidate in list order wins; no ranking.

use chrono::{DateTime, Duration, Utc};
use live_monitor::LiveEvent;
use schedule_reader::ScheduleRow;
use std::fmt;
use tracing::debug;

use crate::normalize::{normalize, NormalizedName};

/// Ordered weakest → strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    Similarity,
    TokenSet,
    Containment,
    Exact,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchKind::Similarity  => "similarity",
            MatchKind::TokenSet    => "token_set",
            MatchKind::Containment => "containment",
            MatchKind::Exact       => "exact",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    /// Both sides must reach this similarity ratio in the fallback.
    pub similarity_loose: f64,
    /// At least one side must reach this one.
    pub similarity_strict: f64,
    /// Reject pairs whose known kickoffs differ by more than this.
    pub kickoff_tolerance: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_loose: 0.60,
            similarity_strict: 0.72,
            kickoff_tolerance: Duration::hours(3),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureMatch<'a> {
    pub event: &'a LiveEvent,
    pub kind: MatchKind,
}

/// Seam used by the evaluator, so the guard order can be observed in tests.
pub trait EventMatcher {
    fn find<'a>(&self, row: &ScheduleRow, events: &'a [LiveEvent]) -> Option<FixtureMatch<'a>>;
}

#[derive(Debug, Clone, Default)]
pub struct FixtureMatcher {
    cfg: MatcherConfig,
}

impl FixtureMatcher {
    pub fn new(cfg: MatcherConfig) -> Self {
        Self { cfg }
    }

    /// Match kind for one row/event pair, kickoff veto included.
    pub fn compare(&self, row: &ScheduleRow, ev: &LiveEvent) -> Option<MatchKind> {
        let home = normalize(&row.home_team);
        let away = normalize(&row.away_team);
        self.compare_prepared(&home, &away, row.kickoff, ev)
    }

    fn compare_prepared(
        &self,
        home: &NormalizedName,
        away: &NormalizedName,
        row_kickoff: Option<DateTime<Utc>>,
        ev: &LiveEvent,
    ) -> Option<MatchKind> {
        let ev_home = normalize(&ev.home_team);
        let ev_away = normalize(&ev.away_team);
        if ev_home.is_empty() || ev_away.is_empty() {
            return None;
        }

        let kind = match (side_kind(home, &ev_home), side_kind(away, &ev_away)) {
            (Some(h), Some(a)) => h.min(a),
            _ => {
                let sh = self.side_similarity(home, &ev_home);
                let sa = self.side_similarity(away, &ev_away);
                let loose_ok = sh.min(sa) >= self.cfg.similarity_loose;
                let strict_ok = sh.max(sa) >= self.cfg.similarity_strict;
                if !(loose_ok && strict_ok) {
                    return None;
                }
                MatchKind::Similarity
            }
        };

        if let (Some(a), Some(b)) = (row_kickoff, ev.kickoff) {
            if (a - b).abs() > self.cfg.kickoff_tolerance {
                debug!(
                    "{} vs {}: names match ({kind}) but kickoffs differ by {} min",
                    ev.home_team, ev.away_team, (a - b).num_minutes().abs()
                );
                return None;
            }
        }
        Some(kind)
    }

    /// `similarity`, but 0.0 when the names share a token and differ in
    /// tokens that do not resemble each other ("manchester city" vs
    /// "manchester united").
    fn side_similarity(&self, a: &NormalizedName, b: &NormalizedName) -> f64 {
        if conflicting_tokens(a, b, self.cfg.similarity_strict) {
            return 0.0;
        }
        similarity(a, b)
    }
}

impl EventMatcher for FixtureMatcher {
    fn find<'a>(&self, row: &ScheduleRow, events: &'a [LiveEvent]) -> Option<FixtureMatch<'a>> {
        let home = normalize(&row.home_team);
        let away = normalize(&row.away_team);
        if home.is_empty() || away.is_empty() {
            return None;
        }
        events.iter().find_map(|ev| {
            self.compare_prepared(&home, &away, row.kickoff, ev)
                .map(|kind| FixtureMatch { event: ev, kind })
        })
    }
}

/// Rules 1–3 for a single side.
pub fn side_kind(a: &NormalizedName, b: &NormalizedName) -> Option<MatchKind> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a.canonical == b.canonical {
        return Some(MatchKind::Exact);
    }
    if a.canonical.contains(&b.canonical) || b.canonical.contains(&a.canonical) {
        return Some(MatchKind::Containment);
    }
    if a.tokens.is_subset(&b.tokens) || b.tokens.is_subset(&a.tokens) {
        return Some(MatchKind::TokenSet);
    }
    let shared = a.tokens.intersection(&b.tokens).count();
    if a.tokens.len() >= 2 && b.tokens.len() >= 2 && shared >= 2 {
        return Some(MatchKind::TokenSet);
    }
    None
}

fn conflicting_tokens(a: &NormalizedName, b: &NormalizedName, threshold: f64) -> bool {
    if a.tokens.is_disjoint(&b.tokens) {
        return false;
    }
    let only_a: Vec<&String> = a.tokens.difference(&b.tokens).collect();
    let only_b: Vec<&String> = b.tokens.difference(&a.tokens).collect();
    if only_a.is_empty() || only_b.is_empty() {
        return false;
    }
    !only_a
        .iter()
        .any(|x| only_b.iter().any(|y| strsim::normalized_levenshtein(x, y) >= threshold))
}

/// Normalised Levenshtein ratio of the canonical strings, 0.0–1.0.
pub fn similarity(a: &NormalizedName, b: &NormalizedName) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a.canonical, &b.canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(home: &str, away: &str) -> ScheduleRow {
        ScheduleRow::new("Premier League", home, away, 3.1)
    }

    fn live(id: &str, home: &str, away: &str) -> LiveEvent {
        LiveEvent {
            event_id: id.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: Some(0),
            away_score: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn exact_after_normalisation() {
        let m = FixtureMatcher::default();
        let kind = m.compare(&row("Chelsea", "Arsenal"), &live("1", "Chelsea FC", "Arsenal FC"));
        assert_eq!(kind, Some(MatchKind::Exact));
    }

    #[test]
    fn containment_both_sides() {
        let m = FixtureMatcher::default();
        let kind = m.compare(&row("Wolverhampton", "Tottenham"), &live("1", "Wolverhampton Wanderers", "Tottenham Hotspur"));
        assert_eq!(kind, Some(MatchKind::Containment));
    }

    #[test]
    fn token_set_overlap() {
        let m = FixtureMatcher::default();
        // Word order differs, so neither string contains the other.
        let kind = m.compare(
            &row("Mineiro Atletico", "Sport Recife Club"),
            &live("1", "Clube Atletico Mineiro", "Recife Sport"),
        );
        assert_eq!(kind, Some(MatchKind::TokenSet));

        let a = normalize("Deportivo Saprissa San Jose");
        let b = normalize("San Jose Saprissa Heredia");
        assert_eq!(side_kind(&a, &b), Some(MatchKind::TokenSet));
    }

    #[test]
    fn weaker_side_decides_the_kind() {
        let m = FixtureMatcher::default();
        let kind = m.compare(&row("Chelsea", "Tottenham"), &live("1", "Chelsea", "Tottenham Hotspur"));
        assert_eq!(kind, Some(MatchKind::Containment));
    }

    #[test]
    fn similarity_fallback_tolerates_spelling() {
        let m = FixtureMatcher::default();
        let kind = m.compare(&row("Olympiakos Piraeus", "Panathinaikos"), &live("1", "Olympiacos Piraeus", "Panathinaikos Athens"));
        // away side already matches by containment, home falls to similarity → overall similarity
        assert_eq!(kind, Some(MatchKind::Similarity));
    }

    #[test]
    fn unrelated_teams_do_not_match() {
        let m = FixtureMatcher::default();
        assert_eq!(m.compare(&row("Chelsea", "Arsenal"), &live("1", "Everton", "Liverpool")), None);
        // one side matching is not enough
        assert_eq!(m.compare(&row("Chelsea", "Arsenal"), &live("1", "Chelsea", "Liverpool")), None);
        assert_eq!(m.compare(&row("Manchester City", "Leeds"), &live("1", "Manchester United", "Fulham")), None);
    }

    #[test]
    fn shared_city_with_different_club_token_is_not_similar() {
        let m = FixtureMatcher::default();
        assert_eq!(m.compare(&row("Manchester City", "Leeds"), &live("1", "Manchester United", "Leeds")), None);
        assert_eq!(m.compare(&row("Leeds", "Sporting Lisbon"), &live("1", "Leeds", "Benfica Lisbon")), None);
        // a misspelt differing token still counts
        assert_eq!(
            m.compare(&row("Olympiakos Piraeus", "Leeds"), &live("1", "Olympiacos Piraeus", "Leeds")),
            Some(MatchKind::Similarity)
        );
    }

    #[test]
    fn containment_side_does_not_lift_a_weak_partner() {
        // "tottenham" ⊂ "tottenham hotspur" passes rules 1–3 but scores 0.53 as a
        // string; the fallback still needs both sides similar on their own.
        let m = FixtureMatcher::default();
        assert_eq!(m.compare(&row("Tottenham", "Wolverhamton"), &live("1", "Tottenham Hotspur", "Wolverhampton")), None);
    }

    #[test]
    fn kickoff_too_far_apart_is_rejected() {
        let m = FixtureMatcher::default();
        let mut r = row("Chelsea", "Arsenal");
        r.kickoff = Utc.with_ymd_and_hms(2025, 10, 15, 15, 0, 0).single();

        let mut ev = live("1", "Chelsea", "Arsenal");
        ev.kickoff = Utc.with_ymd_and_hms(2025, 10, 15, 17, 30, 0).single();
        assert_eq!(m.compare(&r, &ev), Some(MatchKind::Exact));

        ev.kickoff = Utc.with_ymd_and_hms(2025, 10, 15, 18, 30, 0).single();
        assert_eq!(m.compare(&r, &ev), None);

        // only one side knows its kickoff → no veto
        ev.kickoff = None;
        assert_eq!(m.compare(&r, &ev), Some(MatchKind::Exact));
    }

    #[test]
    fn first_plausible_event_wins() {
        let m = FixtureMatcher::default();
        let events = vec![
            live("a", "Everton", "Leeds"),
            live("b", "Chelsea FC", "Arsenal FC"),
            live("c", "Chelsea", "Arsenal"),
        ];
        let found = m.find(&row("Chelsea", "Arsenal"), &events).unwrap();
        assert_eq!(found.event.event_id, "b");
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn nothing_found_in_empty_or_blank_input() {
        let m = FixtureMatcher::default();
        assert!(m.find(&row("Chelsea", "Arsenal"), &[]).is_none());
        assert!(m.find(&row("", "Arsenal"), &[live("1", "Chelsea", "Arsenal")]).is_none());
        assert!(m.find(&row("Chelsea", "Arsenal"), &[live("1", "", "Arsenal")]).is_none());
    }
}
