//! JSON pointer tables for live-event payloads and the coercions applied
//! to whatever sits at those pointers.
//!
//! Providers disagree on almost everything: `home` may be a string or
//! `{ "name": .. }`, the score may be `"0-0"`, `{home, away}` or two flat
//! fields, kickoff may be epoch seconds, millis, RFC 3339 or bet365's
//! `YYYYMMDDHHMMSS`. Each logical field gets an ordered pointer list.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

pub const EVENT_LIST_PATHS: &[&str] = &["/data/events", "/data", "/events", "/results", "/response"];

pub const ID_PATHS: &[&str] = &["/id", "/event_id", "/eventId", "/FI", "/fixture/id"];

pub const HOME_PATHS: &[&str] = &[
    "/home/name", "/home", "/homeTeam/name", "/homeTeam", "/home_name", "/homeName", "/home_team",
    "/teams/home/name",
];

pub const AWAY_PATHS: &[&str] = &[
    "/away/name", "/away", "/awayTeam/name", "/awayTeam", "/away_name", "/awayName", "/away_team",
    "/teams/away/name",
];

pub const LEAGUE_PATHS: &[&str] = &[
    "/league/name", "/league", "/competition/name", "/competition", "/tournament/name", "/tournament",
    "/league_name", "/leagueName", "/CT",
];

/// Composite "H-A" strings.
pub const SCORE_TEXT_PATHS: &[&str] = &["/SS", "/ss", "/score"];

pub const HOME_SCORE_PATHS: &[&str] = &[
    "/scores/home", "/score/home", "/goals/home", "/home_score", "/homeScore", "/home/score",
];

pub const AWAY_SCORE_PATHS: &[&str] = &[
    "/scores/away", "/score/away", "/goals/away", "/away_score", "/awayScore", "/away/score",
];

pub const ELAPSED_PATHS: &[&str] = &[
    "/minute", "/elapsed", "/timer/tm", "/timer", "/time_elapsed", "/time_status/elapsed",
    "/fixture/status/elapsed", "/status/elapsed",
];

pub const KICKOFF_PATHS: &[&str] = &[
    "/startTime", "/start_time", "/kickoff", "/time", "/TU", "/fixture/timestamp", "/fixture/date",
    "/commence_time",
];

/// First pointer whose value converts successfully.
pub fn first_of<T>(ev: &Value, paths: &[&str], convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
    paths
        .iter()
        .find_map(|p| ev.pointer(p).and_then(|v| convert(v)))
}

/// Non-empty string, or a number rendered as text. Objects never qualify.
pub fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative integer from a number or a numeric string.
pub fn as_count(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// "0-0", "2:1", "1 - 0".
pub fn parse_score_text(s: &str) -> Option<(u32, u32)> {
    let (h, a) = s.split_once('-').or_else(|| s.split_once(':'))?;
    Some((h.trim().parse().ok()?, a.trim().parse().ok()?))
}

pub fn as_score_text(v: &Value) -> Option<(u32, u32)> {
    v.as_str().and_then(parse_score_text)
}

/// Match clock: 52, "52", "52'", "52:13" (mm:ss), "45+2" (stoppage time added).
pub fn as_minute(v: &Value) -> Option<u32> {
    match v {
        Value::Number(_) => as_count(v),
        Value::String(s) => parse_minute_text(s),
        _ => None,
    }
}

pub fn parse_minute_text(s: &str) -> Option<u32> {
    let s = s.trim().trim_end_matches('\'');
    if let Some((base, extra)) = s.split_once('+') {
        return base.trim().parse::<u32>().ok()?.checked_add(extra.trim().parse::<u32>().ok()?);
    }
    let minutes = s.split(':').next()?.trim();
    minutes.parse().ok()
}

pub fn as_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => n.as_i64().and_then(epoch_to_utc),
        Value::String(s) => parse_timestamp_text(s),
        _ => None,
    }
}

/// Seconds, or millis when the value is too large to be seconds.
fn epoch_to_utc(raw: i64) -> Option<DateTime<Utc>> {
    if raw <= 0 {
        return None;
    }
    if raw >= 100_000_000_000 {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}

pub fn parse_timestamp_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        if s.len() == 14 {
            return NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S")
                .ok()
                .map(|n| n.and_utc());
        }
        return s.parse::<i64>().ok().and_then(epoch_to_utc);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn minute_texts() {
        assert_eq!(parse_minute_text("52"), Some(52));
        assert_eq!(parse_minute_text("52'"), Some(52));
        assert_eq!(parse_minute_text("52:13"), Some(52));
        assert_eq!(parse_minute_text("45+2"), Some(47));
        assert_eq!(parse_minute_text("HT"), None);
        assert_eq!(parse_minute_text("4294967295+1"), None);
        assert_eq!(parse_minute_text("90+4294967295"), None);
        assert_eq!(as_minute(&json!(61)), Some(61));
        assert_eq!(as_minute(&json!(-3)), None);
    }

    #[test]
    fn score_texts() {
        assert_eq!(parse_score_text("0-0"), Some((0, 0)));
        assert_eq!(parse_score_text("2:1"), Some((2, 1)));
        assert_eq!(parse_score_text(" 1 - 0 "), Some((1, 0)));
        assert_eq!(parse_score_text(""), None);
        assert_eq!(parse_score_text("x-1"), None);
    }

    #[test]
    fn timestamps_in_all_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 14, 15, 47, 12).single();
        assert_eq!(parse_timestamp_text("20251014154712"), expected);
        assert_eq!(as_timestamp(&json!(1_760_456_832)), expected);
        assert_eq!(as_timestamp(&json!(1_760_456_832_000_i64)), expected);
        assert_eq!(as_timestamp(&json!("1760456832")), expected);
        assert_eq!(as_timestamp(&json!("2025-10-14T15:47:12Z")), expected);
        assert_eq!(as_timestamp(&json!("2025-10-14T17:47:12+02:00")), expected);
        assert_eq!(as_timestamp(&json!("soon")), None);
        assert_eq!(as_timestamp(&json!(0)), None);
    }

    #[test]
    fn text_skips_objects_and_blanks() {
        let ev = json!({ "home": { "name": "Chelsea" }, "homeTeam": "  " , "home_name": "Chelsea FC" });
        assert_eq!(first_of(&ev, HOME_PATHS, as_text).as_deref(), Some("Chelsea"));
        let ev = json!({ "home": { "id": 9 }, "homeTeam": "", "home_name": "Chelsea FC" });
        assert_eq!(first_of(&ev, HOME_PATHS, as_text).as_deref(), Some("Chelsea FC"));
        assert_eq!(as_text(&json!(4521)).as_deref(), Some("4521"));
    }
}
