/// FootySignal — Schedule Reader
///
/// Stáhne CSV s dnešními zápasy (FootyStats export na GitHubu) a převede
/// každý řádek na `ScheduleRow`. Hlavičky se hledají přes tabulku synonym.

pub mod headers;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use headers::{resolve_column, Field, HeaderMap};

/// Text formats seen in the date column of schedule exports (after " - " is dropped).
const KICKOFF_FORMATS: &[&str] = &["%b %d %Y %I:%M%p", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M"];

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule CSV URL is not configured")]
    MissingUrl,

    #[error("schedule request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("schedule source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("schedule CSV unreadable: {0}")]
    Csv(#[from] csv::Error),
}

/// One fixture from the schedule CSV. Lives for a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    /// "Country League", whitespace collapsed; empty when the CSV has neither.
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub average_goals: Option<f64>,
    pub team_form: Option<f64>,
    pub kickoff: Option<DateTime<Utc>>,
}

impl ScheduleRow {
    pub fn new(league: &str, home_team: &str, away_team: &str, average_goals: f64) -> Self {
        Self {
            league: league.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            average_goals: Some(average_goals),
            team_form: None,
            kickoff: None,
        }
    }
}

pub struct ScheduleReader {
    client: reqwest::Client,
    url: String,
}

impl ScheduleReader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>, ScheduleError> {
        if self.url.trim().is_empty() {
            return Err(ScheduleError::MissingUrl);
        }
        info!("Downloading schedule CSV: {}", self.url);

        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScheduleError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let bytes = resp.bytes().await?;
        let body = String::from_utf8_lossy(&bytes);
        let rows = parse_rows(&body)?;
        info!("Schedule CSV loaded: {} rows", rows.len());
        Ok(rows)
    }
}

/// Parse a whole CSV body. A broken header row fails the parse; broken
/// records and records without both team names are skipped.
pub fn parse_rows(body: &str) -> Result<Vec<ScheduleRow>, ScheduleError> {
    let body = body.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let map = HeaderMap::resolve(&headers);
    if !map.has(Field::Home) || !map.has(Field::Away) {
        warn!("Schedule CSV has no recognisable home/away columns: {:?}", headers);
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                if let Some(row) = row_from_record(&map, &record) {
                    rows.push(row);
                } else {
                    debug!("CSV record {} skipped: missing team names", line + 1);
                }
            }
            Err(e) => warn!("CSV record {} unreadable, skipping: {}", line + 1, e),
        }
    }
    Ok(rows)
}

fn row_from_record(map: &HeaderMap, record: &StringRecord) -> Option<ScheduleRow> {
    let home_team = map.get(record, Field::Home)?.to_string();
    let away_team = map.get(record, Field::Away)?.to_string();

    let country = map.get(record, Field::Country).unwrap_or("");
    let league = map.get(record, Field::League).unwrap_or("");
    let league = format!("{country} {league}")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    Some(ScheduleRow {
        league,
        home_team,
        away_team,
        average_goals: map.get(record, Field::AverageGoals).and_then(parse_decimal),
        team_form: map.get(record, Field::TeamForm).and_then(parse_decimal),
        kickoff: kickoff_from_record(map, record),
    })
}

/// Decimal cell; accepts a comma as decimal separator.
pub fn parse_decimal(cell: &str) -> Option<f64> {
    cell.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Kickoff lookup order: epoch column by name, a first column holding a
/// bare epoch, then the first date/time-like column as text.
fn kickoff_from_record(map: &HeaderMap, record: &StringRecord) -> Option<DateTime<Utc>> {
    if let Some(dt) = map.get(record, Field::KickoffEpoch).and_then(parse_epoch_seconds) {
        return Some(dt);
    }
    if let Some(dt) = record.get(0).and_then(parse_epoch_seconds) {
        return Some(dt);
    }
    map.first_date_cell(record).and_then(parse_kickoff_text)
}

/// 9–11 digit integer, seconds since the Unix epoch.
pub fn parse_epoch_seconds(cell: &str) -> Option<DateTime<Utc>> {
    let cell = cell.trim();
    if !(9..=11).contains(&cell.len()) || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: i64 = cell.parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Kickoff text such as "Oct 15 2025 - 4:00pm", taken as UTC.
pub fn parse_kickoff_text(cell: &str) -> Option<DateTime<Utc>> {
    if let Some(dt) = parse_epoch_seconds(cell) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell.trim()) {
        return Some(dt.with_timezone(&Utc));
    }
    let text = cell.trim().replace(" - ", " ");
    KICKOFF_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&text, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FOOTYSTATS_CSV: &str = "\
timestamp,date_GMT,Country,League,Home Team,Away Team,Average Goals,Form Avg
1760540400,Oct 15 2025 - 3:00pm,England,Premier League,Chelsea,Arsenal,\"3,10\",2.4
1760544000,Oct 15 2025 - 4:00pm,Italy,Serie A,Inter,Milan,2.05,
1760547600,Oct 15 2025 - 5:00pm,Spain,La Liga,,Real Madrid,2.9,1.1
";

    #[test]
    fn parses_footystats_export() {
        let rows = parse_rows(FOOTYSTATS_CSV).unwrap();
        assert_eq!(rows.len(), 2, "row without home team is skipped");

        let first = &rows[0];
        assert_eq!(first.league, "England Premier League");
        assert_eq!(first.home_team, "Chelsea");
        assert_eq!(first.away_team, "Arsenal");
        assert_eq!(first.average_goals, Some(3.10));
        assert_eq!(first.team_form, Some(2.4));
        assert_eq!(first.kickoff, Utc.timestamp_opt(1_760_540_400, 0).single());

        assert_eq!(rows[1].team_form, None);
        assert_eq!(rows[1].average_goals, Some(2.05));
    }

    #[test]
    fn reader_keeps_configured_url() {
        let url = "https://raw.githubusercontent.com/acme/footy/main/today.csv";
        assert_eq!(ScheduleReader::new(url).url(), url);
        assert!(ScheduleReader::new("").url().is_empty());
    }

    #[test]
    fn kickoff_falls_back_to_date_text() {
        let csv = "Date,Home,Away,League,AVG\nOct 15 2025 - 4:00pm,Chelsea,Arsenal,EPL,3.1\n";
        let rows = parse_rows(csv).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 10, 15, 16, 0, 0).single();
        assert_eq!(rows[0].kickoff, expected);
    }

    #[test]
    fn missing_average_is_kept_as_none() {
        let csv = "home,away,league,avg\nChelsea,Arsenal,EPL,n/a\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].average_goals, None);
        assert_eq!(rows[0].kickoff, None);
    }

    #[test]
    fn strips_bom_and_tolerates_ragged_records() {
        let csv = "\u{feff}Home Team,Away Team,Average Goals\nChelsea,Arsenal,3.1\nShort\nLeeds,Everton,2.7,extra\n";
        let rows = parse_rows(csv).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.home_team.as_str()).collect();
        assert_eq!(names, vec!["Chelsea", "Leeds"]);
        assert_eq!(rows[0].league, "");
    }

    #[test]
    fn decimal_and_epoch_parsing() {
        assert_eq!(parse_decimal("2,75"), Some(2.75));
        assert_eq!(parse_decimal(" 3 "), Some(3.0));
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal(""), None);
        assert!(parse_epoch_seconds("1760540400").is_some());
        assert!(parse_epoch_seconds("12345").is_none());
        assert!(parse_epoch_seconds("17605404OO").is_none());
    }

    #[test]
    fn kickoff_text_formats() {
        let iso = Utc.with_ymd_and_hms(2025, 10, 15, 18, 45, 0).single();
        assert_eq!(parse_kickoff_text("2025-10-15 18:45"), iso);
        assert_eq!(parse_kickoff_text("15/10/2025 18:45"), iso);
        assert_eq!(parse_kickoff_text("2025-10-15T18:45:00Z"), iso);
        assert_eq!(parse_kickoff_text("tomorrow"), None);
    }
}
