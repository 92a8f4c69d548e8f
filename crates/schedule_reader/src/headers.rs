//! Header synonym tables for the schedule CSV.
//!
//! Schedule exports rename their columns every few weeks ("Home Team",
//! "home_name", "team1", ...). Each logical field owns an ordered list of
//! candidate headers; the first candidate present in the file wins.

use csv::StringRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Home,
    Away,
    League,
    Country,
    AverageGoals,
    TeamForm,
    KickoffEpoch,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Home,
        Field::Away,
        Field::League,
        Field::Country,
        Field::AverageGoals,
        Field::TeamForm,
        Field::KickoffEpoch,
    ];

    /// Candidate header names, lowercase, in priority order.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Field::Home => &["home", "home team", "hometeam", "team1", "home_name", "home_team_name"],
            Field::Away => &["away", "away team", "awayteam", "team2", "away_name", "away_team_name"],
            Field::League => &["league", "competition", "tournament", "country_league", "division"],
            Field::Country => &["country"],
            Field::AverageGoals => &[
                "average goals", "avg_total_goals", "avg goals", "avg total goals", "goals_avg", "avg",
            ],
            Field::TeamForm => &[
                "team form avg", "form avg", "avg last 5", "avg last5", "avg last 10", "form_l5", "form_l10",
            ],
            Field::KickoffEpoch => &["timestamp", "date_unix", "kickoff_unix", "epoch"],
        }
    }
}

/// Index of the first synonym present among `headers` (case-insensitive, trimmed).
pub fn resolve_column<S: AsRef<str>>(headers: &[S], synonyms: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();
    synonyms
        .iter()
        .find_map(|syn| lowered.iter().position(|h| h == syn))
}

/// Column layout of one CSV file, resolved once from its header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<Field, usize>,
    /// Columns whose header mentions "date" or "time", in file order.
    date_columns: Vec<usize>,
}

impl HeaderMap {
    pub fn resolve(headers: &StringRecord) -> Self {
        let names: Vec<&str> = headers.iter().collect();
        let columns = Field::ALL
            .iter()
            .filter_map(|f| resolve_column(&names, f.synonyms()).map(|idx| (*f, idx)))
            .collect();
        let date_columns = names
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                let h = h.to_lowercase();
                h.contains("date") || h.contains("time")
            })
            .map(|(idx, _)| idx)
            .collect();
        Self { columns, date_columns }
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Trimmed, non-empty cell for `field`.
    pub fn get<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        let idx = self.column(field)?;
        non_empty(record.get(idx))
    }

    /// First non-empty value from a date/time-like column.
    pub fn first_date_cell<'r>(&self, record: &'r StringRecord) -> Option<&'r str> {
        self.date_columns
            .iter()
            .find_map(|idx| non_empty(record.get(*idx)))
    }
}

fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}
