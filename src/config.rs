//! Environment configuration (`.env` supported via dotenv in main).

use live_monitor::LiveFeedConfig;
use signal_engine::{MinuteWindow, SignalConfig, DEFAULT_EXCLUDE_KEYWORDS};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_RAPIDAPI_BASE: &str = "https://bet365data.p.rapidapi.com";
pub const DEFAULT_RAPIDAPI_HOST: &str = "bet365data.p.rapidapi.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("MIN_MINUTE ({min}) is greater than MAX_MINUTE ({max})")]
    InvertedWindow { min: u32, max: u32 },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub chat_id: String,
    pub schedule_url: String,
    pub signal: SignalConfig,
    pub live: LiveFeedConfig,
    pub check_interval: Duration,
    /// Pause after a failed cycle.
    pub error_backoff: Duration,
    pub send_startup_msg: bool,
    pub debug_log: bool,
    pub event_log_dir: Option<PathBuf>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key → value source.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let min_average_goals = match text("LEAGUE_MIN_AVG") {
            Some(_) => float(&get, "LEAGUE_MIN_AVG", 2.5)?,
            None => float(&get, "AVG_GOALS_THRESHOLD", 2.5)?,
        };
        let form_min = float(&get, "TEAM_FORM_MIN_AVG", 0.0)?;

        let min_minute: u32 = number(&get, "MIN_MINUTE", 50)?;
        let window = match text("MAX_MINUTE").map(|v| v.to_lowercase()).as_deref() {
            Some("none") | Some("off") => MinuteWindow::AtLeast(min_minute),
            _ => {
                let max: u32 = number(&get, "MAX_MINUTE", 56)?;
                if min_minute > max {
                    return Err(ConfigError::InvertedWindow { min: min_minute, max });
                }
                MinuteWindow::Range { min: min_minute, max }
            }
        };

        let exclude_keywords = match get("LEAGUE_EXCLUDE_KEYWORDS") {
            Some(raw) => keyword_list(&raw, ','),
            None => DEFAULT_EXCLUDE_KEYWORDS.iter().map(|k| k.to_lowercase()).collect(),
        };

        let signal = SignalConfig {
            min_average_goals,
            min_team_form: (form_min > 0.0).then_some(form_min),
            window,
            exclude_keywords,
            blacklist: keyword_list(&get("LEAGUE_BLACKLIST").unwrap_or_default(), '|'),
            whitelist: keyword_list(&get("LEAGUE_WHITELIST").unwrap_or_default(), '|'),
        };

        let live = LiveFeedConfig {
            base_url: text("RAPIDAPI_BASE").unwrap_or_else(|| DEFAULT_RAPIDAPI_BASE.to_string()),
            host: text("RAPIDAPI_HOST").unwrap_or_else(|| DEFAULT_RAPIDAPI_HOST.to_string()),
            api_key: text("RAPIDAPI_KEY").unwrap_or_default(),
            events_path: text("RAPIDAPI_EVENTS_PATH").unwrap_or_else(|| "/live-events".to_string()),
            events_params: get("RAPIDAPI_EVENTS_PARAMS")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| "sport=soccer".to_string()),
        };

        let startup_flag = text("SEND_STARTUP_MSG").or_else(|| text("SEND_STARTUP_"));

        Ok(Self {
            telegram_token: text("TELEGRAM_TOKEN").unwrap_or_default(),
            chat_id: text("CHAT_ID").unwrap_or_default(),
            schedule_url: text("GITHUB_CSV_URL").unwrap_or_default(),
            signal,
            live,
            check_interval: Duration::from_secs(number(&get, "CHECK_INTERVAL_SECONDS", 300)?),
            error_backoff: Duration::from_secs(number(&get, "ERROR_BACKOFF_SECONDS", 60)?),
            send_startup_msg: startup_flag.as_deref().unwrap_or("1") == "1",
            debug_log: text("DEBUG_LOG").as_deref() == Some("1"),
            event_log_dir: text("EVENT_LOG_DIR").map(PathBuf::from),
        })
    }
}

/// Empty or missing → default; anything unparsable is an error.
fn number<T, F>(get: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .replace(',', ".")
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

/// `number` for thresholds: "NaN" and "inf" parse as f64 but are refused.
fn float<F>(get: &F, var: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = number(get, var, default)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidNumber { var, value: value.to_string() })
    }
}

fn keyword_list(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.signal.min_average_goals, 2.5);
        assert_eq!(cfg.signal.min_team_form, None);
        assert_eq!(cfg.signal.window, MinuteWindow::Range { min: 50, max: 56 });
        assert!(cfg.signal.exclude_keywords.contains(&"esoccer".to_string()));
        assert!(cfg.signal.whitelist.is_empty());
        assert_eq!(cfg.live.base_url, DEFAULT_RAPIDAPI_BASE);
        assert_eq!(cfg.live.events_path, "/live-events");
        assert_eq!(cfg.live.events_params, "sport=soccer");
        assert_eq!(cfg.check_interval, Duration::from_secs(300));
        assert_eq!(cfg.error_backoff, Duration::from_secs(60));
        assert!(cfg.send_startup_msg);
        assert!(!cfg.debug_log);
        assert!(cfg.event_log_dir.is_none());
    }

    #[test]
    fn league_min_avg_beats_alias() {
        let cfg = load(&[("LEAGUE_MIN_AVG", "2.8"), ("AVG_GOALS_THRESHOLD", "3.5")]).unwrap();
        assert_eq!(cfg.signal.min_average_goals, 2.8);
        let cfg = load(&[("AVG_GOALS_THRESHOLD", "3,25")]).unwrap();
        assert_eq!(cfg.signal.min_average_goals, 3.25);
    }

    #[test]
    fn window_variants() {
        let cfg = load(&[("MIN_MINUTE", "55"), ("MAX_MINUTE", "none")]).unwrap();
        assert_eq!(cfg.signal.window, MinuteWindow::AtLeast(55));
        let cfg = load(&[("MIN_MINUTE", "60"), ("MAX_MINUTE", "70")]).unwrap();
        assert_eq!(cfg.signal.window, MinuteWindow::Range { min: 60, max: 70 });
        assert!(matches!(
            load(&[("MIN_MINUTE", "60"), ("MAX_MINUTE", "40")]),
            Err(ConfigError::InvertedWindow { min: 60, max: 40 })
        ));
    }

    #[test]
    fn keyword_lists() {
        let cfg = load(&[
            ("LEAGUE_EXCLUDE_KEYWORDS", "Esoccer, Futsal ,,"),
            ("LEAGUE_BLACKLIST", "Friendlies|U21 "),
            ("LEAGUE_WHITELIST", "Premier League|Serie A"),
        ])
        .unwrap();
        assert_eq!(cfg.signal.exclude_keywords, vec!["esoccer", "futsal"]);
        assert_eq!(cfg.signal.blacklist, vec!["friendlies", "u21"]);
        assert_eq!(cfg.signal.whitelist, vec!["premier league", "serie a"]);

        let cfg = load(&[("LEAGUE_EXCLUDE_KEYWORDS", "")]).unwrap();
        assert!(cfg.signal.exclude_keywords.is_empty());
    }

    #[test]
    fn toggles_and_form() {
        let cfg = load(&[
            ("SEND_STARTUP_MSG", "0"),
            ("DEBUG_LOG", "1"),
            ("TEAM_FORM_MIN_AVG", "1.4"),
            ("EVENT_LOG_DIR", "logs"),
        ])
        .unwrap();
        assert!(!cfg.send_startup_msg);
        assert!(cfg.debug_log);
        assert_eq!(cfg.signal.min_team_form, Some(1.4));
        assert_eq!(cfg.event_log_dir, Some(PathBuf::from("logs")));

        let cfg = load(&[("SEND_STARTUP_", "0")]).unwrap();
        assert!(!cfg.send_startup_msg);
    }

    #[test]
    fn bad_numbers_fail_fast() {
        let err = load(&[("CHECK_INTERVAL_SECONDS", "five")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "CHECK_INTERVAL_SECONDS", .. }));
        for bad in ["NaN", "inf", "-infinity"] {
            let err = load(&[("LEAGUE_MIN_AVG", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNumber { var: "LEAGUE_MIN_AVG", .. }));
        }
        assert!(matches!(
            load(&[("AVG_GOALS_THRESHOLD", "nan")]),
            Err(ConfigError::InvalidNumber { var: "AVG_GOALS_THRESHOLD", .. })
        ));
        assert!(matches!(
            load(&[("TEAM_FORM_MIN_AVG", "NaN")]),
            Err(ConfigError::InvalidNumber { var: "TEAM_FORM_MIN_AVG", .. })
        ));
        // empty means default
        assert!(load(&[("MIN_MINUTE", "  ")]).is_ok());
    }
}
