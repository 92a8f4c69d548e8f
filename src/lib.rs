//! FootySignal: CSV schedule × live feed → Telegram "Over 1.5" alerts.

pub mod config;
pub mod driver;

pub use config::{BotConfig, ConfigError};
pub use driver::{CycleDriver, CycleError, CycleReport, LiveSource, Notifier, ScheduleSource};
