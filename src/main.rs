/// FootySignal — Over 1.5 Signal Bot
///
/// Co dělá:
///   1. Každých CHECK_INTERVAL_SECONDS stáhne CSV plán zápasů (GITHUB_CSV_URL)
///   2. Řádky s AVG gólů ≥ prahem spáruje s live zápasy (RapidAPI feed)
///   3. 0-0 v okně minut (default 50'–56') → Telegram alert, jednou na zápas
///
/// Co NEDĚLÁ: žádné sázky, žádná perzistence (restart = čistý registr)
///
/// Spuštění:
///   cargo run --bin signal-bot

use anyhow::Result;
use dotenv::dotenv;
use footy_signal::{BotConfig, CycleDriver};
use live_monitor::LiveMonitor;
use logger::{init_tracing, EventLogger};
use schedule_reader::ScheduleReader;
use signal_engine::SignalEvaluator;
use telegram_notifier::TelegramNotifier;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cfg = BotConfig::from_env()?;
    init_tracing(cfg.debug_log);

    info!("=== FootySignal — Over 1.5 signal bot ===");
    info!(
        "AVG ≥ {:.2} | window {} | interval {}s",
        cfg.signal.min_average_goals,
        cfg.signal.window,
        cfg.check_interval.as_secs()
    );
    if cfg.telegram_token.is_empty() || cfg.chat_id.is_empty() {
        warn!("TELEGRAM_TOKEN/CHAT_ID missing, signals will be logged but not sent");
    }
    if cfg.live.api_key.is_empty() {
        warn!("RAPIDAPI_KEY not set, live feed will most likely reject requests");
    }
    match &cfg.event_log_dir {
        Some(dir) => info!("Event log: {}", dir.display()),
        None => info!("Event log: disabled"),
    }

    let schedule = ScheduleReader::new(cfg.schedule_url.clone());
    if schedule.url().is_empty() {
        warn!("GITHUB_CSV_URL not set, every cycle will fail until it is");
    } else {
        info!("Schedule CSV: {}", schedule.url());
    }

    let mut driver = CycleDriver::new(
        schedule,
        LiveMonitor::new(&cfg.live),
        TelegramNotifier::new(cfg.telegram_token.clone(), cfg.chat_id.clone()),
        SignalEvaluator::new(cfg.signal.clone()),
    )
    .with_event_log(EventLogger::from_option(cfg.event_log_dir.clone()));

    if cfg.send_startup_msg {
        driver.announce_startup().await;
    }
    info!("🚀 READY: Spouštím signal loop.");

    tokio::select! {
        _ = driver.run_forever(cfg.check_interval, cfg.error_backoff) => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!("Ctrl-C handler failed: {}", e);
            }
            info!("Shutdown requested");
        }
    }

    if cfg.send_startup_msg {
        driver.announce_shutdown().await;
    }
    info!("Bye.");
    Ok(())
}
