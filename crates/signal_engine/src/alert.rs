//! Telegram HTML texts.

/// Escape for Telegram `parse_mode=HTML`.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn format_signal(
    home: &str,
    away: &str,
    league: &str,
    average_goals: f64,
    minute: u32,
    score: (u32, u32),
) -> String {
    let mut lines = vec![
        "🚨 <b>SIGNAL OVER 1.5!</b>".to_string(),
        format!("⚽ <b>{}</b> vs <b>{}</b>", escape_html(home), escape_html(away)),
    ];
    if !league.is_empty() {
        lines.push(format!("🏆 {}", escape_html(league)));
    }
    lines.push(format!("📊 <b>AVG Goals:</b> {average_goals:.2}"));
    lines.push(format!("⏱️ <b>{minute}'</b> - <b>Score:</b> {}-{}", score.0, score.1));
    lines.push("✅ Check Bet365 Live!".to_string());
    lines.push(String::new());
    lines.push("🎯 <b>Back Over 1.5 FT</b>".to_string());
    lines.join("\n")
}

pub fn format_startup(min_average_goals: f64, window: &str) -> String {
    format!(
        "🤖 <b>FootySignal bot started</b>\nMonitoring live matches…\n📊 AVG ≥ {min_average_goals:.2} | ⏱️ {window}"
    )
}

pub fn format_shutdown() -> String {
    "⛔ FootySignal bot stopped".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_text_contains_the_essentials() {
        let text = format_signal("Chelsea", "Arsenal", "Premier League", 3.1, 52, (0, 0));
        assert!(text.contains("<b>Chelsea</b> vs <b>Arsenal</b>"));
        assert!(text.contains("🏆 Premier League"));
        assert!(text.contains("3.10"));
        assert!(text.contains("<b>52'</b>"));
        assert!(text.contains("0-0"));
    }

    #[test]
    fn empty_league_line_is_omitted_and_names_escaped() {
        let text = format_signal("Brighton & Hove", "<Arsenal>", "", 2.5, 50, (0, 0));
        assert!(!text.contains("🏆"));
        assert!(text.contains("Brighton &amp; Hove"));
        assert!(text.contains("&lt;Arsenal&gt;"));
    }
}
