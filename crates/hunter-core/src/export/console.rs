//! Console output formatting with colored display

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::backup::ReplaySummary;
use crate::game::{KillRecord, ProximityEvent, ProximityKind};

const BORDER_WIDTH: usize = 50;

/// Format a kill for console display
///
/// Returns a multi-line string with a boxed format.
pub fn format_kill_console(record: &KillRecord) -> String {
    let mut output = String::new();
    let border = "━".repeat(BORDER_WIDTH);
    let border_dim = border.dimmed();

    let _ = writeln!(output, "{}", border_dim);
    let _ = writeln!(output, "  {} {}", "KILL".red().bold(), record.victim.bold());
    let _ = writeln!(output, "{}", border_dim);
    let _ = writeln!(output, "  TIME   : {}", record.time);
    let _ = writeln!(output, "  ZONE   : {}", record.zone);
    if let Some(location) = &record.location {
        let _ = writeln!(output, "  WHERE  : {}", location.cyan());
    }
    if let Some(coordinates) = &record.coordinates {
        let _ = writeln!(output, "  POS    : {}", coordinates.dimmed());
    }
    let _ = writeln!(output, "  WEAPON : {}", record.weapon);
    let _ = writeln!(output, "  DAMAGE : {}", record.damage_type.yellow());
    let _ = writeln!(output, "  SHIP   : {}", record.ship_used);
    let _ = writeln!(output, "  MODE   : {}", record.game_mode);
    let _ = write!(output, "{}", border_dim);

    output
}

/// One-line status message, colored by content
pub fn format_status_console(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("error") || lower.contains("rejected") || lower.contains("failed") {
        message.red().to_string()
    } else if lower.starts_with("you have killed") {
        message.green().to_string()
    } else if lower.contains("died") {
        message.yellow().to_string()
    } else {
        message.to_string()
    }
}

/// Format a proximity event as a single line
pub fn format_proximity_console(event: &ProximityEvent) -> String {
    match event.kind {
        ProximityKind::ActorStall => format!(
            "{} {} nearby",
            "[stall]".blue(),
            event.player.bold()
        ),
        ProximityKind::FakeHit => format!(
            "{} {} -> {} ({})",
            "[snare]".magenta(),
            event.from_player.as_deref().unwrap_or("?").bold(),
            event.player,
            event.ship.as_deref().unwrap_or("N/A")
        ),
    }
}

/// Format a backup replay summary
pub fn format_replay_summary(summary: &ReplaySummary) -> String {
    let mut output = String::new();
    let border = "━".repeat(BORDER_WIDTH);
    let border_dim = border.dimmed();

    let _ = writeln!(output, "{}", border_dim);
    let _ = writeln!(output, "  {}", "BACKUP REPLAY".bold());
    let _ = writeln!(output, "{}", border_dim);
    let _ = writeln!(
        output,
        "  FILES      : {} ({} failed)",
        summary.files_processed, summary.files_failed
    );
    let _ = writeln!(output, "  KILLS      : {}", summary.total_kills);
    let _ = writeln!(output, "  UPLOADED   : {}", summary.uploaded.green());
    let _ = writeln!(output, "  DUPLICATES : {}", summary.duplicates.dimmed());
    if summary.failed_uploads.is_empty() {
        let _ = writeln!(output, "  FAILED     : 0");
    } else {
        let _ = writeln!(output, "  FAILED     : {}", summary.failed_uploads.len().red());
    }

    if !summary.by_victim.is_empty() {
        let _ = writeln!(output, "{}", border_dim);
        for (victim, tally) in &summary.by_victim {
            let weapons = tally
                .weapons
                .iter()
                .map(|(weapon, count)| format!("{} x{}", weapon, count))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(output, "  {:<20} {:>3}  {}", victim, tally.kills, weapons.dimmed());
        }
    }
    let _ = write!(output, "{}", border_dim);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::VictimTally;

    fn record() -> KillRecord {
        KillRecord {
            player: "DocHound".to_string(),
            time: "2025-04-14T16:42:53.465Z".to_string(),
            victim: "idkausername_27".to_string(),
            killer: "DocHound".to_string(),
            zone: "OOC_Stanton_2a_Cellin".to_string(),
            weapon: "lbco_pistol_energy_01".to_string(),
            damage_type: "Bullet".to_string(),
            location: Some("OOC_Stanton_2a_Cellin".to_string()),
            coordinates: None,
            game_mode: "SC_Default".to_string(),
            ship_used: "N/A".to_string(),
        }
    }

    #[test]
    fn test_format_kill_console() {
        let output = format_kill_console(&record());
        assert!(output.contains("idkausername_27"));
        assert!(output.contains("WEAPON : lbco_pistol_energy_01"));
        assert!(output.contains("WHERE"));
        assert!(!output.contains("POS"));
    }

    #[test]
    fn test_format_replay_summary() {
        let mut summary = ReplaySummary {
            total_kills: 3,
            uploaded: 2,
            duplicates: 1,
            files_processed: 2,
            ..Default::default()
        };
        summary.by_victim.insert(
            "Mercuriuss".to_string(),
            VictimTally {
                kills: 3,
                weapons: [("gatling".to_string(), 3)].into_iter().collect(),
                damage_types: Default::default(),
            },
        );

        let output = format_replay_summary(&summary);
        assert!(output.contains("KILLS      : 3"));
        assert!(output.contains("FAILED     : 0"));
        assert!(output.contains("Mercuriuss"));
        assert!(output.contains("gatling x3"));
    }

    #[test]
    fn test_format_status_plain_message() {
        assert_eq!(format_status_console("Tailing started"), "Tailing started");
    }
}
