/// Output formatting: terminal table and JSON.
use haikurank_core::{Report, Source};
use serde::Serialize;

use crate::session::SessionStats;

/// Print the leaderboard as a formatted terminal table.
pub fn print_table(report: &Report, limit: Option<usize>) {
    let rows = &report.poems[..limit.unwrap_or(report.poems.len()).min(report.poems.len())];

    let id_width = rows.iter().map(|r| r.id.chars().count()).max().unwrap_or(2).max(2);

    println!("   # | {:<id_width$} | Source |  Rating |    W-L-D | Matches | Author", "Id");
    println!("-----|-{}-|--------|---------|----------|---------|-------", "-".repeat(id_width));

    for (i, r) in rows.iter().enumerate() {
        let wld = format!("{}-{}-{}", r.wins, r.losses, r.draws);
        println!(
            "{:>4} | {:<id_width$} | {:<6} | {:>7.1} | {:>8} | {:>7} | {}",
            i + 1,
            r.id,
            r.source,
            r.rating,
            wld,
            r.matches,
            r.provenance.author.as_deref().unwrap_or("-"),
        );
    }

    if rows.len() < report.poems.len() {
        println!("... {} more", report.poems.len() - rows.len());
    }

    println!(
        "\n{} poems, {} matches recorded ({} draws)",
        report.poems.len(),
        report.total_matches,
        report.summary.draws,
    );
    print_category_line(report);
}

/// One line of per-category averages after the leaderboard.
pub fn print_category_line(report: &Report) {
    let parts: Vec<String> = Source::ALL
        .iter()
        .filter_map(|s| report.summary.categories.get(s).map(|c| (s, c)))
        .map(|(s, c)| format!("{s}: {:.1} ({} poems, {} wins)", c.avg_rating, c.count, c.wins))
        .collect();
    println!("Average rating — {}", parts.join("  |  "));
}

pub fn print_session(stats: &SessionStats) {
    println!(
        "\nDone: {} matches, {} errors ({} pairs attempted, {} requested)",
        stats.completed, stats.errors, stats.attempted, stats.requested,
    );
    println!("A wins: {}  B wins: {}  Draws: {}", stats.a_wins, stats.b_wins, stats.draws);
    if stats.retries > 0 {
        println!("Judge retries: {}", stats.retries);
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<&'a SessionStats>,
    report: &'a Report,
}

/// Print the session stats (if any) and report as JSON.
pub fn print_json(report: &Report, session: Option<&SessionStats>) -> Result<(), serde_json::Error> {
    let output = JsonOutput { session, report };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
