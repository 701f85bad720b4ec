use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::comparison::{ComparisonReport, ModeFailure};
use crate::impact::{BaselineDelta, ImpactSummary};
use crate::progress::ProgressSummary;
use crate::units::format_duration;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_comparison_table(report: &ComparisonReport) -> String {
    let mut table = new_table();
    table.set_header(vec!["Mode", "Time", "CO\u{2082} (kg)", "Active kcal", "Best"]);

    let best_mode = report.best.map(|b| b.mode);
    for r in report.set.results() {
        if !r.available {
            table.add_row(Row::from(vec![
                Cell::new(r.mode.to_string()),
                Cell::new(format_duration(r.time_min)),
                Cell::new("n/a").fg(Color::Yellow),
                Cell::new("-"),
                Cell::new(""),
            ]));
            continue;
        }
        let kcal = if r.mode.is_active() {
            r.kcal.to_string()
        } else {
            "-".to_string()
        };
        let best_cell = if best_mode == Some(r.mode) {
            Cell::new(report.preference.to_string()).fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(Row::from(vec![
            Cell::new(r.mode.to_string()),
            Cell::new(format_duration(r.time_min)),
            Cell::new(format!("{:.2}", r.co2_kg)),
            Cell::new(kcal),
            best_cell,
        ]));
    }
    table.to_string()
}

pub fn render_impact_table(impact: &ImpactSummary) -> String {
    let mut table = new_table();
    table.set_header(vec!["Impact", "Value"]);
    table.add_row(vec!["Mode".to_string(), impact.mode.to_string()]);
    table.add_row(vec![
        "CO\u{2082} saved".to_string(),
        format!("{:.2} kg", impact.co2_saved_kg),
    ]);
    table.add_row(vec!["Trees".to_string(), impact.trees_text.clone()]);
    table.add_row(vec![
        "Active calories".to_string(),
        format!("{} kcal", impact.active_kcal),
    ]);
    let score_cell = match impact.score {
        70..=100 => Cell::new(impact.score).fg(Color::Green),
        40..=69 => Cell::new(impact.score).fg(Color::Yellow),
        _ => Cell::new(impact.score),
    };
    table.add_row(Row::from(vec![Cell::new("Score"), score_cell]));
    table.add_row(vec!["Tip".to_string(), impact.recommendation.clone()]);
    table.to_string()
}

pub fn render_deltas_table(deltas: &[BaselineDelta]) -> String {
    let mut table = new_table();
    table.set_header(vec!["vs Car", "Time", "CO\u{2082} saved (kg)", "kcal"]);
    for d in deltas {
        table.add_row(vec![
            d.mode.to_string(),
            format!("{:+} min", d.time_delta_min),
            format!("{:.2}", d.co2_saved_kg),
            format!("{:+}", d.kcal_delta),
        ]);
    }
    table.to_string()
}

pub fn render_failures_table(failures: &[ModeFailure]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Mode", "Error"]);
    for f in failures {
        table.add_row(Row::from(vec![
            Cell::new(f.mode.to_string()),
            Cell::new(&f.message).fg(Color::Red),
        ]));
    }
    table.to_string()
}

pub fn render_progress_table(summary: &ProgressSummary) -> String {
    let state = &summary.state;
    let mut table = new_table();
    table.set_header(vec!["Progress", "Value"]);
    table.add_row(vec!["Journeys".to_string(), state.journeys.to_string()]);
    table.add_row(vec![
        "CO\u{2082} saved".to_string(),
        format!("{:.2} kg", state.total_co2_saved_kg),
    ]);
    table.add_row(vec![
        "Active calories".to_string(),
        format!("{:.0} kcal", state.total_kcal),
    ]);
    table.add_row(vec!["Streak".to_string(), format!("{} days", state.streak)]);
    table.add_row(vec![
        "Last sustainable day".to_string(),
        state
            .last_sustainable_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Tree".to_string(),
        format!(
            "{} ({}/{} leaves)",
            summary.tree.stage, summary.tree.leaves, summary.tree.max_leaves
        ),
    ]);
    table.to_string()
}

pub fn render_achievements_table(summary: &ProgressSummary) -> String {
    let mut table = new_table();
    table.set_header(vec!["Achievement", "Goal", "Progress", "Unlocked"]);
    for a in &summary.achievements {
        let unlocked = if a.unlocked {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(Row::from(vec![
            Cell::new(a.achievement.to_string()),
            Cell::new(a.achievement.description()),
            Cell::new(format!("{:.0}/{:.0}", a.current.min(a.threshold), a.threshold)),
            unlocked,
        ]));
    }
    table.to_string()
}
