use anyhow::Result;

use crate::comparison::ComparisonReport;
use crate::progress::ProgressSummary;

pub fn comparison_to_csv(report: &ComparisonReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "mode",
        "available",
        "time_min",
        "co2_kg",
        "kcal",
        "best",
        "error",
    ])?;
    let best_mode = report.best.map(|b| b.mode);
    for r in report.set.results() {
        writer.write_record([
            r.mode.as_slug().to_string(),
            r.available.to_string(),
            r.time_min.to_string(),
            format!("{:.2}", r.co2_kg),
            r.kcal.to_string(),
            (best_mode == Some(r.mode)).to_string(),
            String::new(),
        ])?;
    }
    for f in &report.failures {
        writer.write_record([
            f.mode.as_slug().to_string(),
            "false".to_string(),
            String::new(),
            String::new(),
            String::new(),
            "false".to_string(),
            f.message.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn progress_to_csv(summary: &ProgressSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "journeys",
        "total_co2_saved_kg",
        "total_kcal",
        "streak",
        "last_sustainable_date",
        "tree_stage",
        "achievements",
    ])?;
    let state = &summary.state;
    let unlocked = summary
        .unlocked()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(";");
    writer.write_record([
        state.journeys.to_string(),
        format!("{:.2}", state.total_co2_saved_kg),
        format!("{:.0}", state.total_kcal),
        state.streak.to_string(),
        state
            .last_sustainable_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        summary.tree.stage.to_string(),
        unlocked,
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{build_report, ComparisonSet, ModeFailure};
    use crate::metrics::compute_metrics;
    use crate::modes::TransportMode;
    use crate::progress::ProgressState;
    use crate::ranking::Preference;

    #[test]
    fn comparison_rows_include_failures() {
        let set: ComparisonSet = vec![
            compute_metrics(TransportMode::Driving, 10.0, 20.0),
            compute_metrics(TransportMode::Walking, 10.0, 120.0),
        ]
        .into_iter()
        .collect();
        let report = build_report(
            "A",
            "B",
            None,
            set,
            vec![ModeFailure {
                mode: TransportMode::Transit,
                message: "No route found".to_string(),
            }],
            Preference::Greenest,
            1.0,
        );
        let rendered = comparison_to_csv(&report).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "driving,true,20,1.71,33,false,");
        assert!(lines[2].starts_with("walking,true,120,0.00,"));
        assert!(lines[2].ends_with(",true,"));
        assert!(lines[3].starts_with("transit,false"));
    }

    #[test]
    fn progress_row_lists_unlocked_achievements() {
        let state = ProgressState {
            journeys: 5,
            total_kcal: 10.0,
            total_co2_saved_kg: 0.5,
            streak: 0,
            last_sustainable_date: None,
        };
        let today = chrono::NaiveDate::from_ymd_opt(2026, 5, 14).unwrap();
        let summary = ProgressSummary::as_of(&state, today);
        let rendered = progress_to_csv(&summary).unwrap();
        let row = rendered.lines().nth(1).unwrap();
        assert_eq!(row, "5,0.50,10,0,,Sprouting,Commuter");
    }
}
