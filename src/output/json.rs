use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::progress::{ProgressState, ProgressSummary};

    #[test]
    fn progress_uses_camel_case_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 14).unwrap();
        let summary = ProgressSummary::as_of(&ProgressState::default(), today);
        let rendered = render_json(&summary).unwrap();
        assert!(rendered.contains("\"totalCo2SavedKg\""));
        assert!(rendered.contains("\"stage\": \"seedling\""));
    }
}
