use once_cell::sync::Lazy;
use regex::Regex;

const METERS_PER_KM: f64 = 1000.0;
const MINUTES_PER_HOUR: u32 = 60;

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d[\d,]*(?:\.\d+)?|\.\d+)").expect("valid number regex"));
static HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:hours?|hrs?)\b").expect("valid hours regex"));
static MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:mins?|minutes?)\b").expect("valid minutes regex"));

/// Parses provider distance text ("12.3 km", "800 m") into kilometers.
///
/// Returns `f64::NAN` for any other unit or an unreadable numeral; callers
/// check `is_finite` before using the value.
pub fn parse_distance(text: &str) -> f64 {
    let trimmed = text.trim().to_ascii_lowercase();
    if let Some(value) = trimmed.strip_suffix("km") {
        return leading_number(value);
    }
    if let Some(value) = trimmed.strip_suffix('m') {
        return leading_number(value) / METERS_PER_KM;
    }
    f64::NAN
}

/// Parses provider duration text ("1 hour 10 mins") into whole minutes.
///
/// Hour and minute components are matched independently. No match yields 0,
/// so a zero here does not prove the route took no time.
pub fn parse_duration(text: &str) -> u32 {
    let hours = capture_u32(&HOURS, text);
    let minutes = capture_u32(&MINUTES, text);
    hours
        .saturating_mul(MINUTES_PER_HOUR)
        .saturating_add(minutes)
}

pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * METERS_PER_KM)
    } else {
        format!("{km:.1} km")
    }
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / MINUTES_PER_HOUR;
    let mins = minutes % MINUTES_PER_HOUR;
    let hour_part = match hours {
        0 => None,
        1 => Some("1 hour".to_string()),
        n => Some(format!("{n} hours")),
    };
    let min_part = match mins {
        1 => "1 min".to_string(),
        n => format!("{n} mins"),
    };
    match hour_part {
        Some(h) if mins == 0 => h,
        Some(h) => format!("{h} {min_part}"),
        None => min_part,
    }
}

fn leading_number(text: &str) -> f64 {
    LEADING_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn capture_u32(pattern: &Regex, text: &str) -> u32 {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kilometers_and_meters() {
        assert!((parse_distance("12.3 km") - 12.3).abs() < 1e-9);
        assert!((parse_distance("800 m") - 0.8).abs() < 1e-9);
        assert!((parse_distance("1,234 km") - 1234.0).abs() < 1e-9);
        assert!((parse_distance(" 5 KM ") - 5.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_units_and_garbage_are_nan() {
        assert!(parse_distance("3.1 mi").is_nan());
        assert!(parse_distance("km").is_nan());
        assert!(parse_distance("far km").is_nan());
        assert!(parse_distance("").is_nan());
    }

    #[test]
    fn duration_components_are_order_insensitive() {
        assert_eq!(parse_duration("1 hour 10 mins"), 70);
        assert_eq!(parse_duration("10 mins 2 hours"), 130);
        assert_eq!(parse_duration("20 mins"), 20);
        assert_eq!(parse_duration("3 hours"), 180);
        assert_eq!(parse_duration("1 min"), 1);
    }

    #[test]
    fn unmatched_duration_is_zero() {
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("soon"), 0);
    }

    #[test]
    fn formatted_text_parses_back() {
        assert_eq!(format_duration(70), "1 hour 10 mins");
        assert_eq!(format_duration(120), "2 hours");
        assert_eq!(parse_duration(&format_duration(95)), 95);
        assert_eq!(format_distance(0.8), "800 m");
        assert!((parse_distance(&format_distance(12.34)) - 12.3).abs() < 1e-9);
    }
}
