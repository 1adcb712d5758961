use crate::history::HistoryEntry;
use crate::inputs::format_label;
use crate::pipeline::FeatureVector;

/// Attributes shown on the profile meters, with the UI ranges used to
/// normalize them to 0-100.
const PROFILE_RANGES: [(&str, f64, f64); 3] = [
    ("age", 15.0, 45.0),
    ("bmi", 15.0, 40.0),
    ("fifa_rating", 40.0, 100.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct AttributionRow {
    pub label: String,
    pub value: f64,
    pub bar: String,
    /// true when the feature pushed the prediction toward injury.
    pub pushes_up: bool,
}

/// Signed attribution bars, strongest contribution first. Bar length is
/// proportional to |value| against the largest magnitude in the report.
pub fn attribution_rows(attributions: &[(String, f64)], width: usize) -> Vec<AttributionRow> {
    let max_abs = attributions
        .iter()
        .map(|(_, v)| v.abs())
        .fold(0.0_f64, f64::max);

    let mut rows: Vec<AttributionRow> = attributions
        .iter()
        .map(|(name, value)| {
            let frac = if max_abs > 0.0 { value.abs() / max_abs } else { 0.0 };
            let cells = ((frac * width as f64).round() as usize).min(width);
            AttributionRow {
                label: format_label(name),
                value: *value,
                bar: "█".repeat(cells),
                pushes_up: *value > 0.0,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileMeter {
    pub label: String,
    pub pct: u16,
}

/// Player attribute profile normalized to 0-100 over the widget ranges.
/// Features absent from the schema are skipped.
pub fn profile_meters(features: &FeatureVector) -> Vec<ProfileMeter> {
    PROFILE_RANGES
        .iter()
        .filter_map(|&(name, lo, hi)| {
            let value = features.get(name)?;
            let pct = (100.0 * (value - lo) / (hi - lo)).clamp(0.0, 100.0);
            Some(ProfileMeter {
                label: format_label(name),
                pct: pct.round() as u16,
            })
        })
        .collect()
}

/// Saved probabilities as sparkline-ready integers (percent points).
pub fn history_series(entries: &[HistoryEntry]) -> Vec<u64> {
    entries
        .iter()
        .map(|e| (e.probability.clamp(0.0, 1.0) * 100.0).round() as u64)
        .collect()
}

pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
