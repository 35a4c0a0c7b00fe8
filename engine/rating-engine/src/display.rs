//! Display helpers shared by the JSON and HTML renderers

/// Placeholder for a rating that is absent or not a number
pub const NOT_AVAILABLE: &str = "N/A";

/// Cell colors from best to worst, one per 5-point percentile band
const PERCENTILE_BANDS: [(u8, &str); 19] = [
    (96, "#58c36c"),
    (91, "#6aca7c"),
    (86, "#7cd08b"),
    (81, "#8dd69b"),
    (76, "#9fddaa"),
    (71, "#b0e3ba"),
    (66, "#c2e9c9"),
    (61, "#d4f0d9"),
    (56, "#e5f6e8"),
    (51, "#f7fcf8"),
    (46, "#fdf5f4"),
    (41, "#fbe1df"),
    (36, "#f9cdc9"),
    (31, "#f7b9b4"),
    (26, "#f5a59f"),
    (21, "#f2928a"),
    (16, "#f07e74"),
    (11, "#ee6a5f"),
    (6, "#ec564a"),
];

const BOTTOM_BAND: &str = "#ea4335";

/// Format a rating to one decimal place
pub fn format_rating(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.1}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Background color for a percentile, green at the top and red at the bottom
pub fn percentile_color(percentile: u8) -> &'static str {
    PERCENTILE_BANDS
        .iter()
        .find(|(floor, _)| percentile >= *floor)
        .map(|(_, color)| *color)
        .unwrap_or(BOTTOM_BAND)
}
