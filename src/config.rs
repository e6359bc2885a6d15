//! Overlay configuration.

/// Formatting and behavior knobs of the stats overlay.
#[derive(Clone, Debug)]
pub struct StatsConfig {
    /// Decimal places used by byte formatting.
    pub decimals: usize,
    /// Digit group separator for counters, e.g. `1,234,567`.
    pub thousands_separator: char,
    /// Shown in every field until the first load completes.
    pub loading_placeholder: String,
    /// Shown when a value could not be computed.
    pub missing_placeholder: String,
    /// Shown as file size when the size lookup fails.
    pub unknown_size: String,
    pub start_visible: bool,
    /// Whether load cycles look up the asset's file size at all.
    pub fetch_file_size: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            thousands_separator: ',',
            loading_placeholder: "...".to_string(),
            missing_placeholder: "-".to_string(),
            unknown_size: "N/A".to_string(),
            start_visible: false,
            fetch_file_size: true,
        }
    }
}
