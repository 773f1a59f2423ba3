use std::collections::BTreeMap;

/// Value the server reports once an item is fully encoded and downloadable.
pub const TERMINAL_MARKER: &str = "100";

/// Snapshot of the server's status endpoint, keyed by item name.
///
/// Replaced wholesale on every successful poll. The ordered map only makes
/// render order stable; callers must not rely on it.
pub type StatusMap = BTreeMap<String, Progress>;

/// Parsed completion value of one status entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The terminal marker; the item can be downloaded.
    Complete,
    /// Numeric percentage, clamped into `0..=100`.
    Percent(u8),
    /// Value that is neither the marker nor a number. Kept verbatim for display.
    Unparsed(String),
}

impl Progress {
    /// Interprets a string value such as `"42"`, `"42.5"` or `"42%"`.
    pub fn from_text(raw: &str) -> Self {
        if raw == TERMINAL_MARKER {
            return Progress::Complete;
        }
        let trimmed = raw.trim();
        let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        match numeric.parse::<f64>() {
            Ok(value) if value.is_finite() => Progress::Percent(clamp_percent(value)),
            _ => Progress::Unparsed(raw.to_string()),
        }
    }

    /// Interprets an integer value; only `100` is terminal.
    pub fn from_integer(value: i64) -> Self {
        if value == 100 {
            Progress::Complete
        } else {
            Progress::Percent(value.clamp(0, 100) as u8)
        }
    }

    /// Interprets a floating point value. Never terminal, even at `100.0`.
    pub fn from_float(value: f64) -> Self {
        if value.is_finite() {
            Progress::Percent(clamp_percent(value))
        } else {
            Progress::Unparsed(value.to_string())
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Progress::Complete)
    }

    /// Bar position on a `0..=100` scale.
    pub fn bar_value(&self) -> u8 {
        match self {
            Progress::Complete => 100,
            Progress::Percent(value) => *value,
            Progress::Unparsed(_) => 0,
        }
    }

    /// Text shown next to the bar.
    pub fn percent_text(&self) -> String {
        match self {
            Progress::Complete => format!("{TERMINAL_MARKER}%"),
            Progress::Percent(value) => format!("{value}%"),
            Progress::Unparsed(raw) => raw.clone(),
        }
    }
}

fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).floor() as u8
}

/// Builds download link targets as `{prefix}{percent-encoded name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRoute {
    prefix: String,
}

impl DownloadRoute {
    pub const DEFAULT_PREFIX: &'static str = "/encoding/";

    /// The prefix is used as given; no separator is inserted before the name.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn href_for(&self, name: &str) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(name))
    }
}

impl Default for DownloadRoute {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}
