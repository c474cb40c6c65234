use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::DetectError;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_ID_COLUMN: &str = "번호";
pub const DEFAULT_ACTIVITY_COLUMN: &str = "독서활동 상황";
pub const DEFAULT_HEADER_ROW: usize = 3;
pub const DEFAULT_BLANK_CHECK_COLUMNS: usize = 7;

/// Minimum similarity ratio, within `0.0..=1.0`, for two entries to be reported as similar.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SimilarityThreshold(f64);

impl SimilarityThreshold {
    /// # Errors
    ///
    /// Returns a message when `value` is not a finite number in `0.0..=1.0`.
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(format!(
                "similarity threshold must be within 0..=1, got {value}"
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl Display for SimilarityThreshold {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SimilarityThreshold {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("invalid similarity threshold: '{raw}'"))?;
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectOptions {
    pub similarity_threshold: SimilarityThreshold,
    pub id_column: String,
    pub activity_column: String,
    /// Zero-based row of the raw export that holds the column labels.
    pub header_row: usize,
    /// Leading columns inspected when discarding page-break rows.
    pub blank_check_columns: usize,
    pub delimiter: u8,
}

impl DetectOptions {
    pub(crate) fn validate(&self) -> Result<(), DetectError> {
        if self.blank_check_columns == 0 {
            return Err(DetectError::InvalidOption(
                "blank_check_columns must be at least 1".to_string(),
            ));
        }
        if self.id_column.trim().is_empty() || self.activity_column.trim().is_empty() {
            return Err(DetectError::InvalidOption(
                "column labels must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: SimilarityThreshold::default(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            activity_column: DEFAULT_ACTIVITY_COLUMN.to_string(),
            header_row: DEFAULT_HEADER_ROW,
            blank_check_columns: DEFAULT_BLANK_CHECK_COLUMNS,
            delimiter: b',',
        }
    }
}
