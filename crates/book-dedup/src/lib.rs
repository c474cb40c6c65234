mod detect;
mod error;
mod model;
mod normalize;
mod options;
mod similarity;
mod table_read;
mod warning;

use std::path::Path;

use serde::Serialize;

pub use detect::{StudentFindings, detect_student};
pub use error::DetectError;
pub use model::{Cell, Finding, StudentBooks, StudentId, Table};
pub use normalize::{NormalizeStats, NormalizedRecords, normalize};
pub use options::{
    DEFAULT_ACTIVITY_COLUMN, DEFAULT_BLANK_CHECK_COLUMNS, DEFAULT_HEADER_ROW, DEFAULT_ID_COLUMN,
    DEFAULT_SIMILARITY_THRESHOLD, DetectOptions, SimilarityThreshold,
};
pub use similarity::ratio;
pub use table_read::{decode_text, read_table};
pub use warning::{DetectWarning, WarningCode as DetectWarningCode};

use crate::warning::WarningCode;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub duplicates: Vec<Finding>,
    pub similar: Vec<Finding>,
    pub student_count: usize,
    pub entry_count: usize,
    pub warnings: Vec<DetectWarning>,
}

impl DetectionReport {
    #[must_use]
    pub fn duplicate_messages(&self) -> Vec<String> {
        self.duplicates.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn similar_messages(&self) -> Vec<String> {
        self.similar.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.duplicates.is_empty() || !self.similar.is_empty()
    }
}

fn collect_warnings(table: &Table, records: &NormalizedRecords) -> Vec<DetectWarning> {
    let mut warnings = Vec::new();

    if table.rows.is_empty() {
        warnings.push(DetectWarning::new(
            WarningCode::EmptyTable,
            "the table has no data rows below the header",
        ));
        return warnings;
    }

    if records.stats.unassigned_rows > 0 {
        let mut warning = DetectWarning::new(
            WarningCode::UnassignedRows,
            format!(
                "{} row(s) have no student identifier and were ignored",
                records.stats.unassigned_rows
            ),
        );
        if let Some(row) = records.stats.first_unassigned_row {
            warning = warning.with_row(row);
        }
        warnings.push(warning);
    }

    if records.students.iter().all(|group| group.entries.is_empty()) {
        warnings.push(DetectWarning::new(
            WarningCode::NoEntries,
            "no book entries were found in the reading activity column",
        ));
    }

    warnings
}

/// Runs the normalizer and the duplicate detector over an already decoded table.
///
/// # Errors
///
/// Returns [`DetectError::MissingColumn`] before any grouping when a required column is
/// absent, and [`DetectError::InvalidOption`] for unusable options.
pub fn detect(table: &Table, options: &DetectOptions) -> Result<DetectionReport, DetectError> {
    options.validate()?;

    let records = normalize(table, options)?;
    let warnings = collect_warnings(table, &records);
    for warning in &warnings {
        tracing::warn!(code = ?warning.code, row = ?warning.row, "{}", warning.message);
    }

    let mut duplicates = Vec::new();
    let mut similar = Vec::new();
    for group in &records.students {
        let findings = detect_student(group, options.similarity_threshold);
        duplicates.extend(findings.duplicates);
        similar.extend(findings.similar);
    }

    let entry_count = records
        .students
        .iter()
        .map(|group| group.entries.len())
        .sum();

    tracing::debug!(
        students = records.students.len(),
        entries = entry_count,
        duplicates = duplicates.len(),
        similar = similar.len(),
        threshold = %options.similarity_threshold,
        "duplicate scan finished"
    );

    Ok(DetectionReport {
        duplicates,
        similar,
        student_count: records.students.len(),
        entry_count,
        warnings,
    })
}

/// Decodes an exported sheet (CSV in UTF-8 or EUC-KR) and runs [`detect`] on it.
///
/// # Errors
///
/// Fails when the text cannot be read as delimited records, the header row is out of
/// range, or [`detect`] fails.
pub fn detect_bytes(input: &[u8], options: &DetectOptions) -> Result<DetectionReport, DetectError> {
    let text = decode_text(input);
    let table = read_table(&text, options)?;
    detect(&table, options)
}

/// Reads an exported sheet from disk and runs [`detect_bytes`] on it.
///
/// # Errors
///
/// Fails when the file cannot be read or [`detect_bytes`] fails.
pub fn detect_path(input: &Path, options: &DetectOptions) -> Result<DetectionReport, DetectError> {
    let bytes = std::fs::read(input)?;
    detect_bytes(&bytes, options)
}

/// Returns the duplicated and similar finding lines for `table` using the default column labels.
///
/// # Errors
///
/// Returns [`DetectError::InvalidOption`] for a threshold outside `0..=1` and
/// [`DetectError::MissingColumn`] when the reading activity column is absent.
pub fn find_duplicates(
    table: &Table,
    similarity_threshold: f64,
) -> Result<(Vec<String>, Vec<String>), DetectError> {
    let options = DetectOptions {
        similarity_threshold: SimilarityThreshold::new(similarity_threshold)
            .map_err(DetectError::InvalidOption)?,
        ..DetectOptions::default()
    };
    let report = detect(table, &options)?;
    Ok((report.duplicate_messages(), report.similar_messages()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{DetectError, DetectOptions, WarningCode, detect, find_duplicates};
    use crate::model::{Cell, Table};

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            vec![
                "번호".to_string(),
                "이름".to_string(),
                "독서활동 상황".to_string(),
            ],
            rows.iter()
                .map(|row| row.iter().map(|cell| Cell::from_raw(cell)).collect())
                .collect(),
        )
    }

    #[test]
    fn reports_duplicates_per_student_only() {
        let table = table(&[
            &["1", "kim", "어린왕자, 백설공주"],
            &["", "", "어린왕자"],
            &["2", "lee", "어린왕자"],
        ]);

        let (duplicates, similar) = find_duplicates(&table, 0.7).expect("detection should run");
        assert_eq!(duplicates, vec!["Student 1: '어린왕자' is duplicated"]);
        assert!(similar.is_empty());
    }

    #[test]
    fn repeated_runs_give_identical_results() {
        let table = table(&[
            &["1", "kim", "동물농장(조지오웰), 동물 농장(조지오웰), 어린왕자"],
            &["", "", "어린왕자, 동물농장"],
        ]);

        let first = detect(&table, &DetectOptions::default()).expect("first run");
        let second = detect(&table, &DetectOptions::default()).expect("second run");
        assert_eq!(first, second);
        assert_eq!(first.student_count, 1);
        assert_eq!(first.entry_count, 5);
    }

    #[test]
    fn missing_activity_column_aborts_before_grouping() {
        let table = Table::new(
            vec!["번호".to_string(), "이름".to_string()],
            vec![vec![Cell::from("1"), Cell::from("kim")]],
        );
        let err = find_duplicates(&table, 0.7).expect_err("column is missing");
        assert!(matches!(err, DetectError::MissingColumn { .. }));
        assert_eq!(
            err.to_string(),
            "required column '독서활동 상황' is missing from the table"
        );
    }

    #[test]
    fn invalid_threshold_is_an_option_error() {
        let err = find_duplicates(&table(&[]), 1.2).expect_err("threshold out of range");
        assert!(matches!(err, DetectError::InvalidOption(_)));
    }

    #[test]
    fn warns_about_rows_without_identifier() {
        let report = detect(
            &table(&[&["", "", "orphan"], &["1", "kim", "a"]]),
            &DetectOptions::default(),
        )
        .expect("detection should run");

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, WarningCode::UnassignedRows);
        assert_eq!(report.warnings[0].row, Some(0));
    }

    #[test]
    fn empty_table_yields_no_findings_and_a_warning() {
        let report = detect(&table(&[]), &DetectOptions::default()).expect("detection should run");
        assert!(!report.has_findings());
        assert_eq!(report.warnings[0].code, WarningCode::EmptyTable);
    }
}
