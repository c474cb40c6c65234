use std::collections::HashMap;

use crate::error::DetectError;
use crate::model::{Cell, StudentBooks, StudentId, Table};
use crate::options::DetectOptions;

/// Row counters collected while cleaning the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_in: usize,
    pub blank_rows_dropped: usize,
    pub header_rows_dropped: usize,
    pub unassigned_rows: usize,
    /// Data row index of the first row left without a student after forward fill.
    pub first_unassigned_row: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecords {
    pub students: Vec<StudentBooks>,
    pub stats: NormalizeStats,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    id: usize,
    activity: usize,
}

fn resolve_columns(table: &Table, options: &DetectOptions) -> Result<Columns, DetectError> {
    let activity = table
        .column_index(&options.activity_column)
        .ok_or_else(|| DetectError::MissingColumn {
            column: options.activity_column.clone(),
        })?;
    let id = table
        .column_index(&options.id_column)
        .ok_or_else(|| DetectError::MissingColumn {
            column: options.id_column.clone(),
        })?;
    Ok(Columns { id, activity })
}

/// Copies `table`, giving every row with an empty identifier the last non-empty
/// identifier above it.
pub(crate) fn forward_fill_ids(table: &Table, id_column: usize) -> Table {
    let mut last_seen: Option<Cell> = None;
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if row.len() <= id_column {
                row.resize(id_column + 1, Cell::Empty);
            }
            if row[id_column].is_empty() {
                if let Some(previous) = &last_seen {
                    row[id_column] = previous.clone();
                }
            } else {
                last_seen = Some(row[id_column].clone());
            }
            row
        })
        .collect();

    Table::new(table.headers.clone(), rows)
}

/// Drops rows whose first `check_columns` cells are all empty (page-break residue).
pub(crate) fn drop_blank_rows(table: &Table, check_columns: usize) -> Table {
    let width = check_columns.min(table.headers.len()).max(1);
    let rows = table
        .rows
        .iter()
        .filter(|row| {
            (0..width).any(|column| row.get(column).is_some_and(|cell| !cell.is_empty()))
        })
        .cloned()
        .collect();

    Table::new(table.headers.clone(), rows)
}

/// Drops header rows re-inserted mid-table, recognised by the identifier cell repeating its label.
pub(crate) fn drop_header_echo_rows(table: &Table, id_column: usize) -> Table {
    let label = table
        .headers
        .get(id_column)
        .map(|label| label.trim().to_string())
        .unwrap_or_default();
    let rows = table
        .rows
        .iter()
        .filter(|row| {
            row.get(id_column)
                .and_then(Cell::as_text)
                .is_none_or(|value| value != label)
        })
        .cloned()
        .collect();

    Table::new(table.headers.clone(), rows)
}

/// Splits one reading-activity cell into trimmed, non-empty book entries.
pub(crate) fn split_entries(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
}

fn activity_entries(cell: &Cell) -> Vec<String> {
    match cell {
        Cell::Text(text) => split_entries(text).collect(),
        Cell::Number(_) => {
            tracing::debug!("skipping non-text reading activity cell");
            Vec::new()
        }
        Cell::Empty => Vec::new(),
    }
}

/// Groups rows by identifier in order of first appearance and collects their book entries.
pub(crate) fn group_by_student(
    table: &Table,
    id_column: usize,
    activity_column: usize,
    stats: &mut NormalizeStats,
) -> Vec<StudentBooks> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut students: Vec<StudentBooks> = Vec::new();

    for (index, row) in table.rows.iter().enumerate() {
        let Some(key) = row.get(id_column).and_then(Cell::as_text) else {
            stats.unassigned_rows += 1;
            stats.first_unassigned_row.get_or_insert(index);
            continue;
        };

        let position = *positions.entry(key.clone()).or_insert_with(|| {
            students.push(StudentBooks {
                student: StudentId(key),
                entries: Vec::new(),
            });
            students.len() - 1
        });

        if let Some(cell) = row.get(activity_column) {
            students[position].entries.extend(activity_entries(cell));
        }
    }

    students
}

/// Cleans `table` and returns each student's book entries in reading order.
///
/// # Errors
///
/// Returns [`DetectError::MissingColumn`] when the reading-activity or identifier column is absent.
pub fn normalize(table: &Table, options: &DetectOptions) -> Result<NormalizedRecords, DetectError> {
    let columns = resolve_columns(table, options)?;
    let mut stats = NormalizeStats {
        rows_in: table.row_count(),
        ..NormalizeStats::default()
    };

    let filled = forward_fill_ids(table, columns.id);

    let non_blank = drop_blank_rows(&filled, options.blank_check_columns);
    stats.blank_rows_dropped = filled.row_count() - non_blank.row_count();

    let data_rows = drop_header_echo_rows(&non_blank, columns.id);
    stats.header_rows_dropped = non_blank.row_count() - data_rows.row_count();

    let students = group_by_student(&data_rows, columns.id, columns.activity, &mut stats);

    tracing::debug!(
        rows_in = stats.rows_in,
        blank_rows_dropped = stats.blank_rows_dropped,
        header_rows_dropped = stats.header_rows_dropped,
        unassigned_rows = stats.unassigned_rows,
        students = students.len(),
        "normalized reading records"
    );

    Ok(NormalizedRecords { students, stats })
}
