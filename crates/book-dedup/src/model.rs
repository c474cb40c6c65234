use std::fmt::{Display, Formatter};

use serde::Serialize;

static EMPTY_CELL: Cell = Cell::Empty;

/// One decoded spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Wraps a raw cell string from delimited text. Blank text is `Empty`; anything else
    /// stays `Text` exactly as written (trimmed), since delimited text carries no cell types.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Renders the cell for keys and labels. Integral numbers drop the fraction.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(format_number(*number)),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::from_raw(value)
    }
}

/// A decoded table: one header row plus data rows, which may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Finds a column by its label, ignoring surrounding whitespace in the header.
    #[must_use]
    pub fn column_index(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.headers.iter().position(|header| header.trim() == label)
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// All book entries of one student, in the order they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentBooks {
    pub student: StudentId,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Duplicate {
        student: StudentId,
        entry: String,
    },
    Similar {
        student: StudentId,
        entry: String,
        seen: String,
        score: f64,
    },
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { student, entry } => {
                write!(f, "Student {student}: '{entry}' is duplicated")
            }
            Self::Similar {
                student,
                entry,
                seen,
                ..
            } => write!(f, "Student {student}: '{entry}' and '{seen}' are similar"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Finding, StudentId, Table};

    #[test]
    fn classifies_raw_cells() {
        assert_eq!(Cell::from_raw("   "), Cell::Empty);
        assert_eq!(Cell::from_raw(" 12 "), Cell::Text("12".to_string()));
        assert_eq!(Cell::from_raw("007"), Cell::Text("007".to_string()));
        assert_eq!(Cell::from_raw("번호"), Cell::Text("번호".to_string()));
        assert_eq!(Cell::from_raw("inf"), Cell::Text("inf".to_string()));
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(Cell::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(Cell::Empty.as_text(), None);
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let table = Table::new(
            vec!["a".to_string(), " b ".to_string()],
            vec![vec![Cell::from("x")]],
        );
        assert_eq!(table.column_index("b"), Some(1));
        assert!(table.cell(0, 1).is_empty());
        assert!(table.cell(5, 0).is_empty());
    }

    #[test]
    fn renders_finding_messages() {
        let duplicate = Finding::Duplicate {
            student: StudentId("7".to_string()),
            entry: "어린왕자".to_string(),
        };
        let similar = Finding::Similar {
            student: StudentId("7".to_string()),
            entry: "동물 농장".to_string(),
            seen: "동물농장".to_string(),
            score: 0.9,
        };

        assert_eq!(duplicate.to_string(), "Student 7: '어린왕자' is duplicated");
        assert_eq!(
            similar.to_string(),
            "Student 7: '동물 농장' and '동물농장' are similar"
        );
    }
}
