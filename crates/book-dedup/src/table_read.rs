use csv::{ReaderBuilder, StringRecord};
use encoding_rs::{EUC_KR, Encoding};

use crate::error::DetectError;
use crate::model::{Cell, Table};
use crate::options::DetectOptions;

/// Decodes an exported sheet. A byte-order mark wins, then UTF-8, then EUC-KR (CP949),
/// which is what spreadsheet tools write for Korean CSV exports.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let (text, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!("input is neither UTF-8 nor clean EUC-KR; undecodable bytes were replaced");
    }
    text.into_owned()
}

/// Parses delimited text into a [`Table`], taking column labels from `options.header_row`
/// and discarding every row above it.
pub fn read_table(text: &str, options: &DetectOptions) -> Result<Table, DetectError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(text.as_bytes());

    let records = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()?;

    if options.header_row >= records.len() {
        return Err(DetectError::HeaderRowOutOfRange {
            header_row: options.header_row,
            row_count: records.len(),
        });
    }

    let mut remaining = records.into_iter().skip(options.header_row);
    let headers: Vec<String> = remaining
        .next()
        .map(|record| record.iter().map(|label| label.trim().to_string()).collect())
        .unwrap_or_default();
    let rows = remaining
        .map(|record| record.iter().map(Cell::from_raw).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    tracing::debug!(
        header_row = options.header_row,
        rows = rows.len(),
        "loaded table"
    );

    Ok(Table::new(headers, rows))
}
