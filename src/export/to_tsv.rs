use csv::WriterBuilder;
use std::io::Write;

use crate::codec::{cell, FlatRow};
use crate::errors::ImportExportResult;

/// Write `rows` as tab-separated text under a `columns` header.
///
/// Cells are written in header order; a column missing from a row is written
/// empty.
pub fn write_rows<W: Write>(
    writer: W,
    columns: &[&str],
    rows: &[FlatRow],
) -> ImportExportResult<()> {
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    // Write the header
    wtr.write_record(columns)?;

    for row in rows {
        let record = columns
            .iter()
            .map(|column| cell(row, column).to_text())
            .collect::<ImportExportResult<Vec<String>>>()?;
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Cell;

    #[test]
    fn test_write_tsv() {
        let mut row = FlatRow::new();
        row.insert("name".to_string(), Cell::Text("Jo Bloggs".to_string()));
        row.insert(
            "contact".to_string(),
            Cell::Text(r#"{"email":"jo@example.org"}"#.to_string()),
        );

        let mut buffer = Vec::new();
        write_rows(&mut buffer, &["name", "type", "contact"], &[row]).unwrap();
        let tsv = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "name\ttype\tcontact");
        assert_eq!(lines[1], "Jo Bloggs\t\t\"{\"\"email\"\":\"\"jo@example.org\"\"}\"");
    }
}
