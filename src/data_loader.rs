use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::codec::{Cell, FlatRow};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::rows::EntityKind;

pub fn load_rows(path: &Path, kind: EntityKind) -> ImportExportResult<Vec<FlatRow>> {
    let file = File::open(path)?;
    read_rows(file, kind)
}

/// Read tab-separated text into flat rows laid out for `kind`.
///
/// Columns the entity type does not know are ignored; columns it knows but the
/// header lacks read as absent.
pub fn read_rows<R: Read>(reader: R, kind: EntityKind) -> ImportExportResult<Vec<FlatRow>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    verify_headers(&headers, kind)?;

    let field_map: Vec<(&'static str, Option<usize>)> = kind
        .columns()
        .iter()
        .map(|column| (*column, headers.iter().position(|h| h == column)))
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: FlatRow = field_map
            .iter()
            .map(|(column, idx)| {
                let cell = idx
                    .and_then(|i| record.get(i))
                    .map(Cell::from_text)
                    .unwrap_or_default();
                (column.to_string(), cell)
            })
            .collect();
        rows.push(row);
    }

    debug!("Read {} {} rows", rows.len(), kind);
    Ok(rows)
}

/// Every required column must be in the header
pub fn verify_headers(headers: &[String], kind: EntityKind) -> ImportExportResult<()> {
    for &required in kind.required() {
        if !headers.iter().any(|h| h == required) {
            return Err(ImportExportError::MissingRequiredField(required.to_string()));
        }
    }

    for header in headers {
        if !kind.columns().contains(&header.as_str()) {
            warn!("Ignoring unknown {} column '{}'", kind, header);
        }
    }

    Ok(())
}
