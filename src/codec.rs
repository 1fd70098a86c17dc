//! Scalar codec for flat rows.
//!
//! A flat row maps column names to [`Cell`]s. Text read from a file is always
//! [`Cell::Text`] or [`Cell::Absent`]; rows assembled in memory may already
//! carry structured lists or maps, which the decoders pass through untouched.
//!
//! Conventions:
//! - lists are `;`-joined, an empty list is an absent cell (never `""`)
//! - free-form maps are JSON objects
//! - vocabulary members are written by name
//! - dates are `%Y-%m-%d`, timestamps `%Y-%m-%dT%H:%M:%S`

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::str::FromStr;

use crate::errors::{ImportExportError, ImportExportResult};
use crate::vocab::Vocabulary;

pub type JsonMap = serde_json::Map<String, Value>;

/// One flat record, keyed by column name in column order
pub type FlatRow = IndexMap<String, Cell>;

pub const LIST_SEPARATOR: char = ';';
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATETIME_FALLBACK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Markers that mean "not available" when reading text cells
const ABSENT_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "None", "<NA>"];

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Absent,
    Text(String),
    List(Vec<String>),
    Map(JsonMap),
}

impl Cell {
    /// Cell for raw file text, mapping the absent markers to [`Cell::Absent`]
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if ABSENT_MARKERS.contains(&trimmed) {
            Cell::Absent
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text written to a file for this cell; absent becomes an empty field
    pub fn to_text(&self) -> ImportExportResult<String> {
        Ok(match self {
            Cell::Absent => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::List(values) => values.join(&LIST_SEPARATOR.to_string()),
            Cell::Map(map) => encode_map(map)?,
        })
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or_default()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Cell for `column`, absent when the row lacks the column entirely
pub fn cell<'a>(row: &'a FlatRow, column: &str) -> &'a Cell {
    const ABSENT: &Cell = &Cell::Absent;
    row.get(column).unwrap_or(ABSENT)
}

/// Text of an optional scalar column
pub fn optional_text(row: &FlatRow, column: &str) -> ImportExportResult<Option<String>> {
    match cell(row, column) {
        Cell::Absent => Ok(None),
        Cell::Text(text) => Ok(Some(text.clone())),
        other => Err(ImportExportError::malformed(
            column,
            format!("{:?}", other),
            "expected a scalar value",
        )),
    }
}

/// Text of a required scalar column
pub fn required_text(row: &FlatRow, column: &str) -> ImportExportResult<String> {
    optional_text(row, column)?
        .ok_or_else(|| ImportExportError::MissingRequiredField(column.to_string()))
}

pub fn encode_list<S: AsRef<str>>(values: &[S]) -> Cell {
    if values.is_empty() {
        Cell::Absent
    } else {
        let joined: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        Cell::Text(joined.join(&LIST_SEPARATOR.to_string()))
    }
}

/// Split a list cell; blank elements are dropped
pub fn decode_list(column: &str, cell: &Cell) -> ImportExportResult<Vec<String>> {
    match cell {
        Cell::Absent => Ok(Vec::new()),
        Cell::List(values) => Ok(values.clone()),
        Cell::Text(text) => Ok(text
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()),
        Cell::Map(_) => Err(ImportExportError::malformed(
            column,
            "<map>",
            "expected a list",
        )),
    }
}

pub fn encode_map(map: &JsonMap) -> ImportExportResult<String> {
    Ok(serde_json::to_string(map)?)
}

/// Map cell for a record field; an empty map is written as an absent cell
pub fn encode_map_cell(map: &JsonMap) -> ImportExportResult<Cell> {
    if map.is_empty() {
        Ok(Cell::Absent)
    } else {
        Ok(Cell::Text(encode_map(map)?))
    }
}

pub fn decode_map(column: &str, cell: &Cell) -> ImportExportResult<JsonMap> {
    match cell {
        Cell::Absent => Ok(JsonMap::new()),
        Cell::Map(map) => Ok(map.clone()),
        Cell::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(Value::Null) => Ok(JsonMap::new()),
            Ok(_) => Err(ImportExportError::malformed(
                column,
                text.as_str(),
                "expected a JSON object",
            )),
            Err(e) => Err(ImportExportError::malformed(column, text.as_str(), e.to_string())),
        },
        Cell::List(_) => Err(ImportExportError::malformed(
            column,
            "<list>",
            "expected a JSON object",
        )),
    }
}

pub fn encode_enum<V: Vocabulary>(member: V) -> Cell {
    Cell::Text(member.name().to_string())
}

pub fn decode_enum<V: Vocabulary>(term: &str) -> ImportExportResult<V> {
    V::from_name(term).ok_or_else(|| ImportExportError::UnknownVocabularyTerm {
        vocabulary: V::NAME,
        term: term.to_string(),
    })
}

pub fn optional_enum<V: Vocabulary>(row: &FlatRow, column: &str) -> ImportExportResult<Option<V>> {
    optional_text(row, column)?
        .map(|term| decode_enum(&term))
        .transpose()
}

pub fn required_enum<V: Vocabulary>(row: &FlatRow, column: &str) -> ImportExportResult<V> {
    decode_enum(&required_text(row, column)?)
}

/// Each list element must be a member of the vocabulary
pub fn decode_enum_list<V: Vocabulary>(column: &str, cell: &Cell) -> ImportExportResult<Vec<V>> {
    decode_list(column, cell)?
        .iter()
        .map(|term| decode_enum(term))
        .collect()
}

pub fn encode_enum_list<V: Vocabulary>(members: &[V]) -> Cell {
    let names: Vec<&str> = members.iter().map(|m| m.name()).collect();
    encode_list(&names)
}

pub fn encode_date(date: NaiveDate) -> Cell {
    Cell::Text(date.format(DATE_FORMAT).to_string())
}

pub fn decode_date(column: &str, text: &str) -> ImportExportResult<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
        ImportExportError::malformed(column, text, format!("expected YYYY-MM-DD ({})", e))
    })
}

pub fn optional_date(row: &FlatRow, column: &str) -> ImportExportResult<Option<NaiveDate>> {
    optional_text(row, column)?
        .map(|text| decode_date(column, &text))
        .transpose()
}

pub fn encode_datetime(datetime: NaiveDateTime) -> Cell {
    Cell::Text(datetime.format(DATETIME_FORMAT).to_string())
}

pub fn decode_datetime(column: &str, text: &str) -> ImportExportResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, DATETIME_FALLBACK_FORMAT))
        .map_err(|e| {
            ImportExportError::malformed(
                column,
                text,
                format!("expected YYYY-MM-DDTHH:MM:SS ({})", e),
            )
        })
}

pub fn optional_datetime(row: &FlatRow, column: &str) -> ImportExportResult<Option<NaiveDateTime>> {
    optional_text(row, column)?
        .map(|text| decode_datetime(column, &text))
        .transpose()
}

pub fn decode_number<T>(column: &str, text: &str) -> ImportExportResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.parse::<T>()
        .map_err(|e| ImportExportError::malformed(column, text, e.to_string()))
}

pub fn optional_number<T>(row: &FlatRow, column: &str) -> ImportExportResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_text(row, column)?
        .map(|text| decode_number(column, &text))
        .transpose()
}

pub fn required_number<T>(row: &FlatRow, column: &str) -> ImportExportResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    decode_number(column, &required_text(row, column)?)
}

/// How a promoted column's text maps onto a JSON value in the generic map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotedKind {
    Text,
    Number,
    List,
}

/// A column that has its own cell but lives inside a generic map on the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promoted {
    pub column: &'static str,
    pub kind: PromotedKind,
}

impl Promoted {
    pub const fn text(column: &'static str) -> Self {
        Promoted {
            column,
            kind: PromotedKind::Text,
        }
    }

    pub const fn number(column: &'static str) -> Self {
        Promoted {
            column,
            kind: PromotedKind::Number,
        }
    }

    pub const fn list(column: &'static str) -> Self {
        Promoted {
            column,
            kind: PromotedKind::List,
        }
    }

    fn decode(&self, cell: &Cell) -> ImportExportResult<Option<Value>> {
        match (self.kind, cell) {
            (_, Cell::Absent) => Ok(None),
            (PromotedKind::List, cell) => {
                let values = decode_list(self.column, cell)?;
                if values.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Value::from(values)))
                }
            }
            (PromotedKind::Number, Cell::Text(text)) => Ok(Some(parse_json_number(self.column, text)?)),
            (PromotedKind::Text, Cell::Text(text)) => Ok(Some(Value::String(text.clone()))),
            (_, other) => Err(ImportExportError::malformed(
                self.column,
                format!("{:?}", other),
                "expected a scalar value",
            )),
        }
    }

    /// The cell for `value`, or `None` when the column could not carry it back
    /// unchanged and the key has to stay in the map.
    fn encode(&self, value: &Value) -> Option<Cell> {
        match (self.kind, value) {
            (PromotedKind::Text, Value::String(text)) if reads_back(text) => {
                Some(Cell::Text(text.clone()))
            }
            (PromotedKind::Number, Value::Number(number)) if number.is_i64() || number.is_f64() => {
                Some(Cell::Text(number.to_string()))
            }
            (PromotedKind::List, Value::Array(items)) if !items.is_empty() => {
                let values = items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) if reads_back(text) && !text.contains(LIST_SEPARATOR) => {
                            Some(text.clone())
                        }
                        _ => None,
                    })
                    .collect::<Option<Vec<String>>>()?;
                Some(encode_list(&values))
            }
            _ => None,
        }
    }
}

/// Text that a cell reads back as itself, neither trimmed nor taken as absent
fn reads_back(text: &str) -> bool {
    matches!(Cell::from_text(text), Cell::Text(ref read) if read == text)
}

fn parse_json_number(column: &str, text: &str) -> ImportExportResult<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Ok(Value::Number(integer.into()));
    }
    let float = decode_number::<f64>(column, text)?;
    Number::from_f64(float)
        .map(Value::Number)
        .ok_or_else(|| ImportExportError::malformed(column, text, "not a finite number"))
}

/// Decode a generic map column and overlay the promoted columns onto it.
///
/// A promoted column that has a cell wins over the same key in the map.
pub fn merge_promoted(
    row: &FlatRow,
    map_column: &str,
    promoted: &[Promoted],
) -> ImportExportResult<JsonMap> {
    let mut map = decode_map(map_column, cell(row, map_column))?;
    for field in promoted {
        if let Some(value) = field.decode(cell(row, field.column))? {
            map.insert(field.column.to_string(), value);
        }
    }
    Ok(map)
}

/// Inverse of [`merge_promoted`]: pull promoted keys out of `map`.
///
/// Returns one cell per promoted field, in `promoted` order, and the remaining
/// map. A value the promoted column cannot represent (a number under a text
/// column, a string under a number column, nested data) stays in the map so
/// its JSON type survives.
pub fn split_promoted(map: &JsonMap, promoted: &[Promoted]) -> (Vec<Cell>, JsonMap) {
    let mut remainder = map.clone();
    let mut cells = Vec::with_capacity(promoted.len());
    for field in promoted {
        let cell = match map.get(field.column).and_then(|value| field.encode(value)) {
            Some(cell) => {
                remainder.remove(field.column);
                cell
            }
            None => Cell::Absent,
        };
        cells.push(cell);
    }
    (cells, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{DateResolution, PesticideType};
    use serde_json::json;

    fn row(cells: &[(&str, Cell)]) -> FlatRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_absent_markers() {
        for marker in ["", "  ", "NA", "NaN", "null", "None"] {
            assert_eq!(Cell::from_text(marker), Cell::Absent, "{:?}", marker);
        }
        assert_eq!(Cell::from_text(" 0 "), Cell::Text("0".to_string()));
    }

    #[test]
    fn test_list_codec() {
        assert_eq!(encode_list::<String>(&[]), Cell::Absent);
        let names = vec!["Ptr 1".to_string(), "isolate-a".to_string()];
        let encoded = encode_list(&names);
        assert_eq!(encoded, Cell::Text("Ptr 1;isolate-a".to_string()));
        assert_eq!(decode_list("names", &encoded).unwrap(), names);
        assert!(decode_list("names", &Cell::Absent).unwrap().is_empty());
        assert_eq!(
            decode_list("names", &Cell::Text(" a ; b;;".to_string())).unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(
            decode_list("names", &Cell::List(vec!["x;y".to_string()])).unwrap(),
            vec!["x;y"]
        );
    }

    #[test]
    fn test_map_codec() {
        let map = json!({"host": "wheat", "passage": 3, "nested": {"a": [1, 2]}});
        let map = map.as_object().unwrap().clone();
        let text = encode_map(&map).unwrap();
        assert_eq!(decode_map("details", &Cell::Text(text)).unwrap(), map);
        assert!(decode_map("details", &Cell::Absent).unwrap().is_empty());
        assert_eq!(decode_map("details", &Cell::Map(map.clone())).unwrap(), map);
        assert_eq!(encode_map_cell(&JsonMap::new()).unwrap(), Cell::Absent);
    }

    #[test]
    fn test_map_rejects_non_objects() {
        let err = decode_map("details", &Cell::Text("[1, 2]".to_string())).unwrap_err();
        assert!(matches!(err, ImportExportError::MalformedField { ref field, .. } if field == "details"));
        let err = decode_map("details", &Cell::Text("{oops".to_string())).unwrap_err();
        assert!(matches!(err, ImportExportError::MalformedField { .. }));
    }

    #[test]
    fn test_enum_codec() {
        assert_eq!(encode_enum(DateResolution::Month), Cell::Text("month".to_string()));
        assert_eq!(decode_enum::<DateResolution>("month").unwrap(), DateResolution::Month);
        let err = decode_enum::<DateResolution>("Month").unwrap_err();
        assert!(matches!(err, ImportExportError::UnknownVocabularyTerm { vocabulary: "DateResolution", .. }));

        let types = decode_enum_list::<PesticideType>(
            "pesticide_type",
            &Cell::Text("fungicide;herbicide".to_string()),
        )
        .unwrap();
        assert_eq!(types, vec![PesticideType::Fungicide, PesticideType::Herbicide]);
        assert_eq!(encode_enum_list(&types), Cell::Text("fungicide;herbicide".to_string()));
    }

    #[test]
    fn test_dates() {
        let date = decode_date("date", "2019-07-01").unwrap();
        assert_eq!(encode_date(date), Cell::Text("2019-07-01".to_string()));
        assert!(matches!(
            decode_date("date", "01/07/2019"),
            Err(ImportExportError::MalformedField { .. })
        ));
        let dt = decode_datetime("datetime", "2019-07-01 13:45:00").unwrap();
        assert_eq!(encode_datetime(dt), Cell::Text("2019-07-01T13:45:00".to_string()));
    }

    #[test]
    fn test_required_fields() {
        let r = row(&[("name", Cell::Absent)]);
        assert!(matches!(
            required_text(&r, "name"),
            Err(ImportExportError::MissingRequiredField(ref f)) if f == "name"
        ));
        assert!(matches!(
            required_text(&r, "taxid"),
            Err(ImportExportError::MissingRequiredField(ref f)) if f == "taxid"
        ));
        let r = row(&[("taxid", Cell::Text("x12".to_string()))]);
        assert!(matches!(
            required_number::<i64>(&r, "taxid"),
            Err(ImportExportError::MalformedField { .. })
        ));
    }

    const PROMOTED: &[Promoted] = &[
        Promoted::number("latitude"),
        Promoted::text("state"),
        Promoted::list("aliases"),
    ];

    #[test]
    fn test_explicit_cells_win_over_map() {
        let r = row(&[
            ("latitude", Cell::Text("-31.95".to_string())),
            ("state", Cell::Text("WA".to_string())),
            ("aliases", Cell::Text("Field 7;North".to_string())),
            (
                "support",
                Cell::Text(r#"{"state": "NSW", "postcode": "6000"}"#.to_string()),
            ),
        ]);
        let merged = merge_promoted(&r, "support", PROMOTED).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"latitude": -31.95, "state": "WA", "aliases": ["Field 7", "North"], "postcode": "6000"})
        );
    }

    #[test]
    fn test_split_does_not_duplicate_promoted_keys() {
        let map = json!({"latitude": 115, "state": "WA", "postcode": "6000"});
        let (cells, remainder) = split_promoted(map.as_object().unwrap(), PROMOTED);
        assert_eq!(
            cells,
            vec![
                Cell::Text("115".to_string()),
                Cell::Text("WA".to_string()),
                Cell::Absent
            ]
        );
        assert_eq!(Value::Object(remainder.clone()), json!({"postcode": "6000"}));

        let mut r = row(&[("support", encode_map_cell(&remainder).unwrap())]);
        for (field, cell) in PROMOTED.iter().zip(cells) {
            r.insert(field.column.to_string(), cell);
        }
        let merged = merge_promoted(&r, "support", PROMOTED).unwrap();
        assert_eq!(&merged, map.as_object().unwrap());
    }

    #[test]
    fn test_values_of_another_type_stay_in_the_map() {
        let map = json!({
            "latitude": "unknown",
            "state": 6,
            "aliases": ["North", {"code": 7}],
            "postcode": "6000"
        });
        let (cells, remainder) = split_promoted(map.as_object().unwrap(), PROMOTED);
        assert_eq!(cells, vec![Cell::Absent, Cell::Absent, Cell::Absent]);
        assert_eq!(Value::Object(remainder.clone()), map);

        let r = row(&[("support", encode_map_cell(&remainder).unwrap())]);
        let merged = merge_promoted(&r, "support", PROMOTED).unwrap();
        assert_eq!(Value::Object(merged), map);
    }

    #[test]
    fn test_text_that_would_not_read_back_stays_in_the_map() {
        let map = json!({"state": "NA", "aliases": ["a;b"]});
        let (cells, remainder) = split_promoted(map.as_object().unwrap(), PROMOTED);
        assert_eq!(cells, vec![Cell::Absent, Cell::Absent, Cell::Absent]);
        assert_eq!(remainder.len(), 2);
    }
}
