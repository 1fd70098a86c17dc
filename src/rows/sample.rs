use chrono::NaiveDate;
use serde_json::Value;

use super::{assemble, EntityKind, TableRow};
use crate::codec::{self, Cell, FlatRow, JsonMap, Promoted};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::geometry;
use crate::vocab::{DateResolution, LocationType, SamplePermission, SampleType};

pub const MAX_SAMPLE_ID_LEN: usize = 10;

const LOCATION_SUPPORT: &[Promoted] = &[
    Promoted::number("latitude"),
    Promoted::number("longitude"),
    Promoted::text("street_address"),
    Promoted::text("suburb"),
    Promoted::text("state"),
    Promoted::text("country"),
];

/// An isolate or other biological sample
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub id: String,
    pub names: Vec<String>,
    pub sample_type: SampleType,
    pub date: Option<NaiveDate>,
    pub date_resolution: Option<DateResolution>,
    pub details: JsonMap,
    pub permission: SamplePermission,
    /// Parent sample ids in declared order
    pub parents: Vec<String>,
    pub geom: Option<String>,
    pub location_type: Option<LocationType>,
    pub location_support: JsonMap,
}

impl SampleRecord {
    pub fn latitude(&self) -> Option<f64> {
        self.location_support.get("latitude").and_then(Value::as_f64)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location_support.get("longitude").and_then(Value::as_f64)
    }
}

pub fn validate_sample_id(column: &str, id: &str) -> ImportExportResult<()> {
    if id.chars().count() > MAX_SAMPLE_ID_LEN {
        return Err(ImportExportError::malformed(
            column,
            id,
            format!("sample ids are at most {} characters", MAX_SAMPLE_ID_LEN),
        ));
    }
    Ok(())
}

impl TableRow for SampleRecord {
    const KIND: EntityKind = EntityKind::Samples;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        if let Some(geom) = &self.geom {
            geometry::validate_geometry("geom", geom)?;
        }
        let (promoted, support) = codec::split_promoted(&self.location_support, LOCATION_SUPPORT);

        let mut cells = vec![
            Cell::Text(self.id.clone()),
            codec::encode_list(&self.names),
            codec::encode_enum(self.sample_type),
            self.date.map(codec::encode_date).unwrap_or_default(),
            self.date_resolution.map(codec::encode_enum).unwrap_or_default(),
            codec::encode_map_cell(&self.details)?,
            codec::encode_enum(self.permission),
            codec::encode_list(&self.parents),
            Cell::from(self.geom.clone()),
            self.location_type.map(codec::encode_enum).unwrap_or_default(),
        ];
        cells.extend(promoted);
        cells.push(codec::encode_map_cell(&support)?);

        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        let id = codec::required_text(row, "id")?;
        validate_sample_id("id", &id)?;

        let location_support = codec::merge_promoted(row, "location_support", LOCATION_SUPPORT)?;
        let mut record = SampleRecord {
            id,
            names: codec::decode_list("names", codec::cell(row, "names"))?,
            sample_type: codec::required_enum(row, "type")?,
            date: codec::optional_date(row, "date")?,
            date_resolution: codec::optional_enum(row, "date_resolution")?,
            details: codec::decode_map("details", codec::cell(row, "details"))?,
            permission: codec::required_enum(row, "permission")?,
            parents: codec::decode_list("parents", codec::cell(row, "parents"))?,
            geom: None,
            location_type: codec::optional_enum(row, "location_type")?,
            location_support,
        };
        record.geom = geometry::resolve_geometry(
            codec::optional_text(row, "geom")?,
            record.latitude(),
            record.longitude(),
        );
        Ok(record)
    }
}
