use serde_json::Value;

use super::{assemble, EntityKind, TableRow};
use crate::codec::{self, Cell, FlatRow, JsonMap, Promoted};
use crate::errors::ImportExportResult;
use crate::geometry;
use crate::vocab::LocationType;

const SUPPORT: &[Promoted] = &[
    Promoted::text("name"),
    Promoted::list("aliases"),
    Promoted::number("latitude"),
    Promoted::number("longitude"),
    Promoted::text("street_address"),
    Promoted::text("suburb"),
    Promoted::text("state"),
    Promoted::text("country"),
];

/// A place; everything but its type and geometry lives in `support`
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub location_type: LocationType,
    pub geom: Option<String>,
    pub support: JsonMap,
}

impl LocationRecord {
    pub fn name(&self) -> Option<&str> {
        self.support.get("name").and_then(Value::as_str)
    }
}

impl TableRow for LocationRecord {
    const KIND: EntityKind = EntityKind::Locations;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        if let Some(geom) = &self.geom {
            geometry::validate_geometry("geom", geom)?;
        }
        let (mut promoted, support) = codec::split_promoted(&self.support, SUPPORT);
        // name, aliases | latitude .. country
        let coordinates_and_address = promoted.split_off(2);

        let mut cells = promoted;
        cells.insert(1, codec::encode_enum(self.location_type));
        cells.push(Cell::from(self.geom.clone()));
        cells.extend(coordinates_and_address);
        cells.push(codec::encode_map_cell(&support)?);
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        let support = codec::merge_promoted(row, "support", SUPPORT)?;
        let geom = geometry::resolve_geometry(
            codec::optional_text(row, "geom")?,
            support.get("latitude").and_then(Value::as_f64),
            support.get("longitude").and_then(Value::as_f64),
        );
        Ok(LocationRecord {
            location_type: codec::required_enum(row, "type")?,
            geom,
            support,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let record = LocationRecord {
            location_type: LocationType::Address,
            geom: Some("POINT(115.86 -31.95)".to_string()),
            support: json!({
                "name": "Bentley campus",
                "aliases": ["Curtin", "Bentley"],
                "street_address": "Kent St",
                "country": "Australia",
                "soil": "sand"
            })
            .as_object()
            .unwrap()
            .clone(),
        };
        let row = record.to_row().unwrap();
        assert_eq!(
            row.keys().map(String::as_str).collect::<Vec<_>>(),
            EntityKind::Locations.columns()
        );
        assert_eq!(row["name"], Cell::Text("Bentley campus".to_string()));
        assert_eq!(row["type"], Cell::Text("address".to_string()));
        assert_eq!(row["aliases"], Cell::Text("Curtin;Bentley".to_string()));
        assert_eq!(row["support"], Cell::Text(r#"{"soil":"sand"}"#.to_string()));
        assert_eq!(LocationRecord::from_row(&row).unwrap(), record);
        assert_eq!(record.name(), Some("Bentley campus"));
    }

    /// Decoding pads bare coordinates into a polygon, so such a record does
    /// not read back exactly as written.
    #[test]
    fn test_coordinates_without_geom() {
        let mut row = FlatRow::new();
        row.insert("type".to_string(), Cell::Text("point".to_string()));
        row.insert("latitude".to_string(), Cell::Text("-30".to_string()));
        row.insert("longitude".to_string(), Cell::Text("116".to_string()));
        let record = LocationRecord::from_row(&row).unwrap();
        assert_eq!(record.support["latitude"], json!(-30));
        assert_eq!(
            record.geom.as_deref(),
            Some(geometry::point_to_polygon(-30.0, 116.0, geometry::POINT_BUFFER_RADIUS).as_str())
        );

        let exported = record.to_row().unwrap();
        assert_eq!(exported["latitude"], Cell::Text("-30".to_string()));
        assert_eq!(LocationRecord::from_row(&exported).unwrap(), record);
    }
}
