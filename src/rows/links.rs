//! Association rows: each joins stored entities by natural key and carries
//! its own typed metadata.

use chrono::{NaiveDate, NaiveDateTime};

use super::sample::validate_sample_id;
use super::{assemble, EntityKind, TableRow};
use crate::codec::{self, Cell, FlatRow, JsonMap, Promoted};
use crate::errors::ImportExportResult;
use crate::vocab::{
    DateResolution, LocationHistoryType, PesticideApplication, PhenotypeType,
    SampleContributionPredicate, SampleTaxonType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleTaxonRecord {
    pub sample_id: String,
    pub taxid: i64,
    pub taxon_type: SampleTaxonType,
    pub evidence: Vec<String>,
}

impl TableRow for SampleTaxonRecord {
    const KIND: EntityKind = EntityKind::SampleTaxon;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let cells = vec![
            Cell::Text(self.sample_id.clone()),
            Cell::Text(self.taxid.to_string()),
            codec::encode_enum(self.taxon_type),
            codec::encode_list(&self.evidence),
        ];
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        let sample_id = codec::required_text(row, "sample_id")?;
        validate_sample_id("sample_id", &sample_id)?;
        Ok(SampleTaxonRecord {
            sample_id,
            taxid: codec::required_number(row, "taxid")?,
            taxon_type: codec::required_enum(row, "type")?,
            evidence: codec::decode_list("evidence", codec::cell(row, "evidence"))?,
        })
    }
}

/// Exposure of a sample to a pesticide
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePesticideRecord {
    pub sample_id: String,
    pub pesticide_name: String,
    pub date: Option<NaiveDate>,
    pub date_resolution: Option<DateResolution>,
    pub rate: Option<f64>,
    pub units: Option<String>,
    pub application_style: Option<PesticideApplication>,
    pub stage_applied: Option<String>,
    pub notes: Option<String>,
}

impl TableRow for SamplePesticideRecord {
    const KIND: EntityKind = EntityKind::SamplePesticides;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let cells = vec![
            Cell::Text(self.sample_id.clone()),
            Cell::Text(self.pesticide_name.clone()),
            self.date.map(codec::encode_date).unwrap_or_default(),
            self.date_resolution.map(codec::encode_enum).unwrap_or_default(),
            Cell::from(self.rate.map(|rate| rate.to_string())),
            Cell::from(self.units.clone()),
            self.application_style.map(codec::encode_enum).unwrap_or_default(),
            Cell::from(self.stage_applied.clone()),
            Cell::from(self.notes.clone()),
        ];
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        let sample_id = codec::required_text(row, "sample_id")?;
        validate_sample_id("sample_id", &sample_id)?;
        Ok(SamplePesticideRecord {
            sample_id,
            pesticide_name: codec::required_text(row, "pesticide_name")?.trim().to_string(),
            date: codec::optional_date(row, "date")?,
            date_resolution: codec::optional_enum(row, "date_resolution")?,
            rate: codec::optional_number(row, "rate")?,
            units: codec::optional_text(row, "units")?,
            application_style: codec::optional_enum(row, "application_style")?,
            stage_applied: codec::optional_text(row, "stage_applied")?,
            notes: codec::optional_text(row, "notes")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleContributionRecord {
    pub sample_id: String,
    pub contributor_name: String,
    pub predicate: SampleContributionPredicate,
    pub datetime: Option<NaiveDateTime>,
}

impl TableRow for SampleContributionRecord {
    const KIND: EntityKind = EntityKind::SampleContributions;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let cells = vec![
            Cell::Text(self.sample_id.clone()),
            Cell::Text(self.contributor_name.clone()),
            codec::encode_enum(self.predicate),
            self.datetime.map(codec::encode_datetime).unwrap_or_default(),
        ];
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        let sample_id = codec::required_text(row, "sample_id")?;
        validate_sample_id("sample_id", &sample_id)?;
        Ok(SampleContributionRecord {
            sample_id,
            contributor_name: codec::required_text(row, "contributor_name")?,
            predicate: codec::required_enum(row, "predicate")?,
            datetime: codec::optional_datetime(row, "datetime")?,
        })
    }
}

const HISTORY_DETAILS: &[Promoted] = &[
    Promoted::text("crop"),
    Promoted::text("cultivar"),
    Promoted::text("tissue"),
    Promoted::number("rate"),
    Promoted::text("units"),
];

/// A dated event at a location: a crop, a spray, a weather record
#[derive(Debug, Clone, PartialEq)]
pub struct LocationHistoryRecord {
    pub location_name: String,
    pub history_type: LocationHistoryType,
    pub date: Option<NaiveDate>,
    pub date_resolution: Option<DateResolution>,
    pub details: JsonMap,
}

impl TableRow for LocationHistoryRecord {
    const KIND: EntityKind = EntityKind::LocationHistory;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let (promoted, details) = codec::split_promoted(&self.details, HISTORY_DETAILS);
        let mut cells = vec![
            Cell::Text(self.location_name.clone()),
            codec::encode_enum(self.history_type),
            self.date.map(codec::encode_date).unwrap_or_default(),
            self.date_resolution.map(codec::encode_enum).unwrap_or_default(),
        ];
        cells.extend(promoted);
        cells.push(codec::encode_map_cell(&details)?);
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        Ok(LocationHistoryRecord {
            location_name: codec::required_text(row, "location_name")?,
            history_type: codec::required_enum(row, "type")?,
            date: codec::optional_date(row, "date")?,
            date_resolution: codec::optional_enum(row, "date_resolution")?,
            details: codec::merge_promoted(row, "details", HISTORY_DETAILS)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhenotypeRecord {
    pub sample_id: String,
    pub phenotype_type: PhenotypeType,
    pub date: Option<NaiveDate>,
    pub details: JsonMap,
}

impl TableRow for PhenotypeRecord {
    const KIND: EntityKind = EntityKind::Phenotypes;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let cells = vec![
            Cell::Text(self.sample_id.clone()),
            codec::encode_enum(self.phenotype_type),
            self.date.map(codec::encode_date).unwrap_or_default(),
            codec::encode_map_cell(&self.details)?,
        ];
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        let sample_id = codec::required_text(row, "sample_id")?;
        validate_sample_id("sample_id", &sample_id)?;
        Ok(PhenotypeRecord {
            sample_id,
            phenotype_type: codec::required_enum(row, "type")?,
            date: codec::optional_date(row, "date")?,
            details: codec::decode_map("details", codec::cell(row, "details"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImportExportError;
    use serde_json::json;

    #[test]
    fn test_sample_pesticide_round_trip() {
        let record = SamplePesticideRecord {
            sample_id: "S001".to_string(),
            pesticide_name: "Tebuconazole".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, 15),
            date_resolution: Some(DateResolution::Day),
            rate: Some(0.25),
            units: Some("L/ha".to_string()),
            application_style: Some(PesticideApplication::Foliar),
            stage_applied: Some("GS31".to_string()),
            notes: None,
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["rate"], Cell::Text("0.25".to_string()));
        assert_eq!(row["notes"], Cell::Absent);
        assert_eq!(SamplePesticideRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_pesticide_name_is_trimmed() {
        let mut row = FlatRow::new();
        row.insert("sample_id".to_string(), Cell::Text("S001".to_string()));
        row.insert("pesticide_name".to_string(), Cell::List(vec![]));
        assert!(matches!(
            SamplePesticideRecord::from_row(&row),
            Err(ImportExportError::MalformedField { .. })
        ));
        row.insert(
            "pesticide_name".to_string(),
            Cell::Text("Tebuconazole  ".to_string()),
        );
        assert_eq!(
            SamplePesticideRecord::from_row(&row).unwrap().pesticide_name,
            "Tebuconazole"
        );
    }

    #[test]
    fn test_contribution_round_trip() {
        let record = SampleContributionRecord {
            sample_id: "S001".to_string(),
            contributor_name: "Jo Bloggs".to_string(),
            predicate: SampleContributionPredicate::CollectedBy,
            datetime: NaiveDate::from_ymd_opt(2019, 7, 1).and_then(|d| d.and_hms_opt(9, 30, 0)),
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["datetime"], Cell::Text("2019-07-01T09:30:00".to_string()));
        assert_eq!(SampleContributionRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_contribution_datetime_must_parse() {
        let mut row = SampleContributionRecord {
            sample_id: "S001".to_string(),
            contributor_name: "Jo Bloggs".to_string(),
            predicate: SampleContributionPredicate::OwnedBy,
            datetime: None,
        }
        .to_row()
        .unwrap();
        row.insert("datetime".to_string(), Cell::Text("yesterday".to_string()));
        assert!(matches!(
            SampleContributionRecord::from_row(&row),
            Err(ImportExportError::MalformedField { ref field, .. }) if field == "datetime"
        ));
    }

    #[test]
    fn test_location_history_promotes_crop_fields() {
        let record = LocationHistoryRecord {
            location_name: "Paddock 7".to_string(),
            history_type: LocationHistoryType::Crop,
            date: NaiveDate::from_ymd_opt(2018, 1, 1),
            date_resolution: Some(DateResolution::Year),
            details: json!({"crop": "wheat", "cultivar": "Scepter", "rate": 80, "sown": "dry"})
                .as_object()
                .unwrap()
                .clone(),
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["cultivar"], Cell::Text("Scepter".to_string()));
        assert_eq!(row["rate"], Cell::Text("80".to_string()));
        assert_eq!(row["details"], Cell::Text(r#"{"sown":"dry"}"#.to_string()));
        assert_eq!(LocationHistoryRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_phenotype_and_sample_taxon_round_trip() {
        let phenotype = PhenotypeRecord {
            sample_id: "S002".to_string(),
            phenotype_type: PhenotypeType::Ec50,
            date: None,
            details: json!({"fungicide": "tebuconazole", "ec50": 1.2})
                .as_object()
                .unwrap()
                .clone(),
        };
        assert_eq!(
            PhenotypeRecord::from_row(&phenotype.to_row().unwrap()).unwrap(),
            phenotype
        );

        let link = SampleTaxonRecord {
            sample_id: "S002".to_string(),
            taxid: 45151,
            taxon_type: SampleTaxonType::Identified,
            evidence: vec!["ITS".to_string(), "morphology".to_string()],
        };
        let row = link.to_row().unwrap();
        assert_eq!(row["evidence"], Cell::Text("ITS;morphology".to_string()));
        assert_eq!(SampleTaxonRecord::from_row(&row).unwrap(), link);
    }
}
