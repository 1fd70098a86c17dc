//! Per-entity records and their flat-row mappings.
//!
//! Every entity type has a typed record and a fixed column layout. `to_row`
//! writes every column of the layout in order; `from_row` reads them back,
//! tolerating columns that are missing from the row as long as they are not
//! required.

pub mod contributor;
pub mod links;
pub mod location;
pub mod pesticide;
pub mod sample;
pub mod taxon;

use std::fmt;
use std::str::FromStr;

use crate::codec::{Cell, FlatRow};
use crate::errors::{ImportExportError, ImportExportResult};

pub use contributor::ContributorRecord;
pub use links::{
    LocationHistoryRecord, PhenotypeRecord, SampleContributionRecord, SamplePesticideRecord,
    SampleTaxonRecord,
};
pub use location::LocationRecord;
pub use pesticide::PesticideRecord;
pub use sample::SampleRecord;
pub use taxon::TaxonRecord;

/// Symmetric record <-> flat row mapping for one entity type
pub trait TableRow: Sized {
    const KIND: EntityKind;

    fn to_row(&self) -> ImportExportResult<FlatRow>;

    fn from_row(row: &FlatRow) -> ImportExportResult<Self>;
}

/// The supported entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Samples,
    Taxon,
    SampleTaxon,
    Pesticides,
    SamplePesticides,
    Contributors,
    SampleContributions,
    Locations,
    LocationHistory,
    Phenotypes,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Samples,
        EntityKind::Taxon,
        EntityKind::SampleTaxon,
        EntityKind::Pesticides,
        EntityKind::SamplePesticides,
        EntityKind::Contributors,
        EntityKind::SampleContributions,
        EntityKind::Locations,
        EntityKind::LocationHistory,
        EntityKind::Phenotypes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Samples => "samples",
            EntityKind::Taxon => "taxon",
            EntityKind::SampleTaxon => "sampletaxon",
            EntityKind::Pesticides => "pesticides",
            EntityKind::SamplePesticides => "samplepesticides",
            EntityKind::Contributors => "contributors",
            EntityKind::SampleContributions => "samplecontribution",
            EntityKind::Locations => "locations",
            EntityKind::LocationHistory => "locationhistory",
            EntityKind::Phenotypes => "phenotypes",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Samples => &["sample"],
            EntityKind::Taxon => &["taxa"],
            EntityKind::SampleTaxon => &["sample_taxon"],
            EntityKind::Pesticides => &["pesticide"],
            EntityKind::SamplePesticides => &["sample_pesticides"],
            EntityKind::Contributors => &["contr"],
            EntityKind::SampleContributions => &["sample_contributions"],
            EntityKind::Locations => &["loc"],
            EntityKind::LocationHistory => &["location_history"],
            EntityKind::Phenotypes => &["phenotype"],
        }
    }

    /// Column layout, in output order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Samples => &[
                "id",
                "names",
                "type",
                "date",
                "date_resolution",
                "details",
                "permission",
                "parents",
                "geom",
                "location_type",
                "latitude",
                "longitude",
                "street_address",
                "suburb",
                "state",
                "country",
                "location_support",
            ],
            EntityKind::Taxon => &["taxid", "name", "rank", "alt_names", "parent_taxid"],
            EntityKind::SampleTaxon => &["sample_id", "taxid", "type", "evidence"],
            EntityKind::Pesticides => &["name", "pesticide_type", "type", "group", "notes", "parents"],
            EntityKind::SamplePesticides => &[
                "sample_id",
                "pesticide_name",
                "date",
                "date_resolution",
                "rate",
                "units",
                "application_style",
                "stage_applied",
                "notes",
            ],
            EntityKind::Contributors => &["name", "type", "email", "phone", "contact"],
            EntityKind::SampleContributions => {
                &["sample_id", "contributor_name", "predicate", "datetime"]
            }
            EntityKind::Locations => &[
                "name",
                "type",
                "aliases",
                "geom",
                "latitude",
                "longitude",
                "street_address",
                "suburb",
                "state",
                "country",
                "support",
            ],
            EntityKind::LocationHistory => &[
                "location_name",
                "type",
                "date",
                "date_resolution",
                "crop",
                "cultivar",
                "tissue",
                "rate",
                "units",
                "details",
            ],
            EntityKind::Phenotypes => &["sample_id", "type", "date", "details"],
        }
    }

    /// Columns that must be present in a header and non-absent in every row
    pub fn required(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Samples => &["id", "type", "permission"],
            EntityKind::Taxon => &["taxid", "name"],
            EntityKind::SampleTaxon => &["sample_id", "taxid", "type"],
            EntityKind::Pesticides => &["name", "type"],
            EntityKind::SamplePesticides => &["sample_id", "pesticide_name"],
            EntityKind::Contributors => &["name", "type"],
            EntityKind::SampleContributions => &["sample_id", "contributor_name", "predicate"],
            EntityKind::Locations => &["type"],
            EntityKind::LocationHistory => &["location_name", "type"],
            EntityKind::Phenotypes => &["sample_id", "type"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = ImportExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.aliases().contains(&s))
            .ok_or_else(|| ImportExportError::UnsupportedEntity(s.to_string()))
    }
}

/// Zip a column layout with its cells into a row
pub(crate) fn assemble(columns: &[&str], cells: Vec<Cell>) -> FlatRow {
    debug_assert_eq!(columns.len(), cells.len());
    columns
        .iter()
        .map(|column| column.to_string())
        .zip(cells)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_names_and_aliases() {
        assert_eq!("taxa".parse::<EntityKind>().unwrap(), EntityKind::Taxon);
        assert_eq!("contr".parse::<EntityKind>().unwrap(), EntityKind::Contributors);
        assert_eq!(
            "sample_contributions".parse::<EntityKind>().unwrap(),
            EntityKind::SampleContributions
        );
        for kind in EntityKind::ALL {
            assert_eq!(kind.name().parse::<EntityKind>().unwrap(), kind);
        }
        assert!(matches!(
            "environments".parse::<EntityKind>(),
            Err(ImportExportError::UnsupportedEntity(ref name)) if name == "environments"
        ));
    }

    #[test]
    fn test_required_columns_are_part_of_layout() {
        for kind in EntityKind::ALL {
            for required in kind.required() {
                assert!(kind.columns().contains(required), "{} {}", kind, required);
            }
        }
    }
}
