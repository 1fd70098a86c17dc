use super::{assemble, EntityKind, TableRow};
use crate::codec::{self, Cell, FlatRow};
use crate::errors::ImportExportResult;

/// Taxid of the universal root of the taxonomy
pub const ROOT_TAXID: i64 = 1;

/// One node of the taxonomy tree. Negative taxids are custom entries.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonRecord {
    pub taxid: i64,
    pub name: String,
    pub rank: Option<String>,
    pub alt_names: Vec<String>,
    pub parent_taxid: Option<i64>,
}

impl TaxonRecord {
    pub fn is_root(&self) -> bool {
        self.taxid == ROOT_TAXID
    }
}

impl TableRow for TaxonRecord {
    const KIND: EntityKind = EntityKind::Taxon;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let cells = vec![
            Cell::Text(self.taxid.to_string()),
            Cell::Text(self.name.clone()),
            Cell::from(self.rank.clone()),
            codec::encode_list(&self.alt_names),
            Cell::from(self.parent_taxid.map(|p| p.to_string())),
        ];
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        Ok(TaxonRecord {
            taxid: codec::required_number(row, "taxid")?,
            name: codec::required_text(row, "name")?,
            rank: codec::optional_text(row, "rank")?,
            alt_names: codec::decode_list("alt_names", codec::cell(row, "alt_names"))?,
            parent_taxid: codec::optional_number(row, "parent_taxid")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImportExportError;

    #[test]
    fn test_round_trip() {
        let record = TaxonRecord {
            taxid: -4,
            name: "Pyrenophora tritici-repentis race 4".to_string(),
            rank: None,
            alt_names: vec!["Ptr race 4".to_string()],
            parent_taxid: Some(45151),
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["taxid"], Cell::Text("-4".to_string()));
        assert_eq!(row["rank"], Cell::Absent);
        assert_eq!(TaxonRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_missing_name() {
        let mut row = FlatRow::new();
        row.insert("taxid".to_string(), Cell::Text("2".to_string()));
        assert!(matches!(
            TaxonRecord::from_row(&row),
            Err(ImportExportError::MissingRequiredField(ref f)) if f == "name"
        ));
    }
}
