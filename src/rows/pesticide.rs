use super::{assemble, EntityKind, TableRow};
use crate::codec::{self, Cell, FlatRow};
use crate::errors::ImportExportResult;
use crate::vocab::{PesticideProductType, PesticideType};

/// A chemical class, active ingredient or product; products may have several
/// parents.
#[derive(Debug, Clone, PartialEq)]
pub struct PesticideRecord {
    pub name: String,
    pub pesticide_type: Vec<PesticideType>,
    pub product_type: PesticideProductType,
    pub group: Vec<String>,
    pub notes: Option<String>,
    pub parents: Vec<String>,
}

impl TableRow for PesticideRecord {
    const KIND: EntityKind = EntityKind::Pesticides;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let cells = vec![
            Cell::Text(self.name.clone()),
            codec::encode_enum_list(&self.pesticide_type),
            codec::encode_enum(self.product_type),
            codec::encode_list(&self.group),
            Cell::from(self.notes.clone()),
            codec::encode_list(&self.parents),
        ];
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        Ok(PesticideRecord {
            name: codec::required_text(row, "name")?.trim().to_string(),
            pesticide_type: codec::decode_enum_list(
                "pesticide_type",
                codec::cell(row, "pesticide_type"),
            )?,
            product_type: codec::required_enum(row, "type")?,
            group: codec::decode_list("group", codec::cell(row, "group"))?,
            notes: codec::optional_text(row, "notes")?,
            parents: codec::decode_list("parents", codec::cell(row, "parents"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImportExportError;

    #[test]
    fn test_round_trip() {
        let record = PesticideRecord {
            name: "Compound X".to_string(),
            pesticide_type: vec![PesticideType::Fungicide],
            product_type: PesticideProductType::Mixture,
            group: vec!["3".to_string(), "11".to_string()],
            notes: Some("tank mix".to_string()),
            parents: vec!["A".to_string(), "B".to_string()],
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["parents"], Cell::Text("A;B".to_string()));
        assert_eq!(row["group"], Cell::Text("3;11".to_string()));
        assert_eq!(PesticideRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_each_pesticide_type_is_validated() {
        let mut row = FlatRow::new();
        row.insert("name".to_string(), Cell::Text("Tebuconazole".to_string()));
        row.insert("type".to_string(), Cell::Text("active_ingredient".to_string()));
        row.insert(
            "pesticide_type".to_string(),
            Cell::Text("fungicide;fungicidal".to_string()),
        );
        assert!(matches!(
            PesticideRecord::from_row(&row),
            Err(ImportExportError::UnknownVocabularyTerm { vocabulary: "PesticideType", ref term })
                if term == "fungicidal"
        ));
    }
}
