use super::{assemble, EntityKind, TableRow};
use crate::codec::{self, Cell, FlatRow, JsonMap, Promoted};
use crate::errors::ImportExportResult;
use crate::vocab::ContributorType;

const CONTACT: &[Promoted] = &[Promoted::text("email"), Promoted::text("phone")];

/// A person or organisation credited on samples
#[derive(Debug, Clone, PartialEq)]
pub struct ContributorRecord {
    pub name: String,
    pub contributor_type: ContributorType,
    /// Contact details; `email` and `phone` have their own columns
    pub contact: JsonMap,
}

impl TableRow for ContributorRecord {
    const KIND: EntityKind = EntityKind::Contributors;

    fn to_row(&self) -> ImportExportResult<FlatRow> {
        let (promoted, contact) = codec::split_promoted(&self.contact, CONTACT);
        let mut cells = vec![
            Cell::Text(self.name.clone()),
            codec::encode_enum(self.contributor_type),
        ];
        cells.extend(promoted);
        cells.push(codec::encode_map_cell(&contact)?);
        Ok(assemble(Self::KIND.columns(), cells))
    }

    fn from_row(row: &FlatRow) -> ImportExportResult<Self> {
        Ok(ContributorRecord {
            name: codec::required_text(row, "name")?,
            contributor_type: codec::required_enum(row, "type")?,
            contact: codec::merge_promoted(row, "contact", CONTACT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_keeps_contact_extras() {
        let record = ContributorRecord {
            name: "Curtin University".to_string(),
            contributor_type: ContributorType::Organisation,
            contact: json!({"email": "ccdm@example.org", "department": "CCDM"})
                .as_object()
                .unwrap()
                .clone(),
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["email"], Cell::Text("ccdm@example.org".to_string()));
        assert_eq!(row["phone"], Cell::Absent);
        assert_eq!(row["contact"], Cell::Text(r#"{"department":"CCDM"}"#.to_string()));
        assert_eq!(ContributorRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_email_column_wins_over_contact_map() {
        let mut row = FlatRow::new();
        row.insert("name".to_string(), Cell::Text("Jo Bloggs".to_string()));
        row.insert("type".to_string(), Cell::Text("person".to_string()));
        row.insert("email".to_string(), Cell::Text("jo@new.example".to_string()));
        row.insert(
            "contact".to_string(),
            Cell::Text(r#"{"email": "jo@old.example"}"#.to_string()),
        );
        let record = ContributorRecord::from_row(&row).unwrap();
        assert_eq!(record.contact["email"], json!("jo@new.example"));
        assert_eq!(record.contact.len(), 1);
    }

    #[test]
    fn test_numeric_phone_keeps_its_type() {
        let record = ContributorRecord {
            name: "Plant Lab".to_string(),
            contributor_type: ContributorType::Organisation,
            contact: json!({"phone": 61800000000u64}).as_object().unwrap().clone(),
        };
        let row = record.to_row().unwrap();
        assert_eq!(row["phone"], Cell::Absent);
        assert_eq!(row["contact"], Cell::Text(r#"{"phone":61800000000}"#.to_string()));
        assert_eq!(ContributorRecord::from_row(&row).unwrap(), record);
    }
}
