//! Record <-> storage model conversions.
//!
//! Lists and maps are stored as JSON text, with empty values stored as NULL.
//! Vocabulary members are stored by name.

use sea_orm::ActiveValue::{NotSet, Set};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{decode_enum, JsonMap};
use crate::database::entities::{
    contributors, location_histories, locations, pesticides, phenotypes, sample_contributions,
    sample_pesticides, sample_taxa, samples, taxa,
};
use crate::errors::ImportExportResult;
use crate::rows::taxon::ROOT_TAXID;
use crate::rows::{
    ContributorRecord, LocationHistoryRecord, LocationRecord, PesticideRecord, PhenotypeRecord,
    SampleContributionRecord, SamplePesticideRecord, SampleRecord, SampleTaxonRecord, TaxonRecord,
};
use crate::vocab::Vocabulary;

fn list_to_json<T: Serialize>(values: &[T]) -> ImportExportResult<Option<String>> {
    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(values)?))
    }
}

fn list_from_json<T: DeserializeOwned>(text: Option<&str>) -> ImportExportResult<Vec<T>> {
    match text {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(Vec::new()),
    }
}

fn map_to_json(map: &JsonMap) -> ImportExportResult<Option<String>> {
    if map.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(map)?))
    }
}

fn map_from_json(text: Option<&str>) -> ImportExportResult<JsonMap> {
    match text {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(JsonMap::new()),
    }
}

fn enum_name<V: Vocabulary>(member: Option<V>) -> Option<String> {
    member.map(|m| m.name().to_string())
}

fn enum_from_name<V: Vocabulary>(name: Option<&str>) -> ImportExportResult<Option<V>> {
    name.map(decode_enum).transpose()
}

fn enum_list_to_json<V: Vocabulary>(members: &[V]) -> ImportExportResult<Option<String>> {
    let names: Vec<&str> = members.iter().map(|m| m.name()).collect();
    list_to_json(&names)
}

fn enum_list_from_json<V: Vocabulary>(text: Option<&str>) -> ImportExportResult<Vec<V>> {
    list_from_json::<String>(text)?
        .iter()
        .map(|name| decode_enum(name))
        .collect()
}

pub fn sample_to_active(record: &SampleRecord) -> ImportExportResult<samples::ActiveModel> {
    Ok(samples::ActiveModel {
        id: Set(record.id.clone()),
        names: Set(list_to_json(&record.names)?),
        sample_type: Set(record.sample_type.name().to_string()),
        date: Set(record.date),
        date_resolution: Set(enum_name(record.date_resolution)),
        details: Set(map_to_json(&record.details)?),
        permission: Set(record.permission.name().to_string()),
        geom: Set(record.geom.clone()),
        location_type: Set(enum_name(record.location_type)),
        location_support: Set(map_to_json(&record.location_support)?),
    })
}

/// `parents` are the stored parent ids ordered by position
pub fn sample_from_model(
    model: samples::Model,
    parents: Vec<String>,
) -> ImportExportResult<SampleRecord> {
    Ok(SampleRecord {
        names: list_from_json(model.names.as_deref())?,
        sample_type: decode_enum(&model.sample_type)?,
        date: model.date,
        date_resolution: enum_from_name(model.date_resolution.as_deref())?,
        details: map_from_json(model.details.as_deref())?,
        permission: decode_enum(&model.permission)?,
        parents,
        geom: model.geom,
        location_type: enum_from_name(model.location_type.as_deref())?,
        location_support: map_from_json(model.location_support.as_deref())?,
        id: model.id,
    })
}

pub fn taxon_to_active(record: &TaxonRecord) -> ImportExportResult<taxa::ActiveModel> {
    // An NCBI dump lists the root as its own parent
    let parent_taxid = if record.is_root() {
        None
    } else {
        record.parent_taxid
    };
    Ok(taxa::ActiveModel {
        taxid: Set(record.taxid),
        name: Set(record.name.clone()),
        rank: Set(record.rank.clone()),
        alt_names: Set(list_to_json(&record.alt_names)?),
        parent_taxid: Set(parent_taxid),
    })
}

pub fn taxon_from_model(model: taxa::Model) -> ImportExportResult<TaxonRecord> {
    Ok(TaxonRecord {
        taxid: model.taxid,
        name: model.name,
        rank: model.rank,
        alt_names: list_from_json(model.alt_names.as_deref())?,
        parent_taxid: model.parent_taxid.filter(|_| model.taxid != ROOT_TAXID),
    })
}

pub fn pesticide_to_active(record: &PesticideRecord) -> ImportExportResult<pesticides::ActiveModel> {
    Ok(pesticides::ActiveModel {
        id: NotSet,
        name: Set(record.name.clone()),
        pesticide_type: Set(enum_list_to_json(&record.pesticide_type)?),
        product_type: Set(record.product_type.name().to_string()),
        group_tags: Set(list_to_json(&record.group)?),
        notes: Set(record.notes.clone()),
    })
}

pub fn pesticide_from_model(
    model: pesticides::Model,
    parents: Vec<String>,
) -> ImportExportResult<PesticideRecord> {
    Ok(PesticideRecord {
        pesticide_type: enum_list_from_json(model.pesticide_type.as_deref())?,
        product_type: decode_enum(&model.product_type)?,
        group: list_from_json(model.group_tags.as_deref())?,
        notes: model.notes,
        parents,
        name: model.name,
    })
}

pub fn contributor_to_active(
    record: &ContributorRecord,
) -> ImportExportResult<contributors::ActiveModel> {
    Ok(contributors::ActiveModel {
        id: NotSet,
        name: Set(record.name.clone()),
        contributor_type: Set(record.contributor_type.name().to_string()),
        contact: Set(map_to_json(&record.contact)?),
    })
}

pub fn contributor_from_model(model: contributors::Model) -> ImportExportResult<ContributorRecord> {
    Ok(ContributorRecord {
        contributor_type: decode_enum(&model.contributor_type)?,
        contact: map_from_json(model.contact.as_deref())?,
        name: model.name,
    })
}

pub fn location_to_active(record: &LocationRecord) -> ImportExportResult<locations::ActiveModel> {
    Ok(locations::ActiveModel {
        id: NotSet,
        name: Set(record.name().map(str::to_string)),
        location_type: Set(record.location_type.name().to_string()),
        geom: Set(record.geom.clone()),
        support: Set(map_to_json(&record.support)?),
    })
}

pub fn location_from_model(model: locations::Model) -> ImportExportResult<LocationRecord> {
    Ok(LocationRecord {
        location_type: decode_enum(&model.location_type)?,
        geom: model.geom,
        support: map_from_json(model.support.as_deref())?,
    })
}

pub fn sample_taxon_to_active(
    record: &SampleTaxonRecord,
    sample: &samples::Model,
    taxon: &taxa::Model,
) -> ImportExportResult<sample_taxa::ActiveModel> {
    Ok(sample_taxa::ActiveModel {
        id: NotSet,
        sample_id: Set(sample.id.clone()),
        taxid: Set(taxon.taxid),
        taxon_type: Set(record.taxon_type.name().to_string()),
        evidence: Set(list_to_json(&record.evidence)?),
    })
}

pub fn sample_taxon_from_model(model: sample_taxa::Model) -> ImportExportResult<SampleTaxonRecord> {
    Ok(SampleTaxonRecord {
        taxon_type: decode_enum(&model.taxon_type)?,
        evidence: list_from_json(model.evidence.as_deref())?,
        sample_id: model.sample_id,
        taxid: model.taxid,
    })
}

pub fn sample_pesticide_to_active(
    record: &SamplePesticideRecord,
    sample: &samples::Model,
    pesticide: &pesticides::Model,
) -> sample_pesticides::ActiveModel {
    sample_pesticides::ActiveModel {
        id: NotSet,
        sample_id: Set(sample.id.clone()),
        pesticide_id: Set(pesticide.id),
        date: Set(record.date),
        date_resolution: Set(enum_name(record.date_resolution)),
        rate: Set(record.rate),
        units: Set(record.units.clone()),
        application_style: Set(enum_name(record.application_style)),
        stage_applied: Set(record.stage_applied.clone()),
        notes: Set(record.notes.clone()),
    }
}

pub fn sample_pesticide_from_model(
    model: sample_pesticides::Model,
    pesticide_name: String,
) -> ImportExportResult<SamplePesticideRecord> {
    Ok(SamplePesticideRecord {
        sample_id: model.sample_id,
        pesticide_name,
        date: model.date,
        date_resolution: enum_from_name(model.date_resolution.as_deref())?,
        rate: model.rate,
        units: model.units,
        application_style: enum_from_name(model.application_style.as_deref())?,
        stage_applied: model.stage_applied,
        notes: model.notes,
    })
}

pub fn sample_contribution_to_active(
    record: &SampleContributionRecord,
    sample: &samples::Model,
    contributor: &contributors::Model,
) -> sample_contributions::ActiveModel {
    sample_contributions::ActiveModel {
        id: NotSet,
        sample_id: Set(sample.id.clone()),
        contributor_id: Set(contributor.id),
        predicate: Set(record.predicate.name().to_string()),
        datetime: Set(record.datetime),
    }
}

pub fn sample_contribution_from_model(
    model: sample_contributions::Model,
    contributor_name: String,
) -> ImportExportResult<SampleContributionRecord> {
    Ok(SampleContributionRecord {
        sample_id: model.sample_id,
        contributor_name,
        predicate: decode_enum(&model.predicate)?,
        datetime: model.datetime,
    })
}

pub fn location_history_to_active(
    record: &LocationHistoryRecord,
    location: &locations::Model,
) -> ImportExportResult<location_histories::ActiveModel> {
    Ok(location_histories::ActiveModel {
        id: NotSet,
        location_id: Set(location.id),
        history_type: Set(record.history_type.name().to_string()),
        date: Set(record.date),
        date_resolution: Set(enum_name(record.date_resolution)),
        details: Set(map_to_json(&record.details)?),
    })
}

pub fn location_history_from_model(
    model: location_histories::Model,
    location_name: String,
) -> ImportExportResult<LocationHistoryRecord> {
    Ok(LocationHistoryRecord {
        location_name,
        history_type: decode_enum(&model.history_type)?,
        date: model.date,
        date_resolution: enum_from_name(model.date_resolution.as_deref())?,
        details: map_from_json(model.details.as_deref())?,
    })
}

pub fn phenotype_to_active(
    record: &PhenotypeRecord,
    sample: &samples::Model,
) -> ImportExportResult<phenotypes::ActiveModel> {
    Ok(phenotypes::ActiveModel {
        id: NotSet,
        sample_id: Set(sample.id.clone()),
        phenotype_type: Set(record.phenotype_type.name().to_string()),
        date: Set(record.date),
        details: Set(map_to_json(&record.details)?),
    })
}

pub fn phenotype_from_model(model: phenotypes::Model) -> ImportExportResult<PhenotypeRecord> {
    Ok(PhenotypeRecord {
        phenotype_type: decode_enum(&model.phenotype_type)?,
        date: model.date,
        details: map_from_json(model.details.as_deref())?,
        sample_id: model.sample_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{ContributorType, PesticideProductType, PesticideType};
    use serde_json::json;

    #[test]
    fn test_empty_collections_are_stored_as_null() {
        let active = pesticide_to_active(&PesticideRecord {
            name: "Glyphosate".to_string(),
            pesticide_type: vec![PesticideType::Herbicide],
            product_type: PesticideProductType::ActiveIngredient,
            group: Vec::new(),
            notes: None,
            parents: Vec::new(),
        })
        .unwrap();
        assert_eq!(active.group_tags, Set(None));
        assert_eq!(active.pesticide_type, Set(Some(r#"["herbicide"]"#.to_string())));
    }

    #[test]
    fn test_contributor_model_round_trip() {
        let record = ContributorRecord {
            name: "Jo Bloggs".to_string(),
            contributor_type: ContributorType::Person,
            contact: json!({"phone": "+61 8 0000 0000"}).as_object().unwrap().clone(),
        };
        let active = contributor_to_active(&record).unwrap();
        let model = contributors::Model {
            id: 7,
            name: record.name.clone(),
            contributor_type: "person".to_string(),
            contact: active.contact.unwrap(),
        };
        assert_eq!(contributor_from_model(model).unwrap(), record);
    }

    #[test]
    fn test_self_parented_root_is_stored_without_parent() {
        let root = TaxonRecord {
            taxid: ROOT_TAXID,
            name: "root".to_string(),
            rank: Some("no rank".to_string()),
            alt_names: Vec::new(),
            parent_taxid: Some(ROOT_TAXID),
        };
        assert_eq!(taxon_to_active(&root).unwrap().parent_taxid, Set(None));
    }
}
