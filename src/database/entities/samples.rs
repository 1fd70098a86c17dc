use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "samples")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub names: Option<String>, // JSON list
    pub sample_type: String,
    pub date: Option<Date>,
    pub date_resolution: Option<String>,
    pub details: Option<String>, // JSON
    pub permission: String,
    pub geom: Option<String>,
    pub location_type: Option<String>,
    pub location_support: Option<String>, // JSON
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sample_taxa::Entity")]
    SampleTaxa,
    #[sea_orm(has_many = "super::sample_pesticides::Entity")]
    SamplePesticides,
    #[sea_orm(has_many = "super::sample_contributions::Entity")]
    SampleContributions,
    #[sea_orm(has_many = "super::phenotypes::Entity")]
    Phenotypes,
}

impl Related<super::sample_taxa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleTaxa.def()
    }
}

impl Related<super::sample_pesticides::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SamplePesticides.def()
    }
}

impl Related<super::sample_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleContributions.def()
    }
}

impl Related<super::phenotypes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phenotypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
