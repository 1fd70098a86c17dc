use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub contributor_type: String,
    pub contact: Option<String>, // JSON
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sample_contributions::Entity")]
    SampleContributions,
}

impl Related<super::sample_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleContributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
