use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sample_taxa")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sample_id: String,
    pub taxid: i64,
    pub taxon_type: String,
    pub evidence: Option<String>, // JSON list
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::samples::Entity",
        from = "Column::SampleId",
        to = "super::samples::Column::Id",
        on_delete = "Cascade"
    )]
    Samples,
    #[sea_orm(
        belongs_to = "super::taxa::Entity",
        from = "Column::Taxid",
        to = "super::taxa::Column::Taxid",
        on_delete = "Cascade"
    )]
    Taxa,
}

impl Related<super::samples::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Samples.def()
    }
}

impl Related<super::taxa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Taxa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
