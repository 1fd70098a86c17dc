use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sample_contributions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sample_id: String,
    pub contributor_id: i32,
    pub predicate: String,
    pub datetime: Option<DateTime>,
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
        belongs_to = "super::contributors::Entity",
        from = "Column::ContributorId",
        to = "super::contributors::Column::Id",
        on_delete = "Cascade"
    )]
    Contributors,
}

impl Related<super::samples::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Samples.def()
    }
}

impl Related<super::contributors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
