use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "taxa")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub taxid: i64,
    pub name: String,
    pub rank: Option<String>,
    pub alt_names: Option<String>, // JSON list
    pub parent_taxid: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentTaxid",
        to = "Column::Taxid",
        on_delete = "Cascade"
    )]
    Parent,
    #[sea_orm(has_many = "super::sample_taxa::Entity")]
    SampleTaxa,
}

impl Related<super::sample_taxa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleTaxa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
