use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pesticides")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub pesticide_type: Option<String>, // JSON list
    pub product_type: String,
    pub group_tags: Option<String>, // JSON list
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sample_pesticides::Entity")]
    SamplePesticides,
}

impl Related<super::sample_pesticides::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SamplePesticides.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
