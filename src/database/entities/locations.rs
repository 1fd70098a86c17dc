use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Copy of `support.name`, for lookups
    pub name: Option<String>,
    pub location_type: String,
    pub geom: Option<String>,
    pub support: Option<String>, // JSON
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::location_histories::Entity")]
    LocationHistories,
}

impl Related<super::location_histories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LocationHistories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
