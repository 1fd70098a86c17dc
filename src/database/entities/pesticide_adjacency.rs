use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parent/child edge of the pesticide product hierarchy
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pesticide_adjacency")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub child_id: i32,
    pub parent_id: i32,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pesticides::Entity",
        from = "Column::ChildId",
        to = "super::pesticides::Column::Id",
        on_delete = "Cascade"
    )]
    Child,
    #[sea_orm(
        belongs_to = "super::pesticides::Entity",
        from = "Column::ParentId",
        to = "super::pesticides::Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
}

impl ActiveModelBehavior for ActiveModel {}
