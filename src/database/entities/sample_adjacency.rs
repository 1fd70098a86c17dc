use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parent/child edge of the sample lineage graph
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sample_adjacency")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub child_id: String,
    pub parent_id: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::samples::Entity",
        from = "Column::ChildId",
        to = "super::samples::Column::Id",
        on_delete = "Cascade"
    )]
    Child,
    #[sea_orm(
        belongs_to = "super::samples::Entity",
        from = "Column::ParentId",
        to = "super::samples::Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
}

impl ActiveModelBehavior for ActiveModel {}
