use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sample_pesticides")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sample_id: String,
    pub pesticide_id: i32,
    pub date: Option<Date>,
    pub date_resolution: Option<String>,
    pub rate: Option<f64>,
    pub units: Option<String>,
    pub application_style: Option<String>,
    pub stage_applied: Option<String>,
    pub notes: Option<String>,
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
        belongs_to = "super::pesticides::Entity",
        from = "Column::PesticideId",
        to = "super::pesticides::Column::Id",
        on_delete = "Cascade"
    )]
    Pesticides,
}

impl Related<super::samples::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Samples.def()
    }
}

impl Related<super::pesticides::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pesticides.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
