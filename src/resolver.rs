//! Natural key lookups for association rows.
//!
//! Lookups run on whatever connection they are handed; the import service
//! passes its open transaction so rows written earlier in the batch are seen.

use std::fmt::Display;

use sea_orm::sea_query::IntoCondition;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::database::entities::{contributors, locations, pesticides, samples, taxa};
use crate::errors::{ImportExportError, ImportExportResult};

/// Fetch the single row of `E` matching `filter`.
///
/// Zero matches is `ReferenceNotFound`, several are `AmbiguousReference`.
pub async fn resolve_unique<E, C, F>(
    conn: &C,
    entity: &'static str,
    key: impl Display,
    filter: F,
) -> ImportExportResult<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    F: IntoCondition,
{
    let mut matches = E::find().filter(filter).all(conn).await?;
    match matches.len() {
        0 => Err(ImportExportError::ReferenceNotFound {
            entity,
            key: key.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(ImportExportError::AmbiguousReference {
            entity,
            key: key.to_string(),
            count,
        }),
    }
}

pub async fn resolve_sample<C: ConnectionTrait>(
    conn: &C,
    id: &str,
) -> ImportExportResult<samples::Model> {
    resolve_unique::<samples::Entity, _, _>(conn, "sample", id, samples::Column::Id.eq(id)).await
}

pub async fn resolve_taxon<C: ConnectionTrait>(
    conn: &C,
    taxid: i64,
) -> ImportExportResult<taxa::Model> {
    resolve_unique::<taxa::Entity, _, _>(conn, "taxon", taxid, taxa::Column::Taxid.eq(taxid)).await
}

pub async fn resolve_pesticide<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> ImportExportResult<pesticides::Model> {
    let name = name.trim();
    resolve_unique::<pesticides::Entity, _, _>(conn, "pesticide", name, pesticides::Column::Name.eq(name))
        .await
}

pub async fn resolve_contributor<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> ImportExportResult<contributors::Model> {
    resolve_unique::<contributors::Entity, _, _>(
        conn,
        "contributor",
        name,
        contributors::Column::Name.eq(name),
    )
    .await
}

pub async fn resolve_location<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> ImportExportResult<locations::Model> {
    resolve_unique::<locations::Entity, _, _>(conn, "location", name, locations::Column::Name.eq(name))
        .await
}
