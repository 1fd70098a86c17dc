use std::collections::HashMap;
use std::io::Write;

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::info;

use super::models;
use crate::codec::FlatRow;
use crate::database::entities::{
    contributors, location_histories, locations, pesticide_adjacency, pesticides, phenotypes,
    sample_adjacency, sample_contributions, sample_pesticides, sample_taxa, samples, taxa,
};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::export;
use crate::rows::{EntityKind, TableRow};

fn to_rows<T: TableRow>(
    records: impl IntoIterator<Item = ImportExportResult<T>>,
) -> ImportExportResult<Vec<FlatRow>> {
    records
        .into_iter()
        .map(|record| record.and_then(|r| r.to_row()))
        .collect()
}

/// Parent keys per child, ordered by declared position
fn group_parents<K, P>(edges: impl IntoIterator<Item = (K, P, i32)>) -> HashMap<K, Vec<P>>
where
    K: std::hash::Hash + Eq,
{
    let mut grouped: HashMap<K, Vec<(i32, P)>> = HashMap::new();
    for (child, parent, position) in edges {
        grouped.entry(child).or_default().push((position, parent));
    }
    grouped
        .into_iter()
        .map(|(child, mut parents)| {
            parents.sort_by_key(|(position, _)| *position);
            (child, parents.into_iter().map(|(_, p)| p).collect())
        })
        .collect()
}

fn missing(entity: &'static str, key: impl ToString) -> ImportExportError {
    ImportExportError::ReferenceNotFound {
        entity,
        key: key.to_string(),
    }
}

pub struct ExportService {
    db: DatabaseConnection,
}

impl ExportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every stored record of `kind` as a flat row.
    ///
    /// A record that cannot be encoded fails the whole export.
    pub async fn export_all(&self, kind: EntityKind) -> ImportExportResult<Vec<FlatRow>> {
        let rows = match kind {
            EntityKind::Samples => self.export_samples().await?,
            EntityKind::Taxon => {
                let taxa = taxa::Entity::find()
                    .order_by_asc(taxa::Column::Taxid)
                    .all(&self.db)
                    .await?;
                to_rows(taxa.into_iter().map(models::taxon_from_model))?
            }
            EntityKind::SampleTaxon => {
                let links = sample_taxa::Entity::find()
                    .order_by_asc(sample_taxa::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(links.into_iter().map(models::sample_taxon_from_model))?
            }
            EntityKind::Pesticides => self.export_pesticides().await?,
            EntityKind::SamplePesticides => {
                let links = sample_pesticides::Entity::find()
                    .find_also_related(pesticides::Entity)
                    .order_by_asc(sample_pesticides::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(links.into_iter().map(|(link, pesticide)| {
                    let pesticide = pesticide.ok_or_else(|| missing("pesticide", link.pesticide_id))?;
                    models::sample_pesticide_from_model(link, pesticide.name)
                }))?
            }
            EntityKind::Contributors => {
                let contributors = contributors::Entity::find()
                    .order_by_asc(contributors::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(contributors.into_iter().map(models::contributor_from_model))?
            }
            EntityKind::SampleContributions => {
                let links = sample_contributions::Entity::find()
                    .find_also_related(contributors::Entity)
                    .order_by_asc(sample_contributions::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(links.into_iter().map(|(link, contributor)| {
                    let contributor =
                        contributor.ok_or_else(|| missing("contributor", link.contributor_id))?;
                    models::sample_contribution_from_model(link, contributor.name)
                }))?
            }
            EntityKind::Locations => {
                let locations = locations::Entity::find()
                    .order_by_asc(locations::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(locations.into_iter().map(models::location_from_model))?
            }
            EntityKind::LocationHistory => {
                let histories = location_histories::Entity::find()
                    .find_also_related(locations::Entity)
                    .order_by_asc(location_histories::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(histories.into_iter().map(|(history, location)| {
                    let name = location
                        .and_then(|l| l.name)
                        .ok_or_else(|| missing("location", history.location_id))?;
                    models::location_history_from_model(history, name)
                }))?
            }
            EntityKind::Phenotypes => {
                let phenotypes = phenotypes::Entity::find()
                    .order_by_asc(phenotypes::Column::Id)
                    .all(&self.db)
                    .await?;
                to_rows(phenotypes.into_iter().map(models::phenotype_from_model))?
            }
        };

        info!("Exported {} {} rows", rows.len(), kind);
        Ok(rows)
    }

    /// Write every stored record of `kind` as TSV, header first
    pub async fn export_to_writer<W: Write>(
        &self,
        kind: EntityKind,
        writer: W,
    ) -> ImportExportResult<usize> {
        let rows = self.export_all(kind).await?;
        export::write_rows(writer, kind.columns(), &rows)?;
        Ok(rows.len())
    }

    async fn export_samples(&self) -> ImportExportResult<Vec<FlatRow>> {
        let edges = sample_adjacency::Entity::find().all(&self.db).await?;
        let mut parents = group_parents(
            edges
                .into_iter()
                .map(|edge| (edge.child_id, edge.parent_id, edge.position)),
        );

        let samples = samples::Entity::find()
            .order_by_asc(samples::Column::Id)
            .all(&self.db)
            .await?;
        to_rows(samples.into_iter().map(|sample| {
            let sample_parents = parents.remove(&sample.id).unwrap_or_default();
            models::sample_from_model(sample, sample_parents)
        }))
    }

    async fn export_pesticides(&self) -> ImportExportResult<Vec<FlatRow>> {
        let pesticides = pesticides::Entity::find()
            .order_by_asc(pesticides::Column::Id)
            .all(&self.db)
            .await?;
        let names: HashMap<i32, String> = pesticides
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect();

        let edges = pesticide_adjacency::Entity::find().all(&self.db).await?;
        let edges = edges
            .into_iter()
            .map(|edge| {
                let parent = names
                    .get(&edge.parent_id)
                    .cloned()
                    .ok_or_else(|| missing("pesticide", edge.parent_id))?;
                Ok((edge.child_id, parent, edge.position))
            })
            .collect::<ImportExportResult<Vec<_>>>()?;
        let mut parents = group_parents(edges);

        to_rows(pesticides.into_iter().map(|pesticide| {
            let pesticide_parents = parents.remove(&pesticide.id).unwrap_or_default();
            models::pesticide_from_model(pesticide, pesticide_parents)
        }))
    }
}
