use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::models;
use crate::codec::FlatRow;
use crate::data_loader;
use crate::database::entities::{
    location_histories, pesticide_adjacency, pesticides, phenotypes, sample_adjacency,
    sample_contributions, sample_pesticides, sample_taxa, samples, taxa,
};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::hierarchy::{self, HierarchyNode};
use crate::resolver;
use crate::rows::taxon::ROOT_TAXID;
use crate::rows::{
    ContributorRecord, EntityKind, LocationHistoryRecord, LocationRecord, PesticideRecord,
    PhenotypeRecord, SampleContributionRecord, SamplePesticideRecord, SampleRecord,
    SampleTaxonRecord, TableRow, TaxonRecord,
};

pub const DEFAULT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Maximum number of rows per insert statement
    pub chunk_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Outcome of one committed batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub entity: EntityKind,
    pub rows_read: usize,
    pub records_inserted: usize,
    /// Parent/child edges written for hierarchical entity types
    pub edges_inserted: usize,
}

impl ImportResult {
    fn new(entity: EntityKind, rows_read: usize) -> Self {
        Self {
            entity,
            rows_read,
            records_inserted: 0,
            edges_inserted: 0,
        }
    }
}

/// File line of a data row; the header is line 1
fn line_number(row_index: usize) -> usize {
    row_index + 2
}

fn decode_rows<T: TableRow>(rows: &[FlatRow]) -> ImportExportResult<Vec<T>> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            T::from_row(row).map_err(|e| ImportExportError::at_line(line_number(idx), e))
        })
        .collect()
}

/// Parent keys that are not part of the batch itself
fn external_parents<N: HierarchyNode>(nodes: &[N]) -> Vec<N::Key>
where
    N::Key: Ord,
{
    let batch: HashSet<N::Key> = nodes.iter().map(|n| n.key()).collect();
    let external: BTreeSet<N::Key> = nodes
        .iter()
        .flat_map(|n| n.parent_keys())
        .filter(|key| !batch.contains(key))
        .collect();
    external.into_iter().collect()
}

pub struct ImportService {
    db: DatabaseConnection,
    options: ImportOptions,
}

impl ImportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_options(db, ImportOptions::default())
    }

    pub fn with_options(db: DatabaseConnection, options: ImportOptions) -> Self {
        Self { db, options }
    }

    /// Import one TSV file as a single batch
    pub async fn import_file(
        &self,
        kind: EntityKind,
        path: &Path,
    ) -> ImportExportResult<ImportResult> {
        info!("Loading {} rows from {}", kind, path.display());
        let rows = data_loader::load_rows(path, kind)?;
        self.import_batch(kind, rows).await
    }

    /// Import TSV text from any reader as a single batch
    pub async fn import_reader<R: Read>(
        &self,
        kind: EntityKind,
        reader: R,
    ) -> ImportExportResult<ImportResult> {
        let rows = data_loader::read_rows(reader, kind)?;
        self.import_batch(kind, rows).await
    }

    /// Decode, assemble and persist `rows` in one transaction.
    ///
    /// Any error drops the transaction uncommitted, so nothing from the batch
    /// is stored.
    pub async fn import_batch(
        &self,
        kind: EntityKind,
        rows: Vec<FlatRow>,
    ) -> ImportExportResult<ImportResult> {
        info!("Importing {} {} rows", rows.len(), kind);

        let txn = self.db.begin().await?;
        let result = match kind {
            EntityKind::Taxon => self.import_taxa(&txn, decode_rows(&rows)?).await?,
            EntityKind::Pesticides => self.import_pesticides(&txn, decode_rows(&rows)?).await?,
            EntityKind::Samples => self.import_samples(&txn, decode_rows(&rows)?).await?,
            EntityKind::Contributors => {
                let records: Vec<ContributorRecord> = decode_rows(&rows)?;
                let active = records
                    .iter()
                    .map(models::contributor_to_active)
                    .collect::<ImportExportResult<Vec<_>>>()?;
                self.insert_flat(&txn, kind, active).await?
            }
            EntityKind::Locations => {
                let records: Vec<LocationRecord> = decode_rows(&rows)?;
                let active = records
                    .iter()
                    .map(models::location_to_active)
                    .collect::<ImportExportResult<Vec<_>>>()?;
                self.insert_flat(&txn, kind, active).await?
            }
            EntityKind::SampleTaxon => {
                let records: Vec<SampleTaxonRecord> = decode_rows(&rows)?;
                let mut active = Vec::with_capacity(records.len());
                for (idx, record) in records.iter().enumerate() {
                    let link = link_sample_taxon(&txn, record)
                        .await
                        .map_err(|e| ImportExportError::at_line(line_number(idx), e))?;
                    active.push(link);
                }
                self.insert_flat(&txn, kind, active).await?
            }
            EntityKind::SamplePesticides => {
                let records: Vec<SamplePesticideRecord> = decode_rows(&rows)?;
                let mut active = Vec::with_capacity(records.len());
                for (idx, record) in records.iter().enumerate() {
                    let link = link_sample_pesticide(&txn, record)
                        .await
                        .map_err(|e| ImportExportError::at_line(line_number(idx), e))?;
                    active.push(link);
                }
                self.insert_flat(&txn, kind, active).await?
            }
            EntityKind::SampleContributions => {
                let records: Vec<SampleContributionRecord> = decode_rows(&rows)?;
                let mut active = Vec::with_capacity(records.len());
                for (idx, record) in records.iter().enumerate() {
                    let link = link_sample_contribution(&txn, record)
                        .await
                        .map_err(|e| ImportExportError::at_line(line_number(idx), e))?;
                    active.push(link);
                }
                self.insert_flat(&txn, kind, active).await?
            }
            EntityKind::LocationHistory => {
                let records: Vec<LocationHistoryRecord> = decode_rows(&rows)?;
                let mut active = Vec::with_capacity(records.len());
                for (idx, record) in records.iter().enumerate() {
                    let link = link_location_history(&txn, record)
                        .await
                        .map_err(|e| ImportExportError::at_line(line_number(idx), e))?;
                    active.push(link);
                }
                self.insert_flat(&txn, kind, active).await?
            }
            EntityKind::Phenotypes => {
                let records: Vec<PhenotypeRecord> = decode_rows(&rows)?;
                let mut active = Vec::with_capacity(records.len());
                for (idx, record) in records.iter().enumerate() {
                    let link = link_phenotype(&txn, record)
                        .await
                        .map_err(|e| ImportExportError::at_line(line_number(idx), e))?;
                    active.push(link);
                }
                self.insert_flat(&txn, kind, active).await?
            }
        };

        txn.commit()
            .await
            .map_err(ImportExportError::TransactionFailure)?;

        info!(
            "Imported {} {} records and {} edges",
            result.records_inserted, kind, result.edges_inserted
        );
        Ok(ImportResult {
            rows_read: rows.len(),
            ..result
        })
    }

    async fn import_taxa<C: ConnectionTrait>(
        &self,
        conn: &C,
        taxa: Vec<TaxonRecord>,
    ) -> ImportExportResult<ImportResult> {
        let mut probe = external_parents(&taxa);
        probe.push(ROOT_TAXID);
        let stored = self.stored_taxids(conn, &probe).await?;
        debug!("{} of {} referenced taxa already stored", stored.len(), probe.len());

        let tree = hierarchy::build_taxonomy(taxa, &stored)?;
        let active = tree
            .insertion_order()
            .map(models::taxon_to_active)
            .collect::<ImportExportResult<Vec<_>>>()?;

        let mut result = ImportResult::new(EntityKind::Taxon, tree.len());
        result.records_inserted = self.insert_chunked(conn, active).await?;
        Ok(result)
    }

    async fn import_pesticides<C: ConnectionTrait>(
        &self,
        conn: &C,
        pesticides: Vec<PesticideRecord>,
    ) -> ImportExportResult<ImportResult> {
        let mut ids = self
            .stored_pesticide_ids(conn, &external_parents(&pesticides))
            .await?;
        let stored: HashSet<String> = ids.keys().cloned().collect();

        let dag = hierarchy::build_dag(pesticides, &stored)?;
        let active = dag
            .insertion_order()
            .map(models::pesticide_to_active)
            .collect::<ImportExportResult<Vec<_>>>()?;

        let mut result = ImportResult::new(EntityKind::Pesticides, dag.len());
        result.records_inserted = self.insert_chunked(conn, active).await?;

        let names: Vec<String> = dag.insertion_order().map(|p| p.name.clone()).collect();
        ids.extend(self.stored_pesticide_ids(conn, &names).await?);

        let pesticide_id = |name: &String| {
            ids.get(name)
                .copied()
                .ok_or_else(|| ImportExportError::ReferenceNotFound {
                    entity: "pesticide",
                    key: name.clone(),
                })
        };
        let edges = dag
            .edges()
            .into_iter()
            .map(|(child, parent, position)| {
                Ok(pesticide_adjacency::ActiveModel {
                    child_id: Set(pesticide_id(&child)?),
                    parent_id: Set(pesticide_id(&parent)?),
                    position: Set(position as i32),
                    ..Default::default()
                })
            })
            .collect::<ImportExportResult<Vec<_>>>()?;
        result.edges_inserted = self.insert_chunked(conn, edges).await?;
        Ok(result)
    }

    async fn import_samples<C: ConnectionTrait>(
        &self,
        conn: &C,
        samples: Vec<SampleRecord>,
    ) -> ImportExportResult<ImportResult> {
        let stored = self
            .stored_sample_ids(conn, &external_parents(&samples))
            .await?;

        let dag = hierarchy::build_dag(samples, &stored)?;
        let active = dag
            .insertion_order()
            .map(models::sample_to_active)
            .collect::<ImportExportResult<Vec<_>>>()?;

        let mut result = ImportResult::new(EntityKind::Samples, dag.len());
        result.records_inserted = self.insert_chunked(conn, active).await?;

        let edges: Vec<sample_adjacency::ActiveModel> = dag
            .edges()
            .into_iter()
            .map(|(child, parent, position)| sample_adjacency::ActiveModel {
                child_id: Set(child),
                parent_id: Set(parent),
                position: Set(position as i32),
                ..Default::default()
            })
            .collect();
        result.edges_inserted = self.insert_chunked(conn, edges).await?;
        Ok(result)
    }

    async fn insert_flat<C, A>(
        &self,
        conn: &C,
        kind: EntityKind,
        active: Vec<A>,
    ) -> ImportExportResult<ImportResult>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let mut result = ImportResult::new(kind, active.len());
        result.records_inserted = self.insert_chunked(conn, active).await?;
        Ok(result)
    }

    /// Bulk insert in statements of at most `chunk_size` rows
    async fn insert_chunked<C, A>(&self, conn: &C, active: Vec<A>) -> ImportExportResult<usize>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let total = active.len();
        let chunk_size = self.options.chunk_size.max(1);
        let mut remaining = active.into_iter().peekable();
        while remaining.peek().is_some() {
            let chunk: Vec<A> = remaining.by_ref().take(chunk_size).collect();
            debug!("Inserting {} rows", chunk.len());
            <A::Entity as EntityTrait>::insert_many(chunk)
                .exec_without_returning(conn)
                .await?;
        }
        Ok(total)
    }

    async fn stored_taxids<C: ConnectionTrait>(
        &self,
        conn: &C,
        taxids: &[i64],
    ) -> ImportExportResult<HashSet<i64>> {
        let mut stored = HashSet::new();
        for chunk in taxids.chunks(self.options.chunk_size.max(1)) {
            let found: Vec<i64> = taxa::Entity::find()
                .select_only()
                .column(taxa::Column::Taxid)
                .filter(taxa::Column::Taxid.is_in(chunk.iter().copied()))
                .into_tuple::<i64>()
                .all(conn)
                .await?;
            stored.extend(found);
        }
        Ok(stored)
    }

    async fn stored_sample_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: &[String],
    ) -> ImportExportResult<HashSet<String>> {
        let mut stored = HashSet::new();
        for chunk in ids.chunks(self.options.chunk_size.max(1)) {
            let found: Vec<String> = samples::Entity::find()
                .select_only()
                .column(samples::Column::Id)
                .filter(samples::Column::Id.is_in(chunk.iter().cloned()))
                .into_tuple::<String>()
                .all(conn)
                .await?;
            stored.extend(found);
        }
        Ok(stored)
    }

    async fn stored_pesticide_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        names: &[String],
    ) -> ImportExportResult<HashMap<String, i32>> {
        let mut stored = HashMap::new();
        for chunk in names.chunks(self.options.chunk_size.max(1)) {
            let found: Vec<(String, i32)> = pesticides::Entity::find()
                .select_only()
                .column(pesticides::Column::Name)
                .column(pesticides::Column::Id)
                .filter(pesticides::Column::Name.is_in(chunk.iter().cloned()))
                .into_tuple::<(String, i32)>()
                .all(conn)
                .await?;
            stored.extend(found);
        }
        Ok(stored)
    }
}

async fn link_sample_taxon<C: ConnectionTrait>(
    conn: &C,
    record: &SampleTaxonRecord,
) -> ImportExportResult<sample_taxa::ActiveModel> {
    let sample = resolver::resolve_sample(conn, &record.sample_id).await?;
    let taxon = resolver::resolve_taxon(conn, record.taxid).await?;
    models::sample_taxon_to_active(record, &sample, &taxon)
}

async fn link_sample_pesticide<C: ConnectionTrait>(
    conn: &C,
    record: &SamplePesticideRecord,
) -> ImportExportResult<sample_pesticides::ActiveModel> {
    let sample = resolver::resolve_sample(conn, &record.sample_id).await?;
    let pesticide = resolver::resolve_pesticide(conn, &record.pesticide_name).await?;
    Ok(models::sample_pesticide_to_active(record, &sample, &pesticide))
}

async fn link_sample_contribution<C: ConnectionTrait>(
    conn: &C,
    record: &SampleContributionRecord,
) -> ImportExportResult<sample_contributions::ActiveModel> {
    let sample = resolver::resolve_sample(conn, &record.sample_id).await?;
    let contributor = resolver::resolve_contributor(conn, &record.contributor_name).await?;
    Ok(models::sample_contribution_to_active(record, &sample, &contributor))
}

async fn link_location_history<C: ConnectionTrait>(
    conn: &C,
    record: &LocationHistoryRecord,
) -> ImportExportResult<location_histories::ActiveModel> {
    let location = resolver::resolve_location(conn, &record.location_name).await?;
    models::location_history_to_active(record, &location)
}

async fn link_phenotype<C: ConnectionTrait>(
    conn: &C,
    record: &PhenotypeRecord,
) -> ImportExportResult<phenotypes::ActiveModel> {
    let sample = resolver::resolve_sample(conn, &record.sample_id).await?;
    models::phenotype_to_active(record, &sample)
}
