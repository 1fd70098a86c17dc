//! Conversion of the NCBI taxonomy dump (`nodes.dmp`, `names.dmp`) into taxon
//! rows, with optional custom taxa appended.
//!
//! Dump fields are separated by `\t|\t` and every line ends in `\t|`.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use tracing::{debug, info};

use crate::codec::{self, Cell, FlatRow};
use crate::data_loader;
use crate::errors::{ImportExportError, ImportExportResult};
use crate::export;
use crate::rows::{EntityKind, TableRow, TaxonRecord};

pub const SCIENTIFIC_NAME: &str = "scientific name";

/// One line of `nodes.dmp`
#[derive(Debug, Clone, PartialEq)]
pub struct NcbiNode {
    pub taxid: i64,
    pub parent_taxid: i64,
    pub rank: Option<String>,
}

/// One line of `names.dmp`
#[derive(Debug, Clone, PartialEq)]
pub struct NcbiName {
    pub taxid: i64,
    pub name: String,
    pub unique_name: Option<String>,
    pub name_class: String,
}

/// Names of one taxon after grouping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonNames {
    pub scientific: Option<String>,
    /// Every distinct name, then every distinct unique name
    pub alt_names: Vec<String>,
}

fn dump_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader)
}

fn field<'a>(record: &'a StringRecord, idx: usize, column: &str) -> ImportExportResult<&'a str> {
    record
        .get(idx)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ImportExportError::MissingRequiredField(column.to_string()))
}

fn read_dump<R, T, F>(reader: R, parse: F) -> ImportExportResult<Vec<T>>
where
    R: Read,
    F: Fn(&StringRecord) -> ImportExportResult<T>,
{
    let mut rdr = dump_reader(reader);
    let mut parsed = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        parsed.push(parse(&record).map_err(|e| ImportExportError::at_line(idx + 1, e))?);
    }
    Ok(parsed)
}

pub fn read_nodes<R: Read>(reader: R) -> ImportExportResult<Vec<NcbiNode>> {
    read_dump(reader, |record| {
        Ok(NcbiNode {
            taxid: codec::decode_number("taxid", field(record, 0, "taxid")?)?,
            parent_taxid: codec::decode_number("parent_taxid", field(record, 1, "parent_taxid")?)?,
            rank: record
                .get(2)
                .and_then(|rank| Cell::from_text(rank).as_text().map(str::to_string)),
        })
    })
}

pub fn read_names<R: Read>(reader: R) -> ImportExportResult<Vec<NcbiName>> {
    read_dump(reader, |record| {
        Ok(NcbiName {
            taxid: codec::decode_number("taxid", field(record, 0, "taxid")?)?,
            name: field(record, 1, "name")?.to_string(),
            unique_name: record.get(2).filter(|u| !u.is_empty()).map(str::to_string),
            name_class: field(record, 3, "name_class")?.to_string(),
        })
    })
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Group names by taxid. The first scientific name wins.
pub fn group_names(names: &[NcbiName]) -> HashMap<i64, TaxonNames> {
    let mut plain: HashMap<i64, (Option<String>, Vec<String>, Vec<String>)> = HashMap::new();
    for entry in names {
        let (scientific, all, unique) = plain.entry(entry.taxid).or_default();
        if scientific.is_none() && entry.name_class == SCIENTIFIC_NAME {
            *scientific = Some(entry.name.clone());
        }
        push_distinct(all, &entry.name);
        if let Some(unique_name) = &entry.unique_name {
            push_distinct(unique, unique_name);
        }
    }

    plain
        .into_iter()
        .map(|(taxid, (scientific, mut alt_names, unique))| {
            alt_names.extend(unique);
            (
                taxid,
                TaxonNames {
                    scientific,
                    alt_names,
                },
            )
        })
        .collect()
}

/// Join nodes with their names. Nodes without any name are dropped.
pub fn to_taxa(nodes: Vec<NcbiNode>, names: &[NcbiName]) -> ImportExportResult<Vec<TaxonRecord>> {
    let mut grouped = group_names(names);
    let mut taxa = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Some(taxon_names) = grouped.remove(&node.taxid) else {
            debug!("Skipping unnamed taxon {}", node.taxid);
            continue;
        };
        let name = taxon_names.scientific.ok_or_else(|| {
            ImportExportError::malformed("name", node.taxid.to_string(), "no scientific name")
        })?;
        taxa.push(TaxonRecord {
            taxid: node.taxid,
            name,
            rank: node.rank,
            alt_names: taxon_names.alt_names,
            parent_taxid: Some(node.parent_taxid),
        });
    }
    Ok(taxa)
}

/// Custom taxa in the taxon TSV layout
pub fn read_custom<R: Read>(reader: R) -> ImportExportResult<Vec<TaxonRecord>> {
    data_loader::read_rows(reader, EntityKind::Taxon)?
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            TaxonRecord::from_row(row).map_err(|e| ImportExportError::at_line(idx + 2, e))
        })
        .collect()
}

/// Append custom taxa. Custom taxids are negative and every custom parent
/// must be an NCBI taxon or another custom taxon.
pub fn append_custom(taxa: &mut Vec<TaxonRecord>, custom: Vec<TaxonRecord>) -> ImportExportResult<()> {
    let known: HashSet<i64> = taxa
        .iter()
        .chain(custom.iter())
        .map(|taxon| taxon.taxid)
        .collect();

    for taxon in &custom {
        if taxon.taxid >= 0 {
            return Err(ImportExportError::malformed(
                "taxid",
                taxon.taxid.to_string(),
                "custom taxids are negative",
            ));
        }
        let parent = taxon
            .parent_taxid
            .ok_or_else(|| ImportExportError::MissingRequiredField("parent_taxid".to_string()))?;
        if !known.contains(&parent) {
            return Err(ImportExportError::DanglingParentReference {
                child: taxon.taxid.to_string(),
                parent: parent.to_string(),
            });
        }
    }

    taxa.extend(custom);
    Ok(())
}

/// Convert dumps to a taxon TSV on `writer`; returns the number of rows written
pub fn convert<N, A, C, W>(nodes: N, names: A, custom: Option<C>, writer: W) -> ImportExportResult<usize>
where
    N: Read,
    A: Read,
    C: Read,
    W: Write,
{
    let names = read_names(names)?;
    let mut taxa = to_taxa(read_nodes(nodes)?, &names)?;
    info!("Converted {} NCBI taxa", taxa.len());

    if let Some(custom) = custom {
        let custom = read_custom(custom)?;
        info!("Appending {} custom taxa", custom.len());
        append_custom(&mut taxa, custom)?;
    }

    let rows = taxa
        .iter()
        .map(TaxonRecord::to_row)
        .collect::<ImportExportResult<Vec<FlatRow>>>()?;
    export::write_rows(writer, EntityKind::Taxon.columns(), &rows)?;
    Ok(rows.len())
}
