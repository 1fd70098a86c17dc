//! Tree and DAG reconstruction from unordered batches.
//!
//! The batch owns every node in an arena (`Vec<N>`); links between nodes are
//! indices. Building runs in two phases:
//!
//! 1. index: key every node, resolve each declared parent to either a batch
//!    index or a key already in storage, and record the child lists.
//! 2. attach: starting from the nodes that have no parent inside the batch,
//!    walk the child lists and emit nodes in parent-first order. A node with
//!    several batch parents is released once the last of them is attached.
//!
//! Nodes never attached in phase 2 sit on a parent cycle.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{self, Display};
use std::hash::Hash;

use tracing::debug;

use crate::errors::{ImportExportError, ImportExportResult};
use crate::rows::taxon::ROOT_TAXID;
use crate::rows::{PesticideRecord, SampleRecord, TaxonRecord};

/// A record that names itself and its parents by natural key
pub trait HierarchyNode {
    type Key: Clone + Eq + Hash + Display;

    fn key(&self) -> Self::Key;

    /// Declared parents, in order
    fn parent_keys(&self) -> Vec<Self::Key>;
}

/// Where a parent lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef<K> {
    /// Index of a node in the same batch
    Batch(usize),
    /// Key of a node that is already stored
    Stored(K),
}

/// A fully linked batch, ready to be written parent-first
pub struct Hierarchy<N: HierarchyNode> {
    nodes: Vec<N>,
    parents: Vec<Vec<ParentRef<N::Key>>>,
    children: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl<N> fmt::Debug for Hierarchy<N>
where
    N: HierarchyNode + fmt::Debug,
    N::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("nodes", &self.nodes)
            .field("parents", &self.parents)
            .field("order", &self.order)
            .finish()
    }
}

impl<N: HierarchyNode> Hierarchy<N> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in an order where every batch parent precedes its children
    pub fn insertion_order(&self) -> impl Iterator<Item = &N> + '_ {
        self.order.iter().map(move |&idx| &self.nodes[idx])
    }

    pub fn parents_of(&self, idx: usize) -> &[ParentRef<N::Key>] {
        &self.parents[idx]
    }

    pub fn children_of(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Nodes with no parent at all, in batch or in storage
    pub fn roots(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&idx| self.parents[idx].is_empty())
            .collect()
    }

    pub fn key_of(&self, parent: &ParentRef<N::Key>) -> N::Key {
        match parent {
            ParentRef::Batch(idx) => self.nodes[*idx].key(),
            ParentRef::Stored(key) => key.clone(),
        }
    }

    /// Every (child, parent, position) edge, following insertion order
    pub fn edges(&self) -> Vec<(N::Key, N::Key, usize)> {
        self.order
            .iter()
            .flat_map(|&idx| {
                let child = self.nodes[idx].key();
                self.parents[idx]
                    .iter()
                    .enumerate()
                    .map(move |(position, parent)| (child.clone(), self.key_of(parent), position))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Keys from `idx` up through its first parents until a root or a stored
    /// node is reached. The walk is finite because the batch is acyclic.
    pub fn lineage(&self, idx: usize) -> Vec<N::Key> {
        let mut keys = vec![self.nodes[idx].key()];
        let mut current = idx;
        while let Some(parent) = self.parents[current].first() {
            keys.push(self.key_of(parent));
            match parent {
                ParentRef::Batch(next) => current = *next,
                ParentRef::Stored(_) => break,
            }
        }
        keys
    }
}

/// Build a DAG: any number of parents per node, any number of roots.
///
/// `stored` holds the parent keys that already exist in storage.
pub fn build_dag<N: HierarchyNode>(
    nodes: Vec<N>,
    stored: &HashSet<N::Key>,
) -> ImportExportResult<Hierarchy<N>> {
    let declared: Vec<Vec<N::Key>> = nodes.iter().map(|node| node.parent_keys()).collect();
    build(nodes, declared, stored)
}

/// Build a tree rooted at `root`.
///
/// The root may declare no parent or itself as parent; every other node must
/// declare exactly one. The root must be in the batch or in `stored`, not both.
/// An empty batch builds an empty tree.
pub fn build_tree<N: HierarchyNode>(
    nodes: Vec<N>,
    root: &N::Key,
    stored: &HashSet<N::Key>,
) -> ImportExportResult<Hierarchy<N>> {
    if nodes.is_empty() {
        return build(nodes, Vec::new(), stored);
    }

    let mut declared = Vec::with_capacity(nodes.len());
    let mut batch_roots = 0usize;
    for node in &nodes {
        let key = node.key();
        let parents = node.parent_keys();
        if &key == root {
            if parents.iter().any(|parent| parent != root) {
                return Err(ImportExportError::MultipleOrMissingRoot(format!(
                    "root {} must not have a parent",
                    key
                )));
            }
            batch_roots += 1;
            declared.push(Vec::new());
        } else {
            match parents.len() {
                0 => {
                    return Err(ImportExportError::MultipleOrMissingRoot(format!(
                        "{} has no parent and is not the root {}",
                        key, root
                    )))
                }
                1 => declared.push(parents),
                n => {
                    return Err(ImportExportError::malformed(
                        "parent",
                        key.to_string(),
                        format!("tree nodes have exactly one parent, found {}", n),
                    ))
                }
            }
        }
    }

    let root_count = batch_roots + usize::from(stored.contains(root));
    if root_count == 0 {
        return Err(ImportExportError::MultipleOrMissingRoot(format!(
            "root {} is neither in the batch nor stored",
            root
        )));
    }
    if root_count > 1 {
        return Err(ImportExportError::MultipleOrMissingRoot(format!(
            "root {} appears more than once",
            root
        )));
    }

    build(nodes, declared, stored)
}

fn build<N: HierarchyNode>(
    nodes: Vec<N>,
    declared: Vec<Vec<N::Key>>,
    stored: &HashSet<N::Key>,
) -> ImportExportResult<Hierarchy<N>> {
    // Index phase
    let mut index: HashMap<N::Key, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if index.insert(node.key(), idx).is_some() {
            return Err(ImportExportError::DuplicateNaturalKey(node.key().to_string()));
        }
    }

    let mut parents = Vec::with_capacity(nodes.len());
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut pending = vec![0usize; nodes.len()];
    for (idx, keys) in declared.into_iter().enumerate() {
        let own = nodes[idx].key();
        let mut resolved = Vec::with_capacity(keys.len());
        for key in keys {
            if key == own {
                return Err(ImportExportError::CyclicReference(own.to_string()));
            }
            if let Some(&parent_idx) = index.get(&key) {
                children[parent_idx].push(idx);
                pending[idx] += 1;
                resolved.push(ParentRef::Batch(parent_idx));
            } else if stored.contains(&key) {
                resolved.push(ParentRef::Stored(key));
            } else {
                return Err(ImportExportError::DanglingParentReference {
                    child: own.to_string(),
                    parent: key.to_string(),
                });
            }
        }
        parents.push(resolved);
    }
    debug!("Indexed {} nodes", nodes.len());

    // Attach phase
    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&idx| pending[idx] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        for &child in &children[idx] {
            pending[child] -= 1;
            if pending[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    if order.len() < nodes.len() {
        let stuck = (0..nodes.len())
            .find(|&idx| pending[idx] > 0)
            .map(|idx| nodes[idx].key().to_string())
            .unwrap_or_default();
        return Err(ImportExportError::CyclicReference(stuck));
    }
    debug!("Attached {} nodes", order.len());

    Ok(Hierarchy {
        nodes,
        parents,
        children,
        order,
    })
}

impl HierarchyNode for TaxonRecord {
    type Key = i64;

    fn key(&self) -> i64 {
        self.taxid
    }

    fn parent_keys(&self) -> Vec<i64> {
        self.parent_taxid.into_iter().collect()
    }
}

impl HierarchyNode for PesticideRecord {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn parent_keys(&self) -> Vec<String> {
        self.parents.clone()
    }
}

impl HierarchyNode for SampleRecord {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn parent_keys(&self) -> Vec<String> {
        self.parents.clone()
    }
}

pub fn build_taxonomy(
    taxa: Vec<TaxonRecord>,
    stored: &HashSet<i64>,
) -> ImportExportResult<Hierarchy<TaxonRecord>> {
    build_tree(taxa, &ROOT_TAXID, stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{PesticideProductType, SamplePermission, SampleType};

    fn taxon(taxid: i64, parent: Option<i64>) -> TaxonRecord {
        TaxonRecord {
            taxid,
            name: format!("taxon {}", taxid),
            rank: None,
            alt_names: Vec::new(),
            parent_taxid: parent,
        }
    }

    fn pesticide(name: &str, parents: &[&str]) -> PesticideRecord {
        PesticideRecord {
            name: name.to_string(),
            pesticide_type: Vec::new(),
            product_type: PesticideProductType::Product,
            group: Vec::new(),
            notes: None,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn sample(id: &str, parents: &[&str]) -> SampleRecord {
        SampleRecord {
            id: id.to_string(),
            names: Vec::new(),
            sample_type: SampleType::Sample,
            date: None,
            date_resolution: None,
            details: Default::default(),
            permission: SamplePermission::Private,
            parents: parents.iter().map(|p| p.to_string()).collect(),
            geom: None,
            location_type: None,
            location_support: Default::default(),
        }
    }

    #[test]
    fn test_taxonomy_chain() {
        // children listed before their parents
        let batch = vec![taxon(3, Some(2)), taxon(1, None), taxon(2, Some(1))];
        let tree = build_taxonomy(batch, &HashSet::new()).unwrap();

        let order: Vec<i64> = tree.insertion_order().map(|t| t.taxid).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(tree.roots(), vec![1]);
        assert_eq!(tree.lineage(0), vec![3, 2, 1]);
        assert_eq!(tree.children_of(1), &[2][..]);
        assert_eq!(tree.children_of(2), &[0][..]);
        assert_eq!(tree.edges(), vec![(2, 1, 0), (3, 2, 0)]);
    }

    #[test]
    fn test_ncbi_root_points_at_itself() {
        let tree = build_taxonomy(vec![taxon(1, Some(1)), taxon(2, Some(1))], &HashSet::new()).unwrap();
        assert!(tree.parents_of(0).is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_dangling_taxon_parent() {
        let stored = HashSet::from([ROOT_TAXID]);
        let err = build_taxonomy(vec![taxon(5, Some(99))], &stored).unwrap_err();
        assert!(matches!(
            err,
            ImportExportError::DanglingParentReference { ref child, ref parent }
                if child == "5" && parent == "99"
        ));
    }

    #[test]
    fn test_stored_root_and_parents() {
        let stored = HashSet::from([ROOT_TAXID, 4751]);
        let tree = build_taxonomy(vec![taxon(45151, Some(4751)), taxon(-4, Some(45151))], &stored).unwrap();
        assert_eq!(tree.parents_of(0), &[ParentRef::Stored(4751)][..]);
        assert_eq!(tree.lineage(1), vec![-4, 45151, 4751]);
    }

    #[test]
    fn test_taxonomy_root_rules() {
        let missing = build_taxonomy(vec![taxon(2, Some(3)), taxon(3, Some(2))], &HashSet::new());
        assert!(matches!(missing, Err(ImportExportError::MultipleOrMissingRoot(_))));

        let orphan = build_taxonomy(vec![taxon(1, None), taxon(2, None)], &HashSet::new());
        assert!(matches!(orphan, Err(ImportExportError::MultipleOrMissingRoot(_))));

        let twice = build_taxonomy(vec![taxon(1, None)], &HashSet::from([ROOT_TAXID]));
        assert!(matches!(twice, Err(ImportExportError::MultipleOrMissingRoot(_))));
    }

    #[test]
    fn test_empty_taxonomy_batch() {
        let tree = build_taxonomy(Vec::new(), &HashSet::new()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.edges().is_empty());
    }

    #[test]
    fn test_taxonomy_cycle_below_root() {
        let batch = vec![taxon(1, None), taxon(2, Some(3)), taxon(3, Some(2))];
        let err = build_taxonomy(batch, &HashSet::new()).unwrap_err();
        assert!(matches!(err, ImportExportError::CyclicReference(_)));
    }

    #[test]
    fn test_sample_self_parent() {
        let err = build_dag(vec![sample("S001", &["S001"])], &HashSet::new()).unwrap_err();
        assert!(matches!(err, ImportExportError::CyclicReference(ref key) if key == "S001"));
    }

    #[test]
    fn test_sample_transitive_cycle() {
        let batch = vec![
            sample("S001", &[]),
            sample("S002", &["S001", "S004"]),
            sample("S003", &["S002"]),
            sample("S004", &["S003"]),
        ];
        let err = build_dag(batch, &HashSet::new()).unwrap_err();
        assert!(matches!(err, ImportExportError::CyclicReference(_)));
    }

    #[test]
    fn test_compound_with_two_stored_parents() {
        let stored = HashSet::from(["A".to_string(), "B".to_string()]);
        let dag = build_dag(vec![pesticide("Compound X", &["A", "B"])], &stored).unwrap();
        assert_eq!(
            dag.parents_of(0),
            &[
                ParentRef::Stored("A".to_string()),
                ParentRef::Stored("B".to_string())
            ][..]
        );
        assert!(dag.roots().is_empty());
    }

    #[test]
    fn test_dag_with_shared_child_and_several_roots() {
        let batch = vec![
            pesticide("Mix", &["Tebuconazole", "Azoxystrobin"]),
            pesticide("Azoxystrobin", &["Strobilurins"]),
            pesticide("Tebuconazole", &["Triazoles"]),
            pesticide("Triazoles", &[]),
            pesticide("Strobilurins", &[]),
        ];
        let dag = build_dag(batch, &HashSet::new()).unwrap();

        let order: Vec<&str> = dag.insertion_order().map(|p| p.name.as_str()).collect();
        let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(position("Triazoles") < position("Tebuconazole"));
        assert!(position("Strobilurins") < position("Azoxystrobin"));
        assert!(position("Tebuconazole") < position("Mix"));
        assert!(position("Azoxystrobin") < position("Mix"));
        assert_eq!(dag.roots(), vec![3, 4]);
        assert_eq!(dag.children_of(2), &[0][..]);
        assert_eq!(dag.children_of(1), &[0][..]);

        let mix_edges: Vec<(String, String, usize)> = dag
            .edges()
            .into_iter()
            .filter(|(child, _, _)| child == "Mix")
            .collect();
        assert_eq!(
            mix_edges,
            vec![
                ("Mix".to_string(), "Tebuconazole".to_string(), 0),
                ("Mix".to_string(), "Azoxystrobin".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = build_dag(vec![pesticide("A", &[]), pesticide("A", &[])], &HashSet::new()).unwrap_err();
        assert!(matches!(err, ImportExportError::DuplicateNaturalKey(ref key) if key == "A"));
    }

    #[test]
    fn test_dangling_pesticide_parent() {
        let err = build_dag(vec![pesticide("Compound X", &["A"])], &HashSet::new()).unwrap_err();
        assert!(matches!(err, ImportExportError::DanglingParentReference { .. }));
    }
}
