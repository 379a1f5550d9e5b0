//! AnchorGraph — the aggregate root.
//!
//! A pure container. It checks referential integrity at write time only
//! (unique identities, unique path ids, known path id on neighbor
//! replacement). It does NOT validate `RoomNode::closest_path_id`; a room
//! whose path node is gone simply fails to route later.

use hashbrown::HashMap;

use super::{AnchorId, AnchorKind, AnchorRecord, NeighborList, PathId, PathNode, RoomNode};
use crate::{Error, Result};

/// Ordered collection of anchor records keyed by identity.
///
/// Record order carries no meaning except that encoding walks it, so
/// `decode(encode(g))` reproduces it for byte-stable saves.
#[derive(Debug, Clone, Default)]
pub struct AnchorGraph {
    records: Vec<AnchorRecord>,
    /// identity → index into `records`
    by_id: HashMap<AnchorId, usize>,
    /// path id → index into `records`
    by_path: HashMap<PathId, usize>,
}

impl AnchorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from records, applying the same checks as [`insert`](Self::insert).
    pub fn from_records(records: impl IntoIterator<Item = AnchorRecord>) -> Result<Self> {
        let mut graph = Self::new();
        for record in records {
            graph.insert(record)?;
        }
        Ok(graph)
    }

    /// Append a record.
    ///
    /// Fails with `DuplicateId` when a path node reuses an existing path id,
    /// and with `DuplicateAnchor` when the identity is already present.
    pub fn insert(&mut self, record: AnchorRecord) -> Result<()> {
        if self.by_id.contains_key(&record.id) {
            return Err(Error::DuplicateAnchor(record.id));
        }
        if let AnchorKind::Path(node) = &record.kind {
            if self.by_path.contains_key(&node.id) {
                return Err(Error::DuplicateId(node.id));
            }
        }

        let idx = self.records.len();
        self.by_id.insert(record.id, idx);
        if let AnchorKind::Path(node) = &record.kind {
            self.by_path.insert(node.id, idx);
        }
        self.records.push(record);
        Ok(())
    }

    /// Remove a record by identity, returning it.
    pub fn remove(&mut self, id: AnchorId) -> Result<AnchorRecord> {
        let idx = self.by_id.get(&id).copied().ok_or(Error::AnchorNotFound(id))?;
        let removed = self.records.remove(idx);
        self.reindex();
        Ok(removed)
    }

    pub fn find(&self, id: AnchorId) -> Option<&AnchorRecord> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    /// The anchor carrying path node `id`.
    pub fn find_path(&self, id: PathId) -> Option<&AnchorRecord> {
        self.by_path.get(&id).map(|&idx| &self.records[idx])
    }

    pub fn contains_path(&self, id: PathId) -> bool {
        self.by_path.contains_key(&id)
    }

    /// Path anchors in record order.
    pub fn path_nodes(&self) -> impl Iterator<Item = (&AnchorRecord, &PathNode)> {
        self.records.iter().filter_map(|rec| rec.as_path().map(|node| (rec, node)))
    }

    /// Room anchors in record order.
    pub fn room_nodes(&self) -> impl Iterator<Item = (&AnchorRecord, &RoomNode)> {
        self.records.iter().filter_map(|rec| rec.as_room().map(|room| (rec, room)))
    }

    /// Overwrite one path node's adjacency wholesale.
    pub fn replace_neighbors(&mut self, path_id: PathId, neighbors: NeighborList) -> Result<()> {
        let idx = self.by_path.get(&path_id).copied().ok_or(Error::PathNodeNotFound(path_id))?;
        match &mut self.records[idx].kind {
            AnchorKind::Path(node) => {
                node.neighbor_ids = neighbors;
                Ok(())
            }
            // by_path only ever points at path records
            _ => Err(Error::PathNodeNotFound(path_id)),
        }
    }

    pub fn records(&self) -> &[AnchorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.by_path.len()
    }

    pub fn room_count(&self) -> usize {
        self.room_nodes().count()
    }

    /// Highest path id in the graph, if any.
    pub fn max_path_id(&self) -> Option<PathId> {
        self.by_path.keys().copied().max()
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_path.clear();
        for (idx, record) in self.records.iter().enumerate() {
            self.by_id.insert(record.id, idx);
            if let AnchorKind::Path(node) = &record.kind {
                self.by_path.insert(node.id, idx);
            }
        }
    }
}

/// Structural equality: same records in the same order.
impl PartialEq for AnchorGraph {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}
