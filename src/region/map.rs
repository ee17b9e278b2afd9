//! Spatial index over the regions of one render.

use super::Region;
use crate::document::{SegmentKey, SegmentKind};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Kinds skipped by [`RegionMap::find_region`].
pub const DEFAULT_IGNORED: &[SegmentKind] = &[SegmentKind::Border, SegmentKind::PrintSpace];

/// A region and its indexed children.
#[derive(Debug, Clone)]
pub struct RegionNode {
    region: Region,
    children: Vec<usize>,
}

impl RegionNode {
    /// The region of this node.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Region tree built during compositing.
///
/// Nodes live in an arena; `roots` and each node's `children` hold arena
/// indices in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    nodes: Vec<RegionNode>,
    roots: Vec<usize>,
    node_by_key: HashMap<SegmentKey, usize>,
    region_by_id: HashMap<String, usize>,
    // ancestors that were not indexed when one of their descendants was
    passed_over: HashSet<SegmentKey>,
}

impl RegionMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed regions.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index `region` under its nearest indexed ancestor, or at the root.
    ///
    /// Parents must be inserted before their children. When a region
    /// arrives after one of its descendants has already been attached
    /// elsewhere, it is still indexed but [`Error::RegionOrder`] is
    /// returned. Inserting the same segment twice replaces the stored
    /// region and keeps its position.
    pub fn insert(&mut self, region: Region) -> Result<()> {
        let key = region.key();

        if let Some(&index) = self.node_by_key.get(&key) {
            self.index_id(&region, index);
            self.nodes[index].region = region;
            return Ok(());
        }

        let mut parent = None;
        for ancestor in region.breadcrumbs().iter().skip(1) {
            if let Some(&index) = self.node_by_key.get(&ancestor.key) {
                parent = Some(index);
                break;
            }
            self.passed_over.insert(ancestor.key);
        }

        let index = self.nodes.len();
        self.index_id(&region, index);
        self.node_by_key.insert(key, index);
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.roots.push(index),
        }
        self.nodes.push(RegionNode {
            region,
            children: Vec::new(),
        });

        if self.passed_over.contains(&key) {
            return Err(Error::RegionOrder { region: key });
        }
        Ok(())
    }

    fn index_id(&mut self, region: &Region, index: usize) {
        if !region.id().is_empty() {
            self.region_by_id.insert(region.id().to_string(), index);
        }
    }

    /// Deepest region strictly containing `(x, y)`, skipping borders and
    /// print spaces.
    pub fn find_region(&self, x: f64, y: f64) -> Option<&Region> {
        self.find_region_ignoring(x, y, DEFAULT_IGNORED)
    }

    /// Deepest region strictly containing `(x, y)` whose kind is not in
    /// `ignore`.
    ///
    /// Containing regions are collected depth-first in insertion order and
    /// the last eligible one wins, so a nested region beats its ancestors
    /// and a later sibling beats an earlier overlapping one.
    pub fn find_region_ignoring(&self, x: f64, y: f64, ignore: &[SegmentKind]) -> Option<&Region> {
        let mut hits = Vec::new();
        self.collect_hits(&self.roots, x, y, &mut hits);
        hits.into_iter()
            .rev()
            .map(|i| &self.nodes[i].region)
            .find(|r| !ignore.contains(&r.kind()))
    }

    /// All regions containing `(x, y)`, outermost first.
    pub fn find_regions(&self, x: f64, y: f64) -> Vec<&Region> {
        let mut hits = Vec::new();
        self.collect_hits(&self.roots, x, y, &mut hits);
        hits.into_iter().map(|i| &self.nodes[i].region).collect()
    }

    fn collect_hits(&self, level: &[usize], x: f64, y: f64, hits: &mut Vec<usize>) {
        for &index in level {
            let node = &self.nodes[index];
            if node.region.contains(x, y) {
                hits.push(index);
                self.collect_hits(&node.children, x, y, hits);
            }
        }
    }

    /// Region with the given segment id.
    pub fn lookup_by_id(&self, id: &str) -> Option<&Region> {
        self.region_by_id.get(id).map(|&i| &self.nodes[i].region)
    }

    /// Region of the given segment.
    pub fn get(&self, key: SegmentKey) -> Option<&Region> {
        self.node(key).map(RegionNode::region)
    }

    /// Tree node of the given segment.
    pub fn node(&self, key: SegmentKey) -> Option<&RegionNode> {
        self.node_by_key.get(&key).map(|&i| &self.nodes[i])
    }

    /// Resolve a region from an earlier render against this map by id.
    pub fn refetch(&self, region: &Region) -> Option<&Region> {
        if region.id().is_empty() {
            return None;
        }
        self.lookup_by_id(region.id())
    }

    /// Indexed ancestors of `key`, nearest first.
    pub fn breadcrumbs(&self, key: SegmentKey) -> Vec<&Region> {
        self.get(key)
            .map(|region| {
                region
                    .breadcrumbs()
                    .iter()
                    .skip(1)
                    .filter_map(|a| self.get(a.key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &RegionNode> + '_ {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    /// Children of `node` in insertion order.
    pub fn children<'a>(
        &'a self,
        node: &'a RegionNode,
    ) -> impl Iterator<Item = &'a RegionNode> + 'a {
        node.children.iter().map(|&i| &self.nodes[i])
    }

    /// All regions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> + '_ {
        self.nodes.iter().map(RegionNode::region)
    }
}
