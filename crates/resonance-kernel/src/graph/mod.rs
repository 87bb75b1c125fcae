//! Scene graph
//!
//! Two-phase: scenes and edges are added to a `SceneGraphBuilder`, which
//! validates the result once and hands out an immutable `SceneGraph`.
//! Adjacency keeps insertion order, so breadth-first search breaks ties by
//! the order in which edges were wired.

mod builder;
mod catalog;

pub use builder::{GraphBuildError, SceneGraphBuilder};
pub use catalog::standard_builder;

use crate::gesture::GestureBatch;
use crate::site::{Capability, Site};
use indexmap::IndexMap;
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Index of a scene inside the graph that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(usize);

impl SceneId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cross-site journey between two hubs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rail {
    pub from: Site,
    pub to: Site,
}

impl Rail {
    #[must_use]
    pub const fn new(from: Site, to: Site) -> Self {
        Self { from, to }
    }
}

/// How to move along an edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// Local transition replayed on the current screen
    Gestures(GestureBatch),
    /// Cross-site transition through the rail map
    Rail(Rail),
}

/// A recognizable screen of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    pub site: Site,
    pub capability: Capability,
}

/// Validated, immutable scene graph
#[derive(Debug, Clone)]
pub struct SceneGraph {
    scenes: Vec<Scene>,
    edges: Vec<IndexMap<SceneId, Edge>>,
    by_name: HashMap<String, SceneId>,
    topology: DiGraphMap<SceneId, ()>,
}

impl SceneGraph {
    /// The full catalog of sites and scenes
    ///
    /// # Errors
    /// Only if the catalog wiring itself is inconsistent.
    pub fn standard() -> Result<Self, GraphBuildError> {
        standard_builder()?.build()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(IndexMap::len).sum()
    }

    /// Scene by id
    ///
    /// # Panics
    /// If `id` was issued by a different graph.
    #[must_use]
    pub fn scene(&self, id: SceneId) -> &Scene {
        &self.scenes[id.0]
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Exact-name lookup
    #[must_use]
    pub fn find(&self, name: &str) -> Option<SceneId> {
        self.by_name.get(name).copied()
    }

    /// Scene of a given capability at a site
    #[must_use]
    pub fn lookup(&self, site: Site, capability: Capability) -> Option<SceneId> {
        self.find(&capability.scene_name(site))
    }

    #[must_use]
    pub fn hub(&self, site: Site) -> Option<SceneId> {
        self.lookup(site, Capability::Hub)
    }

    /// Outgoing edges in wiring order
    ///
    /// # Panics
    /// If `id` was issued by a different graph.
    #[must_use]
    pub fn neighbors(&self, id: SceneId) -> &IndexMap<SceneId, Edge> {
        &self.edges[id.0]
    }

    #[must_use]
    pub fn edge(&self, from: SceneId, to: SceneId) -> Option<&Edge> {
        self.edges.get(from.0)?.get(&to)
    }

    /// Breadth-first shortest path
    ///
    /// The returned path excludes `from` and ends with `to`; it is empty
    /// when `from == to` and `None` when `to` is unreachable.
    #[must_use]
    pub fn shortest_path(&self, from: SceneId, to: SceneId) -> Option<Vec<SceneId>> {
        if from == to {
            return Some(Vec::new());
        }
        let mut parent: HashMap<SceneId, SceneId> = HashMap::new();
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(node) = queue.pop_front() {
            for &next in self.edges.get(node.0)?.keys() {
                if !visited.insert(next) {
                    continue;
                }
                parent.insert(next, node);
                if next == to {
                    return Some(unwind(&parent, from, to));
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Edge count of the shortest path, computed independently of BFS
    #[must_use]
    pub fn distance(&self, from: SceneId, to: SceneId) -> Option<usize> {
        petgraph::algo::dijkstra(&self.topology, from, Some(to), |_| 1usize)
            .get(&to)
            .copied()
    }
}

fn unwind(parent: &HashMap<SceneId, SceneId>, from: SceneId, to: SceneId) -> Vec<SceneId> {
    let mut path = vec![to];
    let mut cursor = to;
    while let Some(&prev) = parent.get(&cursor) {
        if prev == from {
            break;
        }
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(graph: &SceneGraph, path: &[SceneId]) -> Vec<String> {
        path.iter().map(|id| graph.scene(*id).name.clone()).collect()
    }

    #[test]
    fn test_route_to_self_is_empty() {
        let graph = SceneGraph::standard().unwrap();
        for scene in graph.scenes() {
            assert_eq!(graph.shortest_path(scene.id, scene.id), Some(vec![]));
        }
    }

    #[test]
    fn test_hub_to_hub_is_one_rail() {
        let graph = SceneGraph::standard().unwrap();
        let a = graph.hub(Site::Shoggolith).unwrap();
        let b = graph.hub(Site::Freeport).unwrap();
        let path = graph.shortest_path(a, b).unwrap();
        assert_eq!(path, vec![b]);
        assert_eq!(
            graph.edge(a, b),
            Some(&Edge::Rail(Rail::new(Site::Shoggolith, Site::Freeport)))
        );
    }

    #[test]
    fn test_exchange_buy_across_sites() {
        let graph = SceneGraph::standard().unwrap();
        let from = graph.lookup(Site::Mander, Capability::ExchangeSell).unwrap();
        let to = graph.lookup(Site::Clarity, Capability::ExchangeBuy).unwrap();
        let path = graph.shortest_path(from, to).unwrap();
        assert_eq!(
            names(&graph, &path),
            vec![
                "曼德矿场交易所",
                "曼德矿场市区",
                "曼德矿场主界面",
                "澄明数据中心主界面",
                "澄明数据中心市区",
                "澄明数据中心交易所",
                "澄明数据中心交易所购买",
            ]
        );
        assert_eq!(graph.distance(from, to), Some(path.len()));
    }

    #[test]
    fn test_every_path_follows_existing_edges() {
        let graph = SceneGraph::standard().unwrap();
        let from = graph.lookup(Site::Freeport, Capability::ExpulsionBoard).unwrap();
        for scene in graph.scenes() {
            let path = graph.shortest_path(from, scene.id).unwrap();
            let mut current = from;
            for step in path {
                assert!(graph.edge(current, step).is_some());
                current = step;
            }
            assert_eq!(current, scene.id);
        }
    }
}
