//! Scene graph builder
//!
//! The construction phase of the scene graph. Scenes are named from their
//! site and capability, edges are checked as they are added, and `build()`
//! rejects graphs in which some scene cannot reach every other.

use super::{Edge, Scene, SceneGraph, SceneId};
use crate::gesture::GestureBatch;
use crate::site::{Capability, Site};
use indexmap::IndexMap;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;

/// Error type for graph builder operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphBuildError {
    DuplicateScene(String),
    SceneNotFound(SceneId),
    SelfLoop(SceneId),
    EdgeAlreadyExists { from: SceneId, to: SceneId },
    NotStronglyConnected { components: usize },
}

impl std::fmt::Display for GraphBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for GraphBuildError {}

/// Builder for scene graphs
///
/// Usage:
/// ```rust,ignore
/// let mut builder = SceneGraphBuilder::new();
/// let hub = builder.add_scene(Site::Mander, Capability::Hub)?;
/// let urban = builder.add_scene(Site::Mander, Capability::Urban)?;
/// builder.link(hub, urban, enter_urban, escape)?;
/// let graph = builder.build()?;
/// ```
#[derive(Debug, Default)]
pub struct SceneGraphBuilder {
    scenes: Vec<Scene>,
    by_name: HashMap<String, SceneId>,
    edges: Vec<IndexMap<SceneId, Edge>>,
}

impl SceneGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(IndexMap::len).sum()
    }

    /// Add a scene
    ///
    /// Returns the scene ID for use in edge construction.
    pub fn add_scene(&mut self, site: Site, capability: Capability) -> Result<SceneId, GraphBuildError> {
        let name = capability.scene_name(site);
        if self.by_name.contains_key(&name) {
            return Err(GraphBuildError::DuplicateScene(name));
        }
        let id = SceneId(self.scenes.len());
        self.by_name.insert(name.clone(), id);
        self.scenes.push(Scene {
            id,
            name,
            site,
            capability,
        });
        self.edges.push(IndexMap::new());
        Ok(id)
    }

    /// Scene already added for a site and capability
    #[must_use]
    pub fn scene_id(&self, site: Site, capability: Capability) -> Option<SceneId> {
        self.by_name.get(&capability.scene_name(site)).copied()
    }

    /// Add a directed edge
    pub fn add_edge(&mut self, from: SceneId, to: SceneId, edge: Edge) -> Result<(), GraphBuildError> {
        if from.0 >= self.scenes.len() {
            return Err(GraphBuildError::SceneNotFound(from));
        }
        if to.0 >= self.scenes.len() {
            return Err(GraphBuildError::SceneNotFound(to));
        }
        if from == to {
            return Err(GraphBuildError::SelfLoop(from));
        }

        let outgoing = &mut self.edges[from.0];
        if outgoing.contains_key(&to) {
            return Err(GraphBuildError::EdgeAlreadyExists { from, to });
        }
        outgoing.insert(to, edge);
        Ok(())
    }

    /// Add a forward gesture edge and its way back
    pub fn link(
        &mut self,
        a: SceneId,
        b: SceneId,
        forward: GestureBatch,
        back: GestureBatch,
    ) -> Result<(), GraphBuildError> {
        self.add_edge(a, b, Edge::Gestures(forward))?;
        self.add_edge(b, a, Edge::Gestures(back))
    }

    /// Validate and freeze the graph
    ///
    /// Once built, the graph cannot be modified.
    pub fn build(self) -> Result<SceneGraph, GraphBuildError> {
        let mut topology = DiGraphMap::new();
        for scene in &self.scenes {
            topology.add_node(scene.id);
        }
        for (from, outgoing) in self.edges.iter().enumerate() {
            for &to in outgoing.keys() {
                topology.add_edge(SceneId(from), to, ());
            }
        }

        let components = petgraph::algo::kosaraju_scc(&topology).len();
        if components > 1 {
            return Err(GraphBuildError::NotStronglyConnected { components });
        }

        Ok(SceneGraph {
            scenes: self.scenes,
            edges: self.edges,
            by_name: self.by_name,
            topology,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Rail;
    use resonance_device::Point;

    fn tap() -> GestureBatch {
        GestureBatch::new().tap(Point::new(1, 1))
    }

    #[test]
    fn test_builder_creates_scenes() {
        let mut builder = SceneGraphBuilder::new();
        let a = builder.add_scene(Site::Mander, Capability::Hub).unwrap();
        let b = builder.add_scene(Site::Mander, Capability::Urban).unwrap();
        assert_ne!(a, b);
        assert_eq!(builder.scene_count(), 2);
        assert_eq!(builder.scene_id(Site::Mander, Capability::Urban), Some(b));
    }

    #[test]
    fn test_duplicate_scene_rejected() {
        let mut builder = SceneGraphBuilder::new();
        builder.add_scene(Site::Brcl, Capability::Hub).unwrap();
        assert!(matches!(
            builder.add_scene(Site::Brcl, Capability::Hub),
            Err(GraphBuildError::DuplicateScene(name)) if name == "铁盟哨站主界面"
        ));
    }

    #[test]
    fn test_add_edge_rejects_self_loop_and_duplicates() {
        let mut builder = SceneGraphBuilder::new();
        let a = builder.add_scene(Site::Mander, Capability::Hub).unwrap();
        let b = builder.add_scene(Site::Brcl, Capability::Hub).unwrap();

        assert_eq!(
            builder.add_edge(a, a, Edge::Gestures(tap())),
            Err(GraphBuildError::SelfLoop(a))
        );
        builder.add_edge(a, b, Edge::Rail(Rail::new(Site::Mander, Site::Brcl))).unwrap();
        assert_eq!(
            builder.add_edge(a, b, Edge::Gestures(tap())),
            Err(GraphBuildError::EdgeAlreadyExists { from: a, to: b })
        );
    }

    #[test]
    fn test_unknown_scene_rejected() {
        let mut builder = SceneGraphBuilder::new();
        let a = builder.add_scene(Site::Mander, Capability::Hub).unwrap();
        assert_eq!(
            builder.add_edge(a, SceneId(7), Edge::Gestures(tap())),
            Err(GraphBuildError::SceneNotFound(SceneId(7)))
        );
    }

    #[test]
    fn test_one_way_graph_fails_validation() {
        let mut builder = SceneGraphBuilder::new();
        let a = builder.add_scene(Site::Mander, Capability::Hub).unwrap();
        let b = builder.add_scene(Site::Mander, Capability::Urban).unwrap();
        builder.add_edge(a, b, Edge::Gestures(tap())).unwrap();

        assert_eq!(
            builder.build().unwrap_err(),
            GraphBuildError::NotStronglyConnected { components: 2 }
        );
    }

    #[test]
    fn test_linked_pair_builds() {
        let mut builder = SceneGraphBuilder::new();
        let a = builder.add_scene(Site::Mander, Capability::Hub).unwrap();
        let b = builder.add_scene(Site::Mander, Capability::Urban).unwrap();
        builder.link(a, b, tap(), tap()).unwrap();

        let graph = builder.build().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.find("曼德矿场市区"), Some(b));
    }
}
