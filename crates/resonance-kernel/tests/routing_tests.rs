use async_trait::async_trait;
use proptest::prelude::*;
use resonance_kernel::prelude::*;
use resonance_kernel::Rail;
use resonance_test_utils::ScriptedReader;

#[derive(Default)]
struct RecordingDriver {
    gestures: usize,
    rails: Vec<Rail>,
}

#[async_trait]
impl TransitionDriver for RecordingDriver {
    async fn perform_gestures(&mut self, _batch: &GestureBatch) -> Result<(), NavError> {
        self.gestures += 1;
        Ok(())
    }

    async fn travel(&mut self, rail: Rail) -> Result<(), NavError> {
        self.rails.push(rail);
        Ok(())
    }
}

fn scene_at(graph: &SceneGraph, index: usize) -> SceneId {
    graph.scenes().nth(index % graph.len()).map(|s| s.id).unwrap()
}

proptest! {
    #[test]
    fn prop_bfs_path_is_shortest(from in 0..200usize, to in 0..200usize) {
        let graph = SceneGraph::standard().unwrap();
        let (from, to) = (scene_at(&graph, from), scene_at(&graph, to));

        let path = graph.shortest_path(from, to).unwrap();
        prop_assert_eq!(Some(path.len()), graph.distance(from, to));
        prop_assert!(!path.contains(&from));
        if from != to {
            prop_assert_eq!(path.last().copied(), Some(to));
        }
    }

    #[test]
    fn prop_replayed_route_ends_at_target(from in 0..200usize, to in 0..200usize) {
        let graph = Arc::new(SceneGraph::standard().unwrap());
        let (from, to) = (scene_at(&graph, from), scene_at(&graph, to));
        let target = graph.scene(to).name.clone();
        let cross_site = graph.scene(from).site != graph.scene(to).site;

        let mut nav = Navigator::new(graph, Arc::new(ScriptedReader::new()));
        nav.set_current(from);
        let path = nav.route(from, &target).unwrap();
        let mut driver = RecordingDriver::default();

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(nav.goto(&path, &mut driver)).unwrap();

        prop_assert_eq!(nav.current_id(), Some(to));
        prop_assert_eq!(driver.gestures + driver.rails.len(), path.len());
        // Hubs are pairwise connected, so at most one rail is ever taken
        prop_assert_eq!(driver.rails.len(), usize::from(cross_site));
    }
}

#[test]
fn test_rail_goes_between_the_right_sites() {
    let graph = Arc::new(SceneGraph::standard().unwrap());
    let from = graph.lookup(Site::AnitaRocket, Capability::Urban).unwrap();
    let to = graph.lookup(Site::Onederland, Capability::ExchangeSell).unwrap();
    let target = graph.scene(to).name.clone();

    let mut nav = Navigator::new(graph, Arc::new(ScriptedReader::new()));
    nav.set_current(from);
    let path = nav.route(from, &target).unwrap();
    let mut driver = RecordingDriver::default();
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(nav.goto(&path, &mut driver))
        .unwrap();

    assert_eq!(driver.rails, vec![Rail::new(Site::AnitaRocket, Site::Onederland)]);
    assert_eq!(driver.gestures, 4);
}
