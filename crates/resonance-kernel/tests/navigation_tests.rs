//! End-to-end navigation against a recording device and scripted reader

use resonance_device::Point;
use resonance_kernel::layout;
use resonance_kernel::prelude::*;
use resonance_kernel::rail::SWEEP;
use resonance_kernel::{NavigatorConfig, Pan, RailConfig, RailController};
use std::time::Duration;
use resonance_test_utils::{recording_executor, CallLog, ScriptedReader};

fn lines(batch: &GestureBatch) -> Vec<String> {
    batch.iter().map(ToString::to_string).collect()
}

fn pan_line(pan: Pan) -> String {
    let (from, to) = pan.endpoints();
    lines(&GestureBatch::new().swipe(from, to)).remove(0)
}

fn navigator(reader: &ScriptedReader) -> Navigator {
    let graph = Arc::new(SceneGraph::standard().unwrap());
    Navigator::new(graph, Arc::new(reader.clone()))
}

#[tokio::test(start_paused = true)]
async fn test_navigate_across_sites_replays_full_route() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    reader.set_text(layout::STATION_NAME, "曼德矿场");
    // Top-left screen is empty, the destination shows after the first pan
    reader.push_find(vec![]);
    reader.push_find(vec![TextBox::new(700, 400, "澄明数据中心")]);
    reader.push_text(layout::ARRIVAL_LABEL, "列车行驶中");
    reader.set_text(layout::ARRIVAL_LABEL, "进入站点");

    let mut nav = navigator(&reader);
    let reached = nav
        .navigate(Site::Clarity, Capability::ExchangeBuy, &mut executor)
        .await
        .unwrap();
    assert_eq!(nav.graph().scene(reached).name, "澄明数据中心交易所购买");
    assert_eq!(nav.current_id(), Some(reached));

    let mut expected = lines(&GestureBatch::new().tap(layout::MAP));
    for _ in 0..3 {
        expected.push(pan_line(Pan::Up));
        expected.push(pan_line(Pan::Left));
    }
    expected.push(pan_line(SWEEP[0]));
    expected.extend(lines(
        &GestureBatch::new()
            .tap(Point::new(700, 400))
            .tap(layout::EMBARK)
            .tap(layout::ARRIVAL)
            .tap(layout::ENTER_URBAN)
            .tap(layout::exchange_entrance(Site::Clarity))
            .tap(layout::BUY),
    ));
    assert_eq!(log.gestures(), expected);
    assert_eq!(log.count("connect"), 1);
    assert_eq!(reader.find_calls(), 2);
}

#[tokio::test]
async fn test_navigate_to_current_scene_does_nothing() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    reader.set_text(layout::STATION_NAME, "7号自由港");

    let mut nav = navigator(&reader);
    nav.navigate(Site::Freeport, Capability::Hub, &mut executor)
        .await
        .unwrap();
    assert!(log.gestures().is_empty());
}

#[tokio::test]
async fn test_unrecognized_station_label() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    reader.set_text(layout::STATION_NAME, "载入中");

    let mut nav = navigator(&reader);
    let err = nav
        .navigate(Site::Mander, Capability::Exchange, &mut executor)
        .await
        .unwrap_err();
    assert!(matches!(err, NavError::SceneNotRecognized { ref text } if text == "载入中"));
    assert_eq!(nav.current_id(), None);
}

#[tokio::test]
async fn test_missing_capability_is_unknown_scene() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    reader.set_text(layout::STATION_NAME, "曼德矿场");

    let mut nav = navigator(&reader);
    let err = nav
        .navigate(Site::Wilderness, Capability::SecurityOffice, &mut executor)
        .await
        .unwrap_err();
    assert!(matches!(err, NavError::UnknownScene(_)));
}

#[tokio::test(start_paused = true)]
async fn test_rail_search_gives_up_after_max_sweeps() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    let rail = RailController::new(RailConfig::new().with_limits(2, 1));

    let err = rail
        .execute(
            &mut executor,
            &reader,
            resonance_kernel::Rail::new(Site::Brcl, Site::Onederland),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NavError::DestinationNotFound { site: Site::Onederland, sweeps: 2 }
    ));
    assert_eq!(reader.find_calls(), 2 * (SWEEP.len() + 1));
    assert_eq!(log.count("swipe"), 2 * (6 + SWEEP.len()));
}

#[tokio::test(start_paused = true)]
async fn test_rail_arrival_wait_is_bounded() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    reader.set_find(vec![TextBox::new(300, 300, "荒原站")]);
    let rail = RailController::new(RailConfig::new().with_limits(1, 3));

    let err = rail
        .execute(
            &mut executor,
            &reader,
            resonance_kernel::Rail::new(Site::Brcl, Site::Wilderness),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NavError::ArrivalNotDetected { site: Site::Wilderness, polls: 3 }
    ));
    let arrival_reads = reader
        .reads()
        .into_iter()
        .filter(|r| *r == layout::ARRIVAL_LABEL)
        .count();
    assert_eq!(arrival_reads, 3);
}

#[tokio::test(start_paused = true)]
async fn test_rail_taps_pause_for_configured_gesture_interval() {
    let log = CallLog::default();
    let mut executor = recording_executor(&log, CancelSignal::new());
    let reader = ScriptedReader::new();
    reader.set_text(layout::STATION_NAME, "曼德矿场");
    reader.set_text(layout::ARRIVAL_LABEL, "进入站点");
    reader.set_find(vec![TextBox::new(700, 400, "澄明数据中心")]);

    let rail = RailConfig {
        reset_cycles: 0,
        arrival_confirm_ms: 0,
        ..RailConfig::default()
    };
    let config = NavigatorConfig {
        gesture_interval_ms: 100,
        ..NavigatorConfig::default()
    };
    let mut nav = navigator(&reader).with_rail_config(rail).with_config(config);
    assert_eq!(nav.rail().config().gesture_interval(), Duration::from_millis(100));

    let started = tokio::time::Instant::now();
    nav.navigate(Site::Clarity, Capability::Hub, &mut executor)
        .await
        .unwrap();
    // Map, destination and embark taps; arrival confirmation pauses for nothing
    assert_eq!(started.elapsed(), Duration::from_millis(300));
    assert_eq!(log.count("tap"), 4);
}

#[tokio::test]
async fn test_cancelled_navigation_touches_nothing() {
    let log = CallLog::default();
    let cancel = CancelSignal::new();
    let mut executor = recording_executor(&log, cancel.clone());
    let reader = ScriptedReader::new();
    reader.set_text(layout::STATION_NAME, "曼德矿场");

    cancel.cancel();
    let mut nav = navigator(&reader);
    let err = nav
        .navigate(Site::Mander, Capability::Exchange, &mut executor)
        .await
        .unwrap_err();
    assert!(err.is_cancellation());
    assert!(log.entries().is_empty());
}
