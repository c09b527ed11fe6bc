use info_overlay::monitor::{
    Anchor, ConfigCommand, Corner, DisplayCall, MonitorController, MonitorLifecycle, OverlayColor,
    RecordingDisplay, ScriptedQuery,
};
use info_overlay::settings_store::{JsonSettingsStore, KEY_COLOR, KEY_ENABLED, KEY_LOCATION};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

fn controller_with(display: &RecordingDisplay, query: ScriptedQuery) -> MonitorController {
    MonitorController::new(Box::new(display.clone()), Arc::new(query))
        .with_sample_interval(Duration::from_millis(5))
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn enabling_twice_creates_one_overlay_and_one_sampler() {
    let display = RecordingDisplay::new();
    let mut controller = controller_with(&display, ScriptedQuery::default());

    controller.apply(ConfigCommand::SetEnabled(true));
    controller.apply(ConfigCommand::SetEnabled(true));

    assert_eq!(controller.lifecycle(), MonitorLifecycle::Running);
    assert_eq!(display.show_count(), 1);
    assert_eq!(display.live_overlays(), 1);

    controller.apply(ConfigCommand::SetEnabled(false));
    controller.apply(ConfigCommand::SetEnabled(false));
    assert_eq!(controller.lifecycle(), MonitorLifecycle::Stopped);
    assert_eq!(display.live_overlays(), 0);
}

#[test]
fn settings_screen_walkthrough() {
    let display = RecordingDisplay::new();
    let mut store = JsonSettingsStore::in_memory();
    store.set(KEY_ENABLED, false);
    store.set(KEY_LOCATION, "0");
    store.set(KEY_COLOR, "fff");

    let mut controller = MonitorController::from_store(
        &store,
        Box::new(display.clone()),
        Arc::new(ScriptedQuery::default()),
    );
    assert!(!controller.is_running());
    assert_eq!(display.call_count(), 0);

    controller.apply(ConfigCommand::SetEnabled(true));
    controller.apply(ConfigCommand::location("3"));
    controller.apply(ConfigCommand::color("#ff0000"));
    controller.apply(ConfigCommand::SetEnabled(false));

    assert_eq!(
        display.calls(),
        vec![
            DisplayCall::Show {
                id: 1,
                anchor: Anchor::TOP_LEFT,
                color: OverlayColor::rgb(255, 255, 255),
            },
            DisplayCall::Reposition {
                id: 1,
                anchor: Anchor::BOTTOM_RIGHT,
            },
            DisplayCall::Recolor {
                id: 1,
                color: OverlayColor::rgb(255, 0, 0),
            },
            DisplayCall::Hide { id: 1 },
        ]
    );
    assert_eq!(controller.lifecycle(), MonitorLifecycle::Stopped);
}

#[test]
fn location_codes_map_to_corners() {
    let cases = [
        ("0", Anchor::TOP_LEFT),
        ("1", Anchor::TOP_RIGHT),
        ("2", Anchor::BOTTOM_LEFT),
        ("3", Anchor::BOTTOM_RIGHT),
        ("7", Anchor::TOP_LEFT),
        ("-1", Anchor::TOP_LEFT),
        ("abc", Anchor::TOP_LEFT),
        ("", Anchor::TOP_LEFT),
    ];
    for (code, expected) in cases {
        let display = RecordingDisplay::new();
        let mut controller = controller_with(&display, ScriptedQuery::default());
        controller.apply(ConfigCommand::location(code));
        controller.apply(ConfigCommand::SetEnabled(true));

        assert_eq!(
            display.calls().first(),
            Some(&DisplayCall::Show {
                id: 1,
                anchor: expected,
                color: OverlayColor::rgb(255, 255, 255),
            }),
            "location code {code:?}"
        );
    }
}

#[test]
fn hash_prefix_is_optional_and_garbage_is_unset() {
    let display = RecordingDisplay::new();
    let mut controller = controller_with(&display, ScriptedQuery::default());
    controller.apply(ConfigCommand::SetEnabled(true));

    controller.apply(ConfigCommand::color("fff"));
    controller.apply(ConfigCommand::color("#fff"));
    controller.apply(ConfigCommand::color("not-a-color"));

    let recolors: Vec<_> = display
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            DisplayCall::Recolor { color, .. } => Some(color),
            _ => None,
        })
        .collect();
    assert_eq!(
        recolors,
        vec![
            OverlayColor::rgb(255, 255, 255),
            OverlayColor::rgb(255, 255, 255),
            OverlayColor::UNSET,
        ]
    );
    assert!(controller.text_color().is_unset());
    assert!(controller.is_running());
}

#[test]
fn samples_are_rendered_by_pump() {
    let display = RecordingDisplay::new();
    let mut controller = controller_with(&display, ScriptedQuery::repeating("com.example.Home"));
    controller.apply(ConfigCommand::SetEnabled(true));

    assert!(wait_for(|| controller.pump()));
    assert_eq!(display.texts().last().map(String::as_str), Some("com.example.Home"));
}

#[test]
fn nothing_is_rendered_after_stop() {
    let display = RecordingDisplay::new();
    let query = Arc::new(ScriptedQuery::repeating("late").with_delay(Duration::from_millis(150)));
    let mut controller = MonitorController::new(Box::new(display.clone()), query.clone())
        .with_sample_interval(Duration::from_millis(10));

    controller.apply(ConfigCommand::SetEnabled(true));
    assert!(wait_for(|| query.in_flight()));

    controller.shutdown();
    assert!(!query.in_flight());
    let calls_after_stop = display.call_count();

    for _ in 0..10 {
        assert!(!controller.pump());
        sleep(Duration::from_millis(10));
    }
    assert_eq!(display.call_count(), calls_after_stop);
    assert!(display.texts().is_empty());
    assert_eq!(display.live_overlays(), 0);
}

#[test]
fn only_the_latest_sample_is_rendered() {
    let display = RecordingDisplay::new();
    let mut controller = controller_with(&display, ScriptedQuery::new(["A", "B"]));
    controller.apply(ConfigCommand::SetEnabled(true));

    sleep(Duration::from_millis(100));
    assert!(controller.pump());
    assert!(!controller.pump());

    assert_eq!(display.texts(), vec!["B".to_string()]);
}

#[test]
fn restart_uses_a_new_overlay() {
    let display = RecordingDisplay::new();
    let mut controller = controller_with(&display, ScriptedQuery::default());

    controller.apply(ConfigCommand::SetEnabled(true));
    controller.apply(ConfigCommand::SetEnabled(false));
    controller.apply(ConfigCommand::location("2"));
    controller.apply(ConfigCommand::SetEnabled(true));

    assert_eq!(
        display.calls().last(),
        Some(&DisplayCall::Show {
            id: 2,
            anchor: Anchor::BOTTOM_LEFT,
            color: OverlayColor::rgb(255, 255, 255),
        })
    );
    assert_eq!(controller.location(), Corner::BottomLeft);
    assert_eq!(display.live_overlays(), 1);
}
