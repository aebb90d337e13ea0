use std::time::Duration;

use bevy::prelude::*;
use bevy_datetime_picker::{
    DateTimePicker, DateTimePickerPlugin, HostBinding, HostKind, HostText, PickerCommand,
    PickerConfiguration, PickerEventMessage, PickerPhase, PickerPopup, PickerScrim, PickerUiState,
    PickerValue, StyleClass, UIWidgetState,
};

#[derive(Resource, Default)]
struct SeenEvents(Vec<(String, Option<PickerValue>)>);

impl SeenEvents {
    fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }
}

fn collect_events(mut seen: ResMut<SeenEvents>, mut reader: MessageReader<PickerEventMessage>) {
    for message in reader.read() {
        seen.0.push((message.name.clone(), message.value));
    }
}

fn test_app(close_delay: Duration) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(DateTimePickerPlugin);
    app.insert_resource(PickerConfiguration {
        close_delay,
        ..Default::default()
    });
    app.init_resource::<SeenEvents>();
    app.add_systems(Update, collect_events);
    app
}

fn spawn_picker(app: &mut App, default_value: PickerValue) -> (Entity, Entity) {
    let host = app.world_mut().spawn_empty().id();
    let picker = app
        .world_mut()
        .spawn(DateTimePicker {
            default_value: Some(default_value),
            host: Some(HostBinding {
                target: host,
                kind: HostKind::TextInput,
            }),
            ..Default::default()
        })
        .id();
    app.update();
    (picker, host)
}

fn popup_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<Entity, With<PickerPopup>>();
    query.iter(app.world()).count()
}

fn scrim_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<Entity, With<PickerScrim>>();
    query.iter(app.world()).count()
}

fn popup_has_class(app: &mut App, class: &str) -> bool {
    let mut query = app
        .world_mut()
        .query_filtered::<&StyleClass, With<PickerPopup>>();
    query.iter(app.world()).any(|classes| classes.contains(class))
}

fn text_by_prefix(app: &mut App, prefix: &str) -> Option<String> {
    let mut query = app.world_mut().query::<(&Name, &Text)>();
    query
        .iter(app.world())
        .find(|(name, _)| name.as_str().starts_with(prefix))
        .map(|(_, text)| text.0.clone())
}

fn numeral_state(app: &mut App, prefix: &str, num: &str) -> (bool, bool) {
    let mut query = app.world_mut().query::<(&Name, &UIWidgetState, &StyleClass)>();
    query
        .iter(app.world())
        .find(|(name, ..)| {
            name.as_str().starts_with(prefix) && name.as_str().rsplit('-').next() == Some(num)
        })
        .map(|(_, state, class)| {
            (
                state.disabled,
                class.contains("c-datepicker__clock__num--disabled"),
            )
        })
        .expect("clock numeral")
}

fn phase(app: &App, picker: Entity) -> PickerPhase {
    app.world()
        .get::<PickerUiState>(picker)
        .expect("picker ui state")
        .phase
}

fn june_default() -> PickerValue {
    PickerValue::new(2021, 6, 15, 14, 30).expect("valid default")
}

#[test]
fn initialization_seeds_host_without_change_events() {
    let mut app = test_app(Duration::ZERO);
    let (_picker, host) = spawn_picker(&mut app, june_default());
    app.update();

    let host_text = app.world().get::<HostText>(host).expect("host text");
    assert_eq!(host_text.0, "15/06/21");

    let seen = app.world().resource::<SeenEvents>();
    assert!(seen.0.is_empty(), "seeding must not report changes");
}

#[test]
fn open_defers_transition_classes_by_one_frame() {
    let mut app = test_app(Duration::ZERO);
    let (picker, _host) = spawn_picker(&mut app, june_default());

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();

    assert_eq!(popup_count(&mut app), 1);
    assert_eq!(scrim_count(&mut app), 1);
    assert_eq!(phase(&app, picker), PickerPhase::Opening);
    assert!(!popup_has_class(&mut app, "c-datepicker--open"));

    app.update();
    assert_eq!(phase(&app, picker), PickerPhase::Open);
    assert!(popup_has_class(&mut app, "c-datepicker--open"));

    app.update();
    let seen = app.world().resource::<SeenEvents>();
    assert!(seen.names().contains(&"open"));
}

#[test]
fn header_reflects_the_current_value() {
    let mut app = test_app(Duration::ZERO);
    let (picker, _host) = spawn_picker(&mut app, june_default());

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    app.update();

    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Weekday-").as_deref(),
        Some("Tuesday")
    );
    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Day-").as_deref(),
        Some("15th")
    );
    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Month-Year-").as_deref(),
        Some("Jun 2021")
    );
    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Hour-").as_deref(),
        Some("14")
    );
    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Minute-").as_deref(),
        Some("30")
    );
}

#[test]
fn set_reports_only_the_changed_portion_and_quantizes() {
    let mut app = test_app(Duration::ZERO);
    let (picker, host) = spawn_picker(&mut app, june_default());

    let candidate = PickerValue::new(2021, 6, 20, 14, 32).expect("valid candidate");
    app.world_mut()
        .write_message(PickerCommand::set(picker, candidate));
    app.update();
    app.update();

    let seen = app.world().resource::<SeenEvents>();
    let names = seen.names();
    assert!(names.contains(&"change"));
    assert!(names.contains(&"change:date"));
    assert!(!names.contains(&"change:time"), "14:32 quantizes to 14:30");

    let host_text = app.world().get::<HostText>(host).expect("host text");
    assert_eq!(host_text.0, "20/06/21");
}

#[test]
fn setting_an_identical_value_reports_nothing() {
    let mut app = test_app(Duration::ZERO);
    let (picker, _host) = spawn_picker(&mut app, june_default());

    app.world_mut()
        .write_message(PickerCommand::set(picker, june_default()));
    app.update();
    app.update();

    let seen = app.world().resource::<SeenEvents>();
    assert!(seen.0.is_empty());
}

#[test]
fn submit_carries_the_current_value() {
    let mut app = test_app(Duration::from_secs(5));
    let (picker, _host) = spawn_picker(&mut app, june_default());

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    app.update();

    app.world_mut().write_message(PickerCommand::submit(picker));
    app.update();
    app.update();

    let seen = app.world().resource::<SeenEvents>();
    let submit = seen
        .0
        .iter()
        .find(|(name, _)| name == "submit")
        .expect("submit event");
    let value = submit.1.expect("submit carries the value");
    assert_eq!(value.date_key(), (2021, 6, 15));
    assert_eq!(value.time_key(), (14, 30));
}

#[test]
fn cancel_closes_and_tears_down_after_the_delay() {
    let mut app = test_app(Duration::ZERO);
    let (picker, _host) = spawn_picker(&mut app, june_default());

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    app.update();
    assert_eq!(popup_count(&mut app), 1);

    app.world_mut().write_message(PickerCommand::cancel(picker));
    app.update();

    assert_eq!(popup_count(&mut app), 0);
    assert_eq!(scrim_count(&mut app), 0);
    assert_eq!(phase(&app, picker), PickerPhase::Closed);

    app.update();
    let seen = app.world().resource::<SeenEvents>();
    let names = seen.names();
    assert!(names.contains(&"cancel"));
    assert!(names.contains(&"close"));
    assert!(!names.contains(&"submit"));

    let cancel = seen
        .0
        .iter()
        .find(|(name, _)| name == "cancel")
        .expect("cancel event");
    let value = cancel.1.expect("cancel carries the current value");
    assert_eq!(value.date_key(), (2021, 6, 15));
    assert_eq!(value.time_key(), (14, 30));
}

#[test]
fn reopening_during_the_close_delay_cancels_the_teardown() {
    let mut app = test_app(Duration::from_secs(5));
    let (picker, _host) = spawn_picker(&mut app, june_default());

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    app.update();

    app.world_mut().write_message(PickerCommand::cancel(picker));
    app.update();
    assert_eq!(phase(&app, picker), PickerPhase::Closing);
    assert_eq!(popup_count(&mut app), 1, "tree survives until the delay ends");

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    assert_eq!(popup_count(&mut app), 1);
    assert_eq!(phase(&app, picker), PickerPhase::Opening);

    app.update();
    app.update();
    assert_eq!(phase(&app, picker), PickerPhase::Open);

    let seen = app.world().resource::<SeenEvents>();
    assert!(
        !seen.names().contains(&"close"),
        "cancelled teardown must not report close"
    );
}

#[test]
fn out_of_range_defaults_and_sets_clamp_to_the_bounds() {
    let mut app = test_app(Duration::ZERO);
    let host = app.world_mut().spawn_empty().id();
    let picker = app
        .world_mut()
        .spawn(DateTimePicker {
            default_value: PickerValue::new(2021, 1, 5, 9, 0),
            host: Some(HostBinding {
                target: host,
                kind: HostKind::TextInput,
            }),
            start_date: PickerValue::new(2021, 1, 10, 0, 0),
            end_date: PickerValue::new(2021, 1, 20, 23, 55),
            ..Default::default()
        })
        .id();
    app.update();
    app.update();

    let host_text = app.world().get::<HostText>(host).expect("host text");
    assert_eq!(host_text.0, "10/01/21", "seed clamps up to the start bound");

    let late = PickerValue::new(2021, 1, 25, 9, 0).expect("valid candidate");
    app.world_mut().write_message(PickerCommand::set(picker, late));
    app.update();
    app.update();

    let host_text = app.world().get::<HostText>(host).expect("host text");
    assert_eq!(host_text.0, "20/01/21", "sets clamp down to the end bound");
}

#[test]
fn clamps_keep_bounds_finer_than_the_minute_step() {
    let mut app = test_app(Duration::ZERO);
    let host = app.world_mut().spawn_empty().id();
    let picker = app
        .world_mut()
        .spawn(DateTimePicker {
            default_value: PickerValue::new(2021, 1, 5, 9, 0),
            host: Some(HostBinding {
                target: host,
                kind: HostKind::TextInput,
            }),
            start_date: PickerValue::new(2021, 1, 10, 10, 7),
            end_date: PickerValue::new(2021, 1, 20, 23, 59),
            ..Default::default()
        })
        .id();
    app.update();
    app.update();

    let host_text = app.world().get::<HostText>(host).expect("host text");
    assert_eq!(host_text.0, "10/01/21");

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    app.update();

    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Hour-").as_deref(),
        Some("10"),
        "seed clamps to the start bound, not back below it"
    );
    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Minute-").as_deref(),
        Some("07")
    );

    let late = PickerValue::new(2021, 1, 25, 9, 0).expect("valid candidate");
    app.world_mut().write_message(PickerCommand::set(picker, late));
    app.update();
    app.update();

    let host_text = app.world().get::<HostText>(host).expect("host text");
    assert_eq!(host_text.0, "20/01/21", "clamping to the end stays on its day");
    assert_eq!(
        text_by_prefix(&mut app, "Picker-Header-Minute-").as_deref(),
        Some("59")
    );
}

#[test]
fn clock_positions_outside_the_range_are_disabled() {
    let mut app = test_app(Duration::ZERO);
    let picker = app
        .world_mut()
        .spawn(DateTimePicker {
            default_value: PickerValue::new(2020, 1, 20, 13, 30),
            end_date: PickerValue::new(2020, 1, 20, 14, 0),
            ..Default::default()
        })
        .id();
    app.update();

    app.world_mut().write_message(PickerCommand::open(picker));
    app.update();
    app.update();

    let (disabled, styled) = numeral_state(&mut app, "Picker-Clock-Hour-", "4");
    assert!(disabled, "4 PM lies past the end bound");
    assert!(styled);

    let (disabled, styled) = numeral_state(&mut app, "Picker-Clock-Hour-", "1");
    assert!(!disabled, "1 PM stays selectable");
    assert!(!styled);

    let (disabled, _) = numeral_state(&mut app, "Picker-Clock-Minute-", "45");
    assert!(!disabled, "13:45 sits inside the bound");
}
