use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;

use crate::events::{self, PickerEmitter, PickerEventMessage, event};
use crate::format::{format_value, header_month_year, ordinal_day, weekday_name};
use crate::range::DateRange;
use crate::styles::StyleClass;
use crate::value::{Meridiem, PickerValue, SetOptions, ValueModel, day_of_week, days_in_month, shift_month};
use crate::widgets::{
    BindToID, DateTimePicker, HostDataValue, HostKind, HostText, IgnoreParentState, PickerAction,
    PickerCommand, PickerFace, PickerPhase, PickerPopup, PickerScrim, PickerUiState, UIGenID,
    UIWidgetState,
};
use crate::{CurrentWidgetState, PickerConfiguration};

/// Marker component for initialized picker widgets.
#[derive(Component)]
struct PickerReady;

/// Marker component for a popup whose open transition classes land on
/// the next frame. Inserted together with the popup tree and consumed
/// one frame later, so class-driven animations see the closed state
/// first.
#[derive(Component)]
struct PendingOpen;

/// Countdown between removing the open classes and tearing the popup
/// tree down. Reopening while this is attached cancels the teardown.
#[derive(Component)]
struct CloseCountdown {
    timer: Timer,
}

/// Marker component for the header date block.
#[derive(Component)]
struct HeaderDateButton;

/// Marker component for the header weekday line.
#[derive(Component)]
struct HeaderWeekdayText;

/// Marker component for the header ordinal day text.
#[derive(Component)]
struct HeaderDayText;

/// Marker component for the header month/year text.
#[derive(Component)]
struct HeaderMonthYearText;

/// Marker component for the header time block.
#[derive(Component)]
struct HeaderTimeButton;

/// Marker component for the header hour text.
#[derive(Component)]
struct HeaderHourText;

/// Marker component for the header minute text.
#[derive(Component)]
struct HeaderMinuteText;

/// Marker component for the AM/PM selector buttons.
#[derive(Component)]
struct MeridiemButton {
    meridiem: Meridiem,
}

/// Marker component for the calendar face panel.
#[derive(Component)]
struct CalendarFacePanel;

/// Marker component for the clock face panel.
#[derive(Component)]
struct ClockFacePanel;

/// Marker component for the calendar month/year label.
#[derive(Component)]
struct CalendarMonthLabel;

/// Marker component for previous-month button.
#[derive(Component)]
struct CalendarPrevButton;

/// Marker component for next-month button.
#[derive(Component)]
struct CalendarNextButton;

/// Marker component for day cells.
#[derive(Component)]
struct CalendarDayButton {
    index: usize,
}

/// Marker component for day cell text entities.
#[derive(Component)]
struct CalendarDayText {
    index: usize,
}

/// Marker component for one hour numeral on the clock dial.
#[derive(Component)]
struct ClockHourNumeral {
    hour: u32,
}

/// Marker component for one minute numeral on the clock dial.
#[derive(Component)]
struct ClockMinuteNumeral {
    minute: u32,
}

/// Marker component for the OK action.
#[derive(Component)]
struct OkButton;

/// Marker component for the Cancel action.
#[derive(Component)]
struct CancelButton;

const PICKER_OVERLAY_Z: i32 = 30_000;

const CLOCK_CENTER: f32 = 120.0;
const CLOCK_HOUR_RADIUS: f32 = 100.0;
const CLOCK_MINUTE_RADIUS: f32 = 64.0;
const CLOCK_NUM_HALF: f32 = 14.0;

const WEEKDAY_HEADS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

#[derive(Clone, Copy)]
struct CalendarCell {
    year: i32,
    month: u32,
    day: u32,
    in_current_month: bool,
}

impl CalendarCell {
    fn apply_to(&self, value: PickerValue) -> PickerValue {
        value.with_date(self.year, self.month, self.day)
    }
}

/// Plugin that registers date/time picker widget behavior.
pub struct DateTimePickerWidget;

impl Plugin for DateTimePickerWidget {
    /// Registers systems for picker setup, lifecycle, and rendering.
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                initialize_pickers,
                apply_open_transition,
                process_picker_commands,
                tick_close_countdown,
                sync_header_visuals,
                sync_face_panels,
                sync_calendar_grid,
                sync_clock_face,
                sync_host_targets,
            )
                .chain(),
        );
    }
}

/// Seeds newly added picker entities with their initial value, range,
/// and calendar view.
fn initialize_pickers(
    mut commands: Commands,
    mut query: Query<
        (
            Entity,
            &UIGenID,
            &DateTimePicker,
            &mut ValueModel,
            &mut DateRange,
            &mut PickerUiState,
        ),
        Without<PickerReady>,
    >,
    config: Res<PickerConfiguration>,
) {
    let layer = config.render_layers.first().copied().unwrap_or(1);

    for (entity, id, picker, mut model, mut range, mut ui) in query.iter_mut() {
        *range = DateRange::new(picker.start_date, picker.end_date);

        let seed = picker
            .default_value
            .unwrap_or_else(PickerValue::now_truncated_to_hour);
        let seed = range.clamp(seed.quantized());
        let outcome = model.set_exact(seed, SetOptions { silent: true });

        ui.view_year = outcome.value.year();
        ui.view_month = outcome.value.month();
        ui.meridiem = outcome.value.meridiem();

        commands.entity(entity).insert((
            Name::new(format!("DateTimePicker-{}", id.get())),
            Node::default(),
            Visibility::default(),
            StyleClass::one(picker.styles.root.clone()),
            RenderLayers::layer(layer),
            Pickable::IGNORE,
            PickerReady,
        ));
    }
}

/// Applies the deferred open transition one frame after the popup tree
/// spawned: the open class lands on the popup, the shown class on the
/// scrim, and the `open` event fires.
fn apply_open_transition(
    mut commands: Commands,
    mut pickers: Query<
        (
            Entity,
            &UIGenID,
            &DateTimePicker,
            &mut PickerUiState,
            &mut PickerEmitter,
        ),
        (With<PickerReady>, With<PendingOpen>),
    >,
    mut elements: Query<
        (&mut StyleClass, &BindToID, Has<PickerPopup>, Has<PickerScrim>),
        Or<(With<PickerPopup>, With<PickerScrim>)>,
    >,
    mut messages: MessageWriter<PickerEventMessage>,
) {
    for (entity, id, picker, mut ui, mut emitter) in pickers.iter_mut() {
        if ui.phase != PickerPhase::Opening {
            commands.entity(entity).remove::<PendingOpen>();
            continue;
        }

        for (mut class, bind, is_popup, is_scrim) in elements.iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            if is_popup {
                class.add(&picker.styles.open);
            }
            if is_scrim {
                class.add(&picker.styles.scrim_shown);
            }
        }

        ui.phase = PickerPhase::Open;
        commands.entity(entity).remove::<PendingOpen>();
        events::emit(&mut emitter, &mut messages, entity, event::OPEN, None);
    }
}

/// Executes picker commands: open/close lifecycle, value updates, and
/// range updates. All state mutation funnels through here so observers
/// stay thin.
fn process_picker_commands(
    mut commands: Commands,
    mut reader: MessageReader<PickerCommand>,
    mut pickers: Query<
        (
            &UIGenID,
            &DateTimePicker,
            &mut PickerUiState,
            &mut ValueModel,
            &mut DateRange,
            &mut PickerEmitter,
            &mut UIWidgetState,
        ),
        With<PickerReady>,
    >,
    mut elements: Query<
        (
            Entity,
            &mut StyleClass,
            &BindToID,
            Has<PickerPopup>,
            Has<PickerScrim>,
        ),
        Or<(With<PickerPopup>, With<PickerScrim>)>,
    >,
    mut messages: MessageWriter<PickerEventMessage>,
    mut current_widget_state: ResMut<CurrentWidgetState>,
    config: Res<PickerConfiguration>,
) {
    for command in reader.read() {
        let Ok((id, picker, mut ui, mut model, mut range, mut emitter, mut state)) =
            pickers.get_mut(command.picker)
        else {
            warn!("picker command targets unknown entity {:?}", command.picker);
            continue;
        };

        match command.action {
            PickerAction::Open => {
                if state.disabled {
                    continue;
                }
                match ui.phase {
                    PickerPhase::Open | PickerPhase::Opening => continue,
                    PickerPhase::Closing => {
                        // A reopen during the close countdown cancels the
                        // pending teardown and starts over with a fresh tree.
                        commands.entity(command.picker).remove::<CloseCountdown>();
                        for (element, _, bind, _, _) in elements.iter() {
                            if bind.0 == id.get() {
                                commands.entity(element).despawn();
                            }
                        }
                    }
                    PickerPhase::Closed => {}
                }

                if let Some(value) = model.get() {
                    ui.view_year = value.year();
                    ui.view_month = value.month();
                    ui.meridiem = value.meridiem();
                }
                ui.face = PickerFace::Calendar;
                ui.phase = PickerPhase::Opening;
                state.open = true;
                state.focused = true;
                state.checked = true;
                current_widget_state.widget_id = id.get();

                let layer = config.render_layers.first().copied().unwrap_or(1);
                let parent = picker.container.or(config.container);
                spawn_picker_tree(
                    &mut commands,
                    command.picker,
                    id.get(),
                    picker,
                    layer,
                    parent,
                );
                commands.entity(command.picker).insert(PendingOpen);
            }
            PickerAction::Close | PickerAction::Submit | PickerAction::Cancel => {
                if !matches!(ui.phase, PickerPhase::Open | PickerPhase::Opening) {
                    continue;
                }

                match command.action {
                    PickerAction::Submit => {
                        events::emit(
                            &mut emitter,
                            &mut messages,
                            command.picker,
                            event::SUBMIT,
                            model.get(),
                        );
                    }
                    PickerAction::Cancel => {
                        events::emit(
                            &mut emitter,
                            &mut messages,
                            command.picker,
                            event::CANCEL,
                            model.get(),
                        );
                    }
                    _ => {}
                }

                for (_, mut class, bind, is_popup, is_scrim) in elements.iter_mut() {
                    if bind.0 != id.get() {
                        continue;
                    }
                    if is_popup {
                        class.remove(&picker.styles.open);
                    }
                    if is_scrim {
                        class.remove(&picker.styles.scrim_shown);
                    }
                }

                ui.phase = PickerPhase::Closing;
                state.open = false;
                state.checked = false;
                commands
                    .entity(command.picker)
                    .remove::<PendingOpen>()
                    .insert(CloseCountdown {
                        timer: Timer::new(config.close_delay, TimerMode::Once),
                    });
            }
            PickerAction::Set { value, silent } => {
                // Clamping runs after quantization so bounds whose
                // minute sits off the step are stored exactly.
                let outcome = model.set_exact(range.clamp(value.quantized()), SetOptions { silent });
                ui.meridiem = outcome.value.meridiem();
                if outcome.change.date {
                    ui.view_year = outcome.value.year();
                    ui.view_month = outcome.value.month();
                }
                if outcome.emit {
                    events::emit(
                        &mut emitter,
                        &mut messages,
                        command.picker,
                        &outcome.change.event_names(),
                        Some(outcome.value),
                    );
                }
            }
            PickerAction::SetStartDate(start) => {
                range.set_start(start);
                reclamp_after_range_change(
                    &range,
                    &mut model,
                    &mut ui,
                    &mut emitter,
                    &mut messages,
                    command.picker,
                );
            }
            PickerAction::SetEndDate(end) => {
                range.set_end(end);
                reclamp_after_range_change(
                    &range,
                    &mut model,
                    &mut ui,
                    &mut emitter,
                    &mut messages,
                    command.picker,
                );
            }
        }
    }
}

/// Pulls the current value back inside the bounds after a range update.
fn reclamp_after_range_change(
    range: &DateRange,
    model: &mut ValueModel,
    ui: &mut PickerUiState,
    emitter: &mut PickerEmitter,
    messages: &mut MessageWriter<PickerEventMessage>,
    picker: Entity,
) {
    let Some(value) = model.get() else {
        return;
    };
    let clamped = range.clamp(value);
    if clamped == value {
        return;
    }
    let outcome = model.set_exact(clamped, SetOptions::default());
    ui.meridiem = outcome.value.meridiem();
    if outcome.change.date {
        ui.view_year = outcome.value.year();
        ui.view_month = outcome.value.month();
    }
    if outcome.emit {
        events::emit(
            emitter,
            messages,
            picker,
            &outcome.change.event_names(),
            Some(outcome.value),
        );
    }
}

/// Ticks close countdowns and tears down finished popups.
fn tick_close_countdown(
    mut commands: Commands,
    time: Res<Time>,
    mut pickers: Query<
        (
            Entity,
            &UIGenID,
            &mut PickerUiState,
            &mut CloseCountdown,
            &mut PickerEmitter,
        ),
        With<PickerReady>,
    >,
    elements: Query<(Entity, &BindToID), Or<(With<PickerPopup>, With<PickerScrim>)>>,
    mut messages: MessageWriter<PickerEventMessage>,
) {
    for (entity, id, mut ui, mut countdown, mut emitter) in pickers.iter_mut() {
        countdown.timer.tick(time.delta());
        if !countdown.timer.is_finished() {
            continue;
        }

        for (element, bind) in elements.iter() {
            if bind.0 == id.get() {
                commands.entity(element).despawn();
            }
        }

        ui.phase = PickerPhase::Closed;
        commands.entity(entity).remove::<CloseCountdown>();
        events::emit(&mut emitter, &mut messages, entity, event::CLOSE, None);
    }
}

/// Spawns the scrim and popup tree for one picker.
fn spawn_picker_tree(
    commands: &mut Commands,
    picker_entity: Entity,
    owner_id: usize,
    picker: &DateTimePicker,
    layer: usize,
    parent: Option<Entity>,
) {
    let styles = &picker.styles;

    let scrim = commands
        .spawn((
            Name::new(format!("Picker-Scrim-{owner_id}")),
            Node::default(),
            BackgroundColor::default(),
            ZIndex(PICKER_OVERLAY_Z - 1),
            UIWidgetState::default(),
            StyleClass::one(styles.scrim.clone()),
            RenderLayers::layer(layer),
            Pickable::default(),
            PickerScrim,
            BindToID(owner_id),
        ))
        .observe(on_scrim_click)
        .id();

    let popup = commands
        .spawn((
            Name::new(format!("Picker-Popup-{owner_id}")),
            Node::default(),
            BackgroundColor::default(),
            BorderColor::default(),
            ZIndex(PICKER_OVERLAY_Z),
            UIWidgetState::default(),
            StyleClass(vec![styles.root.clone(), styles.positioned.clone()]),
            RenderLayers::layer(layer),
            Pickable::default(),
            PickerPopup,
            BindToID(owner_id),
        ))
        .with_children(|popup| {
            spawn_header(popup, owner_id, styles, layer);
            spawn_calendar_face(popup, owner_id, styles, layer);
            spawn_clock_face(popup, owner_id, styles, layer);
            spawn_action_row(popup, owner_id, styles, layer);
        })
        .id();

    let attach_to = parent.unwrap_or(picker_entity);
    commands.entity(attach_to).add_child(scrim);
    commands.entity(attach_to).add_child(popup);
}

fn spawn_header(
    popup: &mut ChildSpawnerCommands,
    owner_id: usize,
    styles: &crate::styles::PickerStyles,
    layer: usize,
) {
    popup
        .spawn((
            Name::new(format!("Picker-Header-{owner_id}")),
            Node::default(),
            UIWidgetState::default(),
            StyleClass::one(styles.header.clone()),
            RenderLayers::layer(layer),
            Pickable::IGNORE,
            BindToID(owner_id),
        ))
        .with_children(|header| {
            header
                .spawn((
                    Name::new(format!("Picker-Header-Date-{owner_id}")),
                    Node::default(),
                    UIWidgetState::default(),
                    IgnoreParentState,
                    StyleClass::one(styles.date.clone()),
                    RenderLayers::layer(layer),
                    Pickable::default(),
                    HeaderDateButton,
                    BindToID(owner_id),
                ))
                .observe(on_header_date_click)
                .observe(on_element_cursor_entered)
                .observe(on_element_cursor_leave)
                .with_children(|block| {
                    block.spawn((
                        Name::new(format!("Picker-Header-Weekday-{owner_id}")),
                        Text::new(""),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::default(),
                        UIWidgetState::default(),
                        StyleClass::one(styles.day.clone()),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        HeaderWeekdayText,
                        BindToID(owner_id),
                    ));

                    block.spawn((
                        Name::new(format!("Picker-Header-Day-{owner_id}")),
                        Text::new(""),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::default(),
                        UIWidgetState::default(),
                        StyleClass::one(styles.date.clone()),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        HeaderDayText,
                        BindToID(owner_id),
                    ));

                    block.spawn((
                        Name::new(format!("Picker-Header-Month-Year-{owner_id}")),
                        Text::new(""),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::default(),
                        UIWidgetState::default(),
                        StyleClass::one(styles.month.clone()),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        HeaderMonthYearText,
                        BindToID(owner_id),
                    ));
                });

            header
                .spawn((
                    Name::new(format!("Picker-Header-Time-{owner_id}")),
                    Node::default(),
                    UIWidgetState::default(),
                    IgnoreParentState,
                    StyleClass::one(styles.time.clone()),
                    RenderLayers::layer(layer),
                    Pickable::default(),
                    HeaderTimeButton,
                    BindToID(owner_id),
                ))
                .observe(on_header_time_click)
                .observe(on_element_cursor_entered)
                .observe(on_element_cursor_leave)
                .with_children(|block| {
                    block.spawn((
                        Name::new(format!("Picker-Header-Hour-{owner_id}")),
                        Text::new(""),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                        UIWidgetState::default(),
                        StyleClass::one(styles.time.clone()),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        HeaderHourText,
                        BindToID(owner_id),
                    ));

                    block.spawn((
                        Name::new(format!("Picker-Time-Separator-{owner_id}")),
                        Text::new(":"),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                        UIWidgetState::default(),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        BindToID(owner_id),
                    ));

                    block.spawn((
                        Name::new(format!("Picker-Header-Minute-{owner_id}")),
                        Text::new(""),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                        UIWidgetState::default(),
                        StyleClass::one(styles.time.clone()),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        HeaderMinuteText,
                        BindToID(owner_id),
                    ));

                    for (meridiem, label, class) in [
                        (Meridiem::Am, "AM", styles.am.clone()),
                        (Meridiem::Pm, "PM", styles.pm.clone()),
                    ] {
                        block
                            .spawn((
                                Name::new(format!("Picker-{label}-{owner_id}")),
                                Node::default(),
                                UIWidgetState::default(),
                                IgnoreParentState,
                                StyleClass::one(class),
                                RenderLayers::layer(layer),
                                Pickable::default(),
                                MeridiemButton { meridiem },
                                BindToID(owner_id),
                            ))
                            .observe(on_meridiem_click)
                            .observe(on_element_cursor_entered)
                            .observe(on_element_cursor_leave)
                            .with_children(|button| {
                                button.spawn((
                                    Name::new(format!("Picker-{label}-Text-{owner_id}")),
                                    Text::new(label),
                                    TextColor::default(),
                                    TextFont::default(),
                                    TextLayout::new_with_justify(bevy::text::Justify::Center)
                                        .with_no_wrap(),
                                    UIWidgetState::default(),
                                    RenderLayers::layer(layer),
                                    Pickable::IGNORE,
                                    BindToID(owner_id),
                                ));
                            });
                    }
                });
        });
}

fn spawn_calendar_face(
    popup: &mut ChildSpawnerCommands,
    owner_id: usize,
    styles: &crate::styles::PickerStyles,
    layer: usize,
) {
    popup
        .spawn((
            Name::new(format!("Picker-Calendar-{owner_id}")),
            Node::default(),
            UIWidgetState::default(),
            StyleClass::one(styles.container.clone()),
            RenderLayers::layer(layer),
            Pickable::IGNORE,
            CalendarFacePanel,
            BindToID(owner_id),
        ))
        .with_children(|calendar| {
            calendar
                .spawn((
                    Name::new(format!("Picker-Calendar-Nav-{owner_id}")),
                    Node::default(),
                    UIWidgetState::default(),
                    StyleClass::one(styles.day_head.clone()),
                    RenderLayers::layer(layer),
                    Pickable::IGNORE,
                    BindToID(owner_id),
                ))
                .with_children(|nav| {
                    nav.spawn((
                        Name::new(format!("Picker-Prev-{owner_id}")),
                        Node::default(),
                        UIWidgetState::default(),
                        IgnoreParentState,
                        StyleClass::one(styles.prev.clone()),
                        RenderLayers::layer(layer),
                        Pickable::default(),
                        CalendarPrevButton,
                        BindToID(owner_id),
                    ))
                    .observe(on_prev_click)
                    .observe(on_element_cursor_entered)
                    .observe(on_element_cursor_leave)
                    .with_children(|button| {
                        button.spawn((
                            Name::new(format!("Picker-Prev-Text-{owner_id}")),
                            Text::new("<"),
                            TextColor::default(),
                            TextFont::default(),
                            TextLayout::new_with_justify(bevy::text::Justify::Center)
                                .with_no_wrap(),
                            UIWidgetState::default(),
                            RenderLayers::layer(layer),
                            Pickable::IGNORE,
                            BindToID(owner_id),
                        ));
                    });

                    nav.spawn((
                        Name::new(format!("Picker-Calendar-Month-{owner_id}")),
                        Node::default(),
                        Text::new(""),
                        TextColor::default(),
                        TextFont::default(),
                        TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                        UIWidgetState::default(),
                        StyleClass::one(styles.month.clone()),
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                        CalendarMonthLabel,
                        BindToID(owner_id),
                    ));

                    nav.spawn((
                        Name::new(format!("Picker-Next-{owner_id}")),
                        Node::default(),
                        UIWidgetState::default(),
                        IgnoreParentState,
                        StyleClass::one(styles.next.clone()),
                        RenderLayers::layer(layer),
                        Pickable::default(),
                        CalendarNextButton,
                        BindToID(owner_id),
                    ))
                    .observe(on_next_click)
                    .observe(on_element_cursor_entered)
                    .observe(on_element_cursor_leave)
                    .with_children(|button| {
                        button.spawn((
                            Name::new(format!("Picker-Next-Text-{owner_id}")),
                            Text::new(">"),
                            TextColor::default(),
                            TextFont::default(),
                            TextLayout::new_with_justify(bevy::text::Justify::Center)
                                .with_no_wrap(),
                            UIWidgetState::default(),
                            RenderLayers::layer(layer),
                            Pickable::IGNORE,
                            BindToID(owner_id),
                        ));
                    });
                });

            calendar
                .spawn((
                    Name::new(format!("Picker-Weekday-Row-{owner_id}")),
                    Node::default(),
                    UIWidgetState::default(),
                    StyleClass::one(styles.day_row.clone()),
                    RenderLayers::layer(layer),
                    Pickable::IGNORE,
                    BindToID(owner_id),
                ))
                .with_children(|row| {
                    for (index, head) in WEEKDAY_HEADS.iter().enumerate() {
                        row.spawn((
                            Name::new(format!("Picker-Weekday-Head-{owner_id}-{index}")),
                            Text::new(*head),
                            TextColor::default(),
                            TextFont::default(),
                            TextLayout::new_with_justify(bevy::text::Justify::Center)
                                .with_no_wrap(),
                            UIWidgetState::default(),
                            StyleClass::one(styles.day_head_elem.clone()),
                            RenderLayers::layer(layer),
                            Pickable::IGNORE,
                            BindToID(owner_id),
                        ));
                    }
                });

            calendar
                .spawn((
                    Name::new(format!("Picker-Day-Grid-{owner_id}")),
                    Node::default(),
                    UIWidgetState::default(),
                    StyleClass::one(styles.day_body.clone()),
                    RenderLayers::layer(layer),
                    Pickable::IGNORE,
                    BindToID(owner_id),
                ))
                .with_children(|grid| {
                    for index in 0..42 {
                        grid.spawn((
                            Name::new(format!("Picker-Day-{owner_id}-{index}")),
                            Node::default(),
                            UIWidgetState::default(),
                            IgnoreParentState,
                            StyleClass::one(styles.day_body_elem.clone()),
                            RenderLayers::layer(layer),
                            Pickable::default(),
                            CalendarDayButton { index },
                            BindToID(owner_id),
                        ))
                        .observe(on_day_click)
                        .observe(on_element_cursor_entered)
                        .observe(on_element_cursor_leave)
                        .with_children(|day| {
                            day.spawn((
                                Name::new(format!("Picker-Day-Text-{owner_id}-{index}")),
                                Text::new(""),
                                TextColor::default(),
                                TextFont::default(),
                                TextLayout::new_with_justify(bevy::text::Justify::Center)
                                    .with_no_wrap(),
                                UIWidgetState::default(),
                                RenderLayers::layer(layer),
                                Pickable::IGNORE,
                                CalendarDayText { index },
                                BindToID(owner_id),
                            ));
                        });
                    }
                });
        });
}

fn spawn_clock_face(
    popup: &mut ChildSpawnerCommands,
    owner_id: usize,
    styles: &crate::styles::PickerStyles,
    layer: usize,
) {
    popup
        .spawn((
            Name::new(format!("Picker-Clock-{owner_id}")),
            Node::default(),
            UIWidgetState::default(),
            StyleClass::one(styles.clock.clone()),
            RenderLayers::layer(layer),
            Visibility::Hidden,
            Pickable::IGNORE,
            ClockFacePanel,
            BindToID(owner_id),
        ))
        .with_children(|clock| {
            for hour in 1..=12u32 {
                let (left, top) = dial_position(hour % 12, 12, CLOCK_HOUR_RADIUS);
                clock
                    .spawn((
                        Name::new(format!("Picker-Clock-Hour-{owner_id}-{hour}")),
                        Node {
                            position_type: PositionType::Absolute,
                            left: Val::Px(left - CLOCK_NUM_HALF),
                            top: Val::Px(top - CLOCK_NUM_HALF),
                            ..default()
                        },
                        UIWidgetState::default(),
                        IgnoreParentState,
                        StyleClass::one(styles.clock_num.clone()),
                        RenderLayers::layer(layer),
                        Pickable::default(),
                        ClockHourNumeral { hour },
                        BindToID(owner_id),
                    ))
                    .observe(on_hour_numeral_click)
                    .observe(on_element_cursor_entered)
                    .observe(on_element_cursor_leave)
                    .with_children(|numeral| {
                        numeral.spawn((
                            Name::new(format!("Picker-Clock-Hour-Text-{owner_id}-{hour}")),
                            Text::new(hour.to_string()),
                            TextColor::default(),
                            TextFont::default(),
                            TextLayout::new_with_justify(bevy::text::Justify::Center)
                                .with_no_wrap(),
                            UIWidgetState::default(),
                            RenderLayers::layer(layer),
                            Pickable::IGNORE,
                            BindToID(owner_id),
                        ));
                    });
            }

            for slot in 0..12u32 {
                let minute = slot * 5;
                let (left, top) = dial_position(slot, 12, CLOCK_MINUTE_RADIUS);
                clock
                    .spawn((
                        Name::new(format!("Picker-Clock-Minute-{owner_id}-{minute}")),
                        Node {
                            position_type: PositionType::Absolute,
                            left: Val::Px(left - CLOCK_NUM_HALF),
                            top: Val::Px(top - CLOCK_NUM_HALF),
                            ..default()
                        },
                        UIWidgetState::default(),
                        IgnoreParentState,
                        StyleClass::one(styles.clock_num.clone()),
                        RenderLayers::layer(layer),
                        Pickable::default(),
                        ClockMinuteNumeral { minute },
                        BindToID(owner_id),
                    ))
                    .observe(on_minute_numeral_click)
                    .observe(on_element_cursor_entered)
                    .observe(on_element_cursor_leave)
                    .with_children(|numeral| {
                        numeral.spawn((
                            Name::new(format!("Picker-Clock-Minute-Text-{owner_id}-{minute}")),
                            Text::new(format!("{minute:02}")),
                            TextColor::default(),
                            TextFont::default(),
                            TextLayout::new_with_justify(bevy::text::Justify::Center)
                                .with_no_wrap(),
                            UIWidgetState::default(),
                            RenderLayers::layer(layer),
                            Pickable::IGNORE,
                            BindToID(owner_id),
                        ));
                    });
            }
        });
}

fn spawn_action_row(
    popup: &mut ChildSpawnerCommands,
    owner_id: usize,
    styles: &crate::styles::PickerStyles,
    layer: usize,
) {
    popup
        .spawn((
            Name::new(format!("Picker-Actions-{owner_id}")),
            Node::default(),
            UIWidgetState::default(),
            StyleClass::one(styles.back.clone()),
            RenderLayers::layer(layer),
            Pickable::IGNORE,
            BindToID(owner_id),
        ))
        .with_children(|actions| {
            for (label, class, ok) in [
                ("Cancel", styles.cancel.clone(), false),
                ("OK", styles.ok.clone(), true),
            ] {
                let mut button = actions.spawn((
                    Name::new(format!("Picker-{label}-{owner_id}")),
                    Node::default(),
                    UIWidgetState::default(),
                    IgnoreParentState,
                    StyleClass::one(class),
                    RenderLayers::layer(layer),
                    Pickable::default(),
                    BindToID(owner_id),
                ));
                if ok {
                    button.insert(OkButton);
                    button.observe(on_ok_click);
                } else {
                    button.insert(CancelButton);
                    button.observe(on_cancel_click);
                }
                button
                    .observe(on_element_cursor_entered)
                    .observe(on_element_cursor_leave)
                    .with_children(|inner| {
                        inner.spawn((
                            Name::new(format!("Picker-{label}-Text-{owner_id}")),
                            Text::new(label),
                            TextColor::default(),
                            TextFont::default(),
                            TextLayout::new_with_justify(bevy::text::Justify::Center)
                                .with_no_wrap(),
                            UIWidgetState::default(),
                            RenderLayers::layer(layer),
                            Pickable::IGNORE,
                            BindToID(owner_id),
                        ));
                    });
            }
        });
}

/// Synchronizes the header texts and meridiem selection from the value
/// model.
fn sync_header_visuals(
    pickers: Query<
        (&UIGenID, &ValueModel, &PickerUiState, &DateTimePicker, &DateRange),
        With<PickerReady>,
    >,
    mut params: ParamSet<(
        Query<(&mut Text, &BindToID), (With<HeaderWeekdayText>, Without<PickerReady>)>,
        Query<(&mut Text, &BindToID), (With<HeaderDayText>, Without<PickerReady>)>,
        Query<(&mut Text, &BindToID), (With<HeaderMonthYearText>, Without<PickerReady>)>,
        Query<(&mut Text, &BindToID), (With<HeaderHourText>, Without<PickerReady>)>,
        Query<(&mut Text, &BindToID), (With<HeaderMinuteText>, Without<PickerReady>)>,
        Query<
            (&mut UIWidgetState, &mut StyleClass, &MeridiemButton, &BindToID),
            Without<PickerReady>,
        >,
        Query<
            (
                &mut UIWidgetState,
                &BindToID,
                Has<HeaderDateButton>,
                Has<HeaderTimeButton>,
            ),
            (
                Or<(With<HeaderDateButton>, With<HeaderTimeButton>)>,
                Without<PickerReady>,
            ),
        >,
    )>,
) {
    for (id, model, ui, picker, range) in pickers.iter() {
        if ui.phase == PickerPhase::Closed {
            continue;
        }
        let Some(value) = model.get() else {
            continue;
        };

        for (mut text, bind) in params.p0().iter_mut() {
            if bind.0 == id.get() && text.0 != weekday_name(value) {
                text.0 = weekday_name(value).to_string();
            }
        }

        let day = ordinal_day(value.day());
        for (mut text, bind) in params.p1().iter_mut() {
            if bind.0 == id.get() && text.0 != day {
                text.0 = day.clone();
            }
        }

        let month_year = header_month_year(value);
        for (mut text, bind) in params.p2().iter_mut() {
            if bind.0 == id.get() && text.0 != month_year {
                text.0 = month_year.clone();
            }
        }

        let hour = format!("{:02}", value.hour());
        for (mut text, bind) in params.p3().iter_mut() {
            if bind.0 == id.get() && text.0 != hour {
                text.0 = hour.clone();
            }
        }

        let minute = format!("{:02}", value.minute());
        for (mut text, bind) in params.p4().iter_mut() {
            if bind.0 == id.get() && text.0 != minute {
                text.0 = minute.clone();
            }
        }

        for (mut state, mut class, button, bind) in params.p5().iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            let active = button.meridiem == ui.meridiem;
            if state.checked != active {
                state.checked = active;
            }
            if active {
                class.add(&picker.styles.selected_time);
            } else {
                class.remove(&picker.styles.selected_time);
            }
            let blocked = !active && meridiem_pick(value, button.meridiem, range).is_none();
            if state.disabled != blocked {
                state.disabled = blocked;
            }
        }

        for (mut state, bind, is_date, is_time) in params.p6().iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            let active = (is_date && ui.face == PickerFace::Calendar)
                || (is_time && ui.face == PickerFace::Clock);
            if state.checked != active {
                state.checked = active;
            }
        }
    }
}

/// Shows the face panel the UI state selects and hides the other.
fn sync_face_panels(
    pickers: Query<(&UIGenID, &PickerUiState), With<PickerReady>>,
    mut panels: Query<
        (&mut Visibility, &BindToID, Has<CalendarFacePanel>),
        (
            Or<(With<CalendarFacePanel>, With<ClockFacePanel>)>,
            Without<PickerReady>,
        ),
    >,
) {
    for (id, ui) in pickers.iter() {
        if ui.phase == PickerPhase::Closed {
            continue;
        }
        for (mut visibility, bind, is_calendar) in panels.iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            let shown = is_calendar == (ui.face == PickerFace::Calendar);
            let wanted = if shown {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
            if *visibility != wanted {
                *visibility = wanted;
            }
        }
    }
}

/// Fills the day grid for the viewed month and flags each cell's
/// selected/concealed/disabled state.
fn sync_calendar_grid(
    pickers: Query<
        (
            &UIGenID,
            &ValueModel,
            &DateRange,
            &PickerUiState,
            &UIWidgetState,
            &DateTimePicker,
        ),
        With<PickerReady>,
    >,
    mut params: ParamSet<(
        Query<(&mut Text, &BindToID), (With<CalendarMonthLabel>, Without<PickerReady>)>,
        Query<
            (
                &mut UIWidgetState,
                &mut StyleClass,
                &mut Node,
                &mut Visibility,
                &CalendarDayButton,
                &BindToID,
            ),
            Without<PickerReady>,
        >,
        Query<
            (&mut Text, &mut Visibility, &CalendarDayText, &BindToID),
            (Without<CalendarMonthLabel>, Without<PickerReady>),
        >,
    )>,
) {
    for (id, model, range, ui, root_state, picker) in pickers.iter() {
        if ui.phase == PickerPhase::Closed {
            continue;
        }

        let label = PickerValue::from_ymd(ui.view_year, ui.view_month, 1)
            .map(header_month_year)
            .unwrap_or_default();
        for (mut text, bind) in params.p0().iter_mut() {
            if bind.0 == id.get() && text.0 != label {
                text.0 = label.clone();
            }
        }

        let cells = build_calendar_cells(ui.view_year, ui.view_month);
        let visible_cell_count = visible_calendar_row_count(ui.view_year, ui.view_month) * 7;
        let selected = model.get();

        for (mut state, mut class, mut node, mut visibility, button, bind) in
            params.p1().iter_mut()
        {
            if bind.0 != id.get() {
                continue;
            }

            if button.index >= visible_cell_count {
                node.display = Display::None;
                *visibility = Visibility::Hidden;
                state.checked = false;
                state.disabled = true;
                state.readonly = true;
                state.hovered = false;
                continue;
            }
            node.display = Display::Flex;
            *visibility = Visibility::Inherited;

            let Some(cell) = cells.get(button.index) else {
                continue;
            };

            let concealed = !cell.in_current_month;
            let allowed = selected
                .map(|value| range.date_allowed(cell.apply_to(value)))
                .unwrap_or(true);
            let disabled = root_state.disabled || concealed || !allowed;
            let is_selected = !concealed
                && selected.map(|value| {
                    value.date_key() == (cell.year, cell.month, cell.day)
                }) == Some(true);

            state.checked = is_selected;
            state.readonly = concealed;
            state.disabled = disabled;
            if disabled {
                state.hovered = false;
            }

            toggle_class(&mut class, &picker.styles.day_concealed, concealed);
            toggle_class(&mut class, &picker.styles.day_disabled, !concealed && !allowed);
            toggle_class(&mut class, &picker.styles.selected_day, is_selected);
        }

        for (mut text, mut visibility, text_info, bind) in params.p2().iter_mut() {
            if bind.0 != id.get() {
                continue;
            }

            if text_info.index >= visible_cell_count {
                text.0.clear();
                *visibility = Visibility::Hidden;
                continue;
            }
            *visibility = Visibility::Inherited;

            let Some(cell) = cells.get(text_info.index) else {
                continue;
            };
            let shown = if cell.in_current_month {
                cell.day.to_string()
            } else {
                String::new()
            };
            if text.0 != shown {
                text.0 = shown;
            }
        }
    }
}

/// Highlights the active hour and minute numerals on the clock dial and
/// disables the positions the range rejects.
fn sync_clock_face(
    pickers: Query<
        (&UIGenID, &ValueModel, &PickerUiState, &DateTimePicker, &DateRange),
        With<PickerReady>,
    >,
    mut params: ParamSet<(
        Query<
            (&mut UIWidgetState, &mut StyleClass, &ClockHourNumeral, &BindToID),
            Without<PickerReady>,
        >,
        Query<
            (&mut UIWidgetState, &mut StyleClass, &ClockMinuteNumeral, &BindToID),
            Without<PickerReady>,
        >,
    )>,
) {
    for (id, model, ui, picker, range) in pickers.iter() {
        if ui.phase == PickerPhase::Closed {
            continue;
        }
        let Some(value) = model.get() else {
            continue;
        };

        for (mut state, mut class, numeral, bind) in params.p0().iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            let active = numeral.hour == value.hour12();
            if state.checked != active {
                state.checked = active;
            }
            toggle_class(&mut class, &picker.styles.clock_num_active, active);

            let blocked = hour_pick(value, numeral.hour, ui.meridiem, range).is_none();
            if state.disabled != blocked {
                state.disabled = blocked;
            }
            toggle_class(&mut class, &picker.styles.clock_num_disabled, blocked);
        }

        for (mut state, mut class, numeral, bind) in params.p1().iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            let active = numeral.minute == value.minute();
            if state.checked != active {
                state.checked = active;
            }
            toggle_class(&mut class, &picker.styles.clock_num_active, active);

            let blocked = minute_pick(value, numeral.minute, range).is_none();
            if state.disabled != blocked {
                state.disabled = blocked;
            }
            toggle_class(&mut class, &picker.styles.clock_num_disabled, blocked);
        }
    }
}

/// Writes the formatted value to bound host elements whenever the value
/// model changes. Text hosts get [`HostText`], everything else gets a
/// [`HostDataValue`]; either component is created on the host when
/// missing.
fn sync_host_targets(
    mut commands: Commands,
    pickers: Query<(&DateTimePicker, &ValueModel), Changed<ValueModel>>,
    mut text_hosts: Query<&mut HostText>,
    mut data_hosts: Query<&mut HostDataValue>,
) {
    for (picker, model) in pickers.iter() {
        let Some(binding) = picker.host else {
            continue;
        };
        let Some(value) = model.get() else {
            continue;
        };
        let formatted = format_value(value, &picker.format);

        match binding.kind {
            HostKind::TextInput => {
                if let Ok(mut text) = text_hosts.get_mut(binding.target) {
                    if text.0 != formatted {
                        text.0 = formatted;
                    }
                } else if let Ok(mut host) = commands.get_entity(binding.target) {
                    host.insert(HostText(formatted));
                } else {
                    warn!("picker host target {:?} no longer exists", binding.target);
                }
            }
            HostKind::DataAttributeTarget => {
                if let Ok(mut data) = data_hosts.get_mut(binding.target) {
                    if data.0 != formatted {
                        data.0 = formatted;
                    }
                } else if let Ok(mut host) = commands.get_entity(binding.target) {
                    host.insert(HostDataValue(formatted));
                } else {
                    warn!("picker host target {:?} no longer exists", binding.target);
                }
            }
        }
    }
}

/// Switches to the calendar face.
fn on_header_date_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<HeaderDateButton>>,
    mut pickers: Query<(&UIGenID, &mut PickerUiState), With<PickerReady>>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (id, mut ui) in pickers.iter_mut() {
        if id.get() == bind.0 {
            ui.face = PickerFace::Calendar;
            break;
        }
    }
    trigger.propagate(false);
}

/// Switches to the clock face.
fn on_header_time_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<HeaderTimeButton>>,
    mut pickers: Query<(&UIGenID, &mut PickerUiState), With<PickerReady>>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (id, mut ui) in pickers.iter_mut() {
        if id.get() == bind.0 {
            ui.face = PickerFace::Clock;
            break;
        }
    }
    trigger.propagate(false);
}

/// Moves the calendar view one month backwards.
fn on_prev_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<CalendarPrevButton>>,
    mut pickers: Query<(&UIGenID, &mut PickerUiState, &UIWidgetState), With<PickerReady>>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (id, mut ui, state) in pickers.iter_mut() {
        if id.get() != bind.0 {
            continue;
        }
        if state.disabled {
            break;
        }
        let (year, month) = shift_month(ui.view_year, ui.view_month, -1);
        ui.view_year = year;
        ui.view_month = month;
        break;
    }
    trigger.propagate(false);
}

/// Moves the calendar view one month forwards.
fn on_next_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<CalendarNextButton>>,
    mut pickers: Query<(&UIGenID, &mut PickerUiState, &UIWidgetState), With<PickerReady>>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (id, mut ui, state) in pickers.iter_mut() {
        if id.get() != bind.0 {
            continue;
        }
        if state.disabled {
            break;
        }
        let (year, month) = shift_month(ui.view_year, ui.view_month, 1);
        ui.view_year = year;
        ui.view_month = month;
        break;
    }
    trigger.propagate(false);
}

/// Selects the clicked day, keeping the current time of day.
fn on_day_click(
    mut trigger: On<Pointer<Click>>,
    day_query: Query<(&BindToID, &CalendarDayButton)>,
    pickers: Query<
        (Entity, &UIGenID, &ValueModel, &DateRange, &PickerUiState, &UIWidgetState),
        With<PickerReady>,
    >,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok((bind, button)) = day_query.get(trigger.entity) else {
        return;
    };
    for (picker, id, model, range, ui, state) in pickers.iter() {
        if id.get() != bind.0 {
            continue;
        }
        if state.disabled {
            break;
        }
        let cells = build_calendar_cells(ui.view_year, ui.view_month);
        let visible_cell_count = visible_calendar_row_count(ui.view_year, ui.view_month) * 7;
        if button.index >= visible_cell_count {
            break;
        }
        let Some(cell) = cells.get(button.index).copied() else {
            break;
        };
        if !cell.in_current_month {
            break;
        }
        let Some(value) = model.get() else {
            break;
        };
        let candidate = cell.apply_to(value);
        if !range.date_allowed(candidate) {
            break;
        }
        writer.write(PickerCommand::set(picker, candidate));
        break;
    }
    trigger.propagate(false);
}

/// Selects the clicked hour numeral under the active meridiem. Clicks
/// on positions the range rejects are ignored.
fn on_hour_numeral_click(
    mut trigger: On<Pointer<Click>>,
    numeral_query: Query<(&BindToID, &ClockHourNumeral)>,
    pickers: Query<
        (
            Entity,
            &UIGenID,
            &ValueModel,
            &DateRange,
            &PickerUiState,
            &UIWidgetState,
        ),
        With<PickerReady>,
    >,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok((bind, numeral)) = numeral_query.get(trigger.entity) else {
        return;
    };
    for (picker, id, model, range, ui, state) in pickers.iter() {
        if id.get() != bind.0 {
            continue;
        }
        if state.disabled {
            break;
        }
        let Some(value) = model.get() else {
            break;
        };
        let Some(candidate) = hour_pick(value, numeral.hour, ui.meridiem, range) else {
            break;
        };
        writer.write(PickerCommand::set(picker, candidate));
        break;
    }
    trigger.propagate(false);
}

/// Selects the clicked minute numeral. Clicks on positions the range
/// rejects are ignored.
fn on_minute_numeral_click(
    mut trigger: On<Pointer<Click>>,
    numeral_query: Query<(&BindToID, &ClockMinuteNumeral)>,
    pickers: Query<(Entity, &UIGenID, &ValueModel, &DateRange, &UIWidgetState), With<PickerReady>>,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok((bind, numeral)) = numeral_query.get(trigger.entity) else {
        return;
    };
    for (picker, id, model, range, state) in pickers.iter() {
        if id.get() != bind.0 {
            continue;
        }
        if state.disabled {
            break;
        }
        let Some(value) = model.get() else {
            break;
        };
        let Some(candidate) = minute_pick(value, numeral.minute, range) else {
            break;
        };
        writer.write(PickerCommand::set(picker, candidate));
        break;
    }
    trigger.propagate(false);
}

/// Shifts the hour into the clicked half of the day. Clicking the
/// already-active meridiem, or one the range rejects, changes nothing
/// and reports nothing.
fn on_meridiem_click(
    mut trigger: On<Pointer<Click>>,
    button_query: Query<(&BindToID, &MeridiemButton)>,
    pickers: Query<(Entity, &UIGenID, &ValueModel, &DateRange, &UIWidgetState), With<PickerReady>>,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok((bind, button)) = button_query.get(trigger.entity) else {
        return;
    };
    for (picker, id, model, range, state) in pickers.iter() {
        if id.get() != bind.0 {
            continue;
        }
        if state.disabled {
            break;
        }
        let Some(value) = model.get() else {
            break;
        };
        let Some(candidate) = meridiem_pick(value, button.meridiem, range) else {
            break;
        };
        writer.write(PickerCommand::set(picker, candidate));
        break;
    }
    trigger.propagate(false);
}

/// Accepts the pending value and starts the close transition.
fn on_ok_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<OkButton>>,
    pickers: Query<(Entity, &UIGenID), With<PickerReady>>,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (picker, id) in pickers.iter() {
        if id.get() == bind.0 {
            writer.write(PickerCommand::submit(picker));
            break;
        }
    }
    trigger.propagate(false);
}

/// Discards the pending value and starts the close transition.
fn on_cancel_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<CancelButton>>,
    pickers: Query<(Entity, &UIGenID), With<PickerReady>>,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (picker, id) in pickers.iter() {
        if id.get() == bind.0 {
            writer.write(PickerCommand::cancel(picker));
            break;
        }
    }
    trigger.propagate(false);
}

/// Dismisses the popup, discarding the pending value.
fn on_scrim_click(
    mut trigger: On<Pointer<Click>>,
    bind_query: Query<&BindToID, With<PickerScrim>>,
    pickers: Query<(Entity, &UIGenID), With<PickerReady>>,
    mut writer: MessageWriter<PickerCommand>,
) {
    let Ok(bind) = bind_query.get(trigger.entity) else {
        return;
    };
    for (picker, id) in pickers.iter() {
        if id.get() == bind.0 {
            writer.write(PickerCommand::cancel(picker));
            break;
        }
    }
    trigger.propagate(false);
}

/// Sets hovered state on interactive popup elements.
fn on_element_cursor_entered(
    mut trigger: On<Pointer<Over>>,
    mut query: Query<&mut UIWidgetState, With<BindToID>>,
) {
    if let Ok(mut state) = query.get_mut(trigger.entity) {
        if !state.disabled {
            state.hovered = true;
        }
    }
    trigger.propagate(false);
}

/// Clears hovered state on interactive popup elements.
fn on_element_cursor_leave(
    mut trigger: On<Pointer<Out>>,
    mut query: Query<&mut UIWidgetState, With<BindToID>>,
) {
    if let Ok(mut state) = query.get_mut(trigger.entity) {
        state.hovered = false;
    }
    trigger.propagate(false);
}

/// Adds or removes a modifier class so the element matches `wanted`.
fn toggle_class(class: &mut StyleClass, name: &str, wanted: bool) {
    if wanted {
        class.add(name);
    } else {
        class.remove(name);
    }
}

/// Maps a dial hour (1-12) plus meridiem to a 24h hour.
fn hour24_from(dial_hour: u32, meridiem: Meridiem) -> u32 {
    match (dial_hour, meridiem) {
        (12, Meridiem::Am) => 0,
        (12, Meridiem::Pm) => 12,
        (hour, Meridiem::Am) => hour,
        (hour, Meridiem::Pm) => hour + 12,
    }
}

/// Candidate an hour numeral click would select, or `None` when the
/// range rejects it.
fn hour_pick(
    value: PickerValue,
    dial_hour: u32,
    meridiem: Meridiem,
    range: &DateRange,
) -> Option<PickerValue> {
    let candidate = value.with_hour(hour24_from(dial_hour, meridiem));
    range.time_allowed(candidate).then_some(candidate)
}

/// Candidate a minute numeral click would select, or `None` when the
/// range rejects it.
fn minute_pick(value: PickerValue, minute: u32, range: &DateRange) -> Option<PickerValue> {
    let candidate = value.with_minute(minute);
    range.time_allowed(candidate).then_some(candidate)
}

/// Candidate a meridiem click would select. `None` when the clicked
/// half is already active or the shifted hour falls outside the range.
fn meridiem_pick(value: PickerValue, target: Meridiem, range: &DateRange) -> Option<PickerValue> {
    if value.meridiem() == target {
        return None;
    }
    let candidate = match target {
        Meridiem::Am => value.with_hour(value.hour() - 12),
        Meridiem::Pm => value.with_hour(value.hour() + 12),
    };
    range.time_allowed(candidate).then_some(candidate)
}

/// Position of slot `index` out of `count` on a dial of `radius`,
/// starting at twelve o'clock and running clockwise.
fn dial_position(index: u32, count: u32, radius: f32) -> (f32, f32) {
    let step = std::f32::consts::TAU / count as f32;
    let angle = index as f32 * step - std::f32::consts::FRAC_PI_2;
    (
        CLOCK_CENTER + radius * angle.cos(),
        CLOCK_CENTER + radius * angle.sin(),
    )
}

/// Builds the 42-cell day grid for one month, Sunday-first, padded with
/// the neighbouring months.
fn build_calendar_cells(year: i32, month: u32) -> Vec<CalendarCell> {
    let first = day_of_week(year, month, 1) as usize;
    let current_days = days_in_month(year, month) as usize;
    let (prev_year, prev_month) = shift_month(year, month, -1);
    let (next_year, next_month) = shift_month(year, month, 1);
    let prev_days = days_in_month(prev_year, prev_month) as usize;

    let mut cells = Vec::with_capacity(42);
    for idx in 0..42 {
        if idx < first {
            let day = prev_days - (first - idx) + 1;
            cells.push(CalendarCell {
                year: prev_year,
                month: prev_month,
                day: day as u32,
                in_current_month: false,
            });
            continue;
        }

        let current_idx = idx - first;
        if current_idx < current_days {
            cells.push(CalendarCell {
                year,
                month,
                day: (current_idx + 1) as u32,
                in_current_month: true,
            });
            continue;
        }

        let next_day = current_idx - current_days + 1;
        cells.push(CalendarCell {
            year: next_year,
            month: next_month,
            day: next_day as u32,
            in_current_month: false,
        });
    }
    cells
}

/// Rows needed to show the month, never fewer than five.
fn visible_calendar_row_count(year: i32, month: u32) -> usize {
    let first = day_of_week(year, month, 1) as usize;
    let current_days = days_in_month(year, month) as usize;
    (first + current_days).div_ceil(7).max(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_cells_are_sunday_first() {
        // June 2021 starts on a Tuesday.
        let cells = build_calendar_cells(2021, 6);
        assert_eq!(cells.len(), 42);
        assert!(!cells[0].in_current_month);
        assert_eq!((cells[0].month, cells[0].day), (5, 30));
        assert_eq!((cells[1].month, cells[1].day), (5, 31));
        assert!(cells[2].in_current_month);
        assert_eq!((cells[2].month, cells[2].day), (6, 1));
        assert_eq!((cells[31].month, cells[31].day), (6, 30));
        assert!(!cells[32].in_current_month);
        assert_eq!((cells[32].month, cells[32].day), (7, 1));
    }

    #[test]
    fn calendar_rows_never_fall_below_five() {
        // February 2021 fits exactly four Sunday-first rows.
        assert_eq!(visible_calendar_row_count(2021, 2), 5);
        // August 2021 starts on a Sunday with 31 days.
        assert_eq!(visible_calendar_row_count(2021, 8), 5);
        // May 2021 starts on a Saturday and needs six rows.
        assert_eq!(visible_calendar_row_count(2021, 5), 6);
    }

    #[test]
    fn dial_hour_maps_through_the_meridiem() {
        assert_eq!(hour24_from(12, Meridiem::Am), 0);
        assert_eq!(hour24_from(12, Meridiem::Pm), 12);
        assert_eq!(hour24_from(1, Meridiem::Am), 1);
        assert_eq!(hour24_from(1, Meridiem::Pm), 13);
        assert_eq!(hour24_from(11, Meridiem::Pm), 23);
    }

    #[test]
    fn dial_positions_start_at_twelve_o_clock() {
        let (x, y) = dial_position(0, 12, CLOCK_HOUR_RADIUS);
        assert!((x - CLOCK_CENTER).abs() < 0.001);
        assert!(y < CLOCK_CENTER);

        // Slot three sits at the right of the dial.
        let (x, y) = dial_position(3, 12, CLOCK_HOUR_RADIUS);
        assert!(x > CLOCK_CENTER);
        assert!((y - CLOCK_CENTER).abs() < 0.001);
    }

    #[test]
    fn cells_keep_the_time_of_day_when_applied() {
        let value = PickerValue::new(2021, 6, 15, 14, 30).expect("valid value");
        let cell = CalendarCell {
            year: 2021,
            month: 6,
            day: 20,
            in_current_month: true,
        };
        let applied = cell.apply_to(value);
        assert_eq!(applied.date_key(), (2021, 6, 20));
        assert_eq!(applied.time_key(), (14, 30));
    }

    #[test]
    fn clock_picks_outside_the_range_are_rejected() {
        let end = PickerValue::new(2020, 1, 20, 14, 0).expect("valid bound");
        let range = DateRange::new(None, Some(end));
        let value = PickerValue::new(2020, 1, 20, 13, 30).expect("valid value");

        assert!(hour_pick(value, 4, Meridiem::Pm, &range).is_none());
        assert!(hour_pick(value, 2, Meridiem::Pm, &range).is_none());
        assert_eq!(
            hour_pick(value, 1, Meridiem::Pm, &range).map(|v| v.time_key()),
            Some((13, 30))
        );
        assert_eq!(
            minute_pick(value, 45, &range).map(|v| v.time_key()),
            Some((13, 45))
        );

        let at_end = PickerValue::new(2020, 1, 20, 14, 0).expect("valid value");
        assert!(minute_pick(at_end, 5, &range).is_none());
    }

    #[test]
    fn clicking_the_active_meridiem_changes_nothing() {
        let range = DateRange::new(None, None);
        let value = PickerValue::new(2021, 6, 15, 14, 30).expect("valid value");

        assert!(meridiem_pick(value, Meridiem::Pm, &range).is_none());
        assert_eq!(
            meridiem_pick(value, Meridiem::Am, &range).map(|v| v.time_key()),
            Some((2, 30))
        );
    }

    #[test]
    fn meridiem_picks_outside_the_range_are_rejected() {
        let start = PickerValue::new(2021, 6, 15, 12, 0).expect("valid bound");
        let range = DateRange::new(Some(start), None);
        let value = PickerValue::new(2021, 6, 15, 14, 30).expect("valid value");

        assert!(meridiem_pick(value, Meridiem::Am, &range).is_none());
    }
}
