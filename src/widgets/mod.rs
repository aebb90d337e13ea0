use std::sync::atomic::{AtomicUsize, Ordering};

use bevy::prelude::*;

use crate::events::PickerEmitter;
use crate::format::DEFAULT_FORMAT;
use crate::range::DateRange;
use crate::styles::PickerStyles;
use crate::value::{Meridiem, PickerValue};

pub mod controls;

pub use controls::date_time_picker::DateTimePickerWidget;

static NEXT_WIDGET_ID: AtomicUsize = AtomicUsize::new(1);

/// Unique, process-wide widget identity used to bind child UI elements
/// to their owning widget.
#[derive(Component, Debug)]
pub struct UIGenID(usize);

impl Default for UIGenID {
    fn default() -> Self {
        Self(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl UIGenID {
    pub fn get(&self) -> usize {
        self.0
    }
}

/// Links a child UI element to the [`UIGenID`] of its owning widget.
#[derive(Component, Clone, Copy, Debug)]
pub struct BindToID(pub usize);

/// Opts a bound child out of parent state propagation.
#[derive(Component, Default)]
pub struct IgnoreParentState;

/// Interaction flags shared by every picker UI element.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct UIWidgetState {
    pub hovered: bool,
    pub focused: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub checked: bool,
    pub open: bool,
    pub invalid: bool,
}

/// How a bound host element consumes the formatted value.
///
/// Supplied explicitly by the caller instead of sniffing element roles
/// at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    /// The host behaves like a text input: its [`HostText`] value is
    /// kept in sync.
    TextInput,
    /// Any other host: the formatted value lands in a
    /// [`HostDataValue`] attribute component.
    DataAttributeTarget,
}

/// Binds a picker to a host element entity.
#[derive(Clone, Copy, Debug)]
pub struct HostBinding {
    pub target: Entity,
    pub kind: HostKind,
}

/// The synchronized value of a [`HostKind::TextInput`] host.
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostText(pub String);

/// The synchronized data attribute of a
/// [`HostKind::DataAttributeTarget`] host.
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostDataValue(pub String);

/// Open/close lifecycle phase of one picker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PickerPhase {
    #[default]
    Closed,
    /// Popup and scrim are spawned; the transition classes land on the
    /// next frame so class-driven animations register the before state.
    Opening,
    Open,
    /// The open class is removed; removal waits for the close countdown.
    Closing,
}

/// Which of the two view faces is active while open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PickerFace {
    #[default]
    Calendar,
    Clock,
}

/// Transient UI state owned by the picker controller.
#[derive(Component, Clone, Copy, Debug)]
pub struct PickerUiState {
    pub phase: PickerPhase,
    pub face: PickerFace,
    pub meridiem: Meridiem,
    /// Year of the month the calendar face currently shows.
    pub view_year: i32,
    /// Month the calendar face currently shows.
    pub view_month: u32,
}

impl Default for PickerUiState {
    fn default() -> Self {
        Self {
            phase: PickerPhase::default(),
            face: PickerFace::default(),
            meridiem: Meridiem::default(),
            view_year: 1970,
            view_month: 1,
        }
    }
}

/// Material date/time picker widget.
///
/// Spawn this component to create a picker; the widget systems take
/// care of the rest. The popup itself only exists between `Open` and
/// `Close` commands.
#[derive(Component)]
#[require(
    UIGenID,
    UIWidgetState,
    PickerUiState,
    crate::value::ValueModel,
    DateRange,
    PickerEmitter
)]
pub struct DateTimePicker {
    /// Initial value; defaults to the wall clock truncated to the hour,
    /// resolved when the widget initializes.
    pub default_value: Option<PickerValue>,
    /// Style-slot to CSS class mapping attached to spawned nodes.
    pub styles: PickerStyles,
    /// Display format written to the bound host.
    pub format: String,
    /// Popup parent; falls back to the plugin-level configuration, then
    /// to the UI root.
    pub container: Option<Entity>,
    /// Optional host element kept in sync with the formatted value.
    pub host: Option<HostBinding>,
    /// Lower range bound; presence activates range validation.
    pub start_date: Option<PickerValue>,
    /// Upper range bound; presence activates range validation.
    pub end_date: Option<PickerValue>,
}

impl Default for DateTimePicker {
    fn default() -> Self {
        Self {
            default_value: None,
            styles: PickerStyles::default(),
            format: DEFAULT_FORMAT.to_string(),
            container: None,
            host: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Marker component on a spawned picker popup root.
#[derive(Component)]
pub struct PickerPopup;

/// Marker component on a spawned scrim.
#[derive(Component)]
pub struct PickerScrim;

/// A public operation targeting one picker entity.
#[derive(Message, Clone, Copy, Debug)]
pub struct PickerCommand {
    pub picker: Entity,
    pub action: PickerAction,
}

#[derive(Clone, Copy, Debug)]
pub enum PickerAction {
    Open,
    /// Hide without a submit/cancel event; only `close` is emitted.
    Close,
    Submit,
    Cancel,
    Set { value: PickerValue, silent: bool },
    SetStartDate(Option<PickerValue>),
    SetEndDate(Option<PickerValue>),
}

impl PickerCommand {
    pub fn open(picker: Entity) -> Self {
        Self {
            picker,
            action: PickerAction::Open,
        }
    }

    pub fn close(picker: Entity) -> Self {
        Self {
            picker,
            action: PickerAction::Close,
        }
    }

    pub fn submit(picker: Entity) -> Self {
        Self {
            picker,
            action: PickerAction::Submit,
        }
    }

    pub fn cancel(picker: Entity) -> Self {
        Self {
            picker,
            action: PickerAction::Cancel,
        }
    }

    pub fn set(picker: Entity, value: PickerValue) -> Self {
        Self {
            picker,
            action: PickerAction::Set {
                value,
                silent: false,
            },
        }
    }

    pub fn set_silent(picker: Entity, value: PickerValue) -> Self {
        Self {
            picker,
            action: PickerAction::Set {
                value,
                silent: true,
            },
        }
    }

    pub fn set_start_date(picker: Entity, start: Option<PickerValue>) -> Self {
        Self {
            picker,
            action: PickerAction::SetStartDate(start),
        }
    }

    pub fn set_end_date(picker: Entity, end: Option<PickerValue>) -> Self {
        Self {
            picker,
            action: PickerAction::SetEndDate(end),
        }
    }
}
