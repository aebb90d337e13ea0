use std::time::Duration;

use bevy::prelude::*;

pub mod events;
pub mod format;
pub mod range;
pub mod services;
pub mod styles;
pub mod value;
pub mod widgets;

pub use events::{PickerEmitter, PickerEventMessage, event};
pub use range::DateRange;
pub use styles::{PickerStyleOverrides, PickerStyles, StyleClass};
pub use value::{ChangeSet, Meridiem, PickerValue, SetOptions, SetOutcome, ValueModel};
pub use widgets::{
    DateTimePicker, DateTimePickerWidget, HostBinding, HostDataValue, HostKind, HostText,
    PickerAction, PickerCommand, PickerFace, PickerPhase, PickerPopup, PickerScrim, PickerUiState,
    UIWidgetState,
};

use services::state_service::StateService;

/// Tracks which widget currently holds focus. A `widget_id` of `0`
/// means no widget is focused.
#[derive(Resource, Default)]
pub struct CurrentWidgetState {
    pub widget_id: usize,
}

/// Global picker configuration.
#[derive(Resource, Clone, Debug)]
pub struct PickerConfiguration {
    /// Render layers picker UI nodes spawn on; the first entry is used.
    pub render_layers: Vec<usize>,
    /// Default parent entity for spawned popups and scrims. `None`
    /// attaches them to the picker root itself.
    pub container: Option<Entity>,
    /// Delay between removing the open classes and tearing the popup
    /// tree down, so exit transitions get a chance to play.
    pub close_delay: Duration,
}

impl Default for PickerConfiguration {
    fn default() -> Self {
        Self {
            render_layers: vec![1, 2],
            container: None,
            close_delay: Duration::from_millis(200),
        }
    }
}

/// Registers resources, messages, and systems for the date/time picker.
pub struct DateTimePickerPlugin;

impl Plugin for DateTimePickerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickerConfiguration>();
        app.init_resource::<CurrentWidgetState>();
        app.add_message::<PickerCommand>();
        app.add_message::<PickerEventMessage>();
        app.add_plugins((StateService, DateTimePickerWidget));
    }
}
