use bevy::prelude::*;
use bevy_datetime_picker::{
    DateTimePicker, DateTimePickerPlugin, HostBinding, HostKind, HostText, PickerCommand,
    PickerEventMessage, PickerValue,
};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(DateTimePickerPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (open_on_space, show_host_value, log_picker_events))
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);

    let host = commands
        .spawn((
            Name::new("Demo-Host"),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(24.0),
                top: Val::Px(24.0),
                ..default()
            },
            Text::new("press space to open the picker"),
            HostText::default(),
        ))
        .id();

    commands.spawn(DateTimePicker {
        default_value: PickerValue::new(2021, 6, 15, 14, 30),
        host: Some(HostBinding {
            target: host,
            kind: HostKind::TextInput,
        }),
        ..Default::default()
    });
}

fn open_on_space(
    keys: Res<ButtonInput<KeyCode>>,
    pickers: Query<Entity, With<DateTimePicker>>,
    mut writer: MessageWriter<PickerCommand>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for picker in pickers.iter() {
        writer.write(PickerCommand::open(picker));
    }
}

fn show_host_value(mut hosts: Query<(&HostText, &mut Text), Changed<HostText>>) {
    for (host, mut text) in hosts.iter_mut() {
        text.0 = host.0.clone();
    }
}

fn log_picker_events(mut reader: MessageReader<PickerEventMessage>) {
    for message in reader.read() {
        info!("picker event '{}' value {:?}", message.name, message.value);
    }
}
