use bevy::prelude::*;

use crate::value::PickerValue;

/// Event names a picker emits over its lifetime.
pub mod event {
    pub const OPEN: &str = "open";
    pub const CLOSE: &str = "close";
    pub const SUBMIT: &str = "submit";
    pub const CANCEL: &str = "cancel";
    pub const CHANGE: &str = "change";
    pub const CHANGE_DATE: &str = "change:date";
    pub const CHANGE_TIME: &str = "change:time";
}

pub type NamedHandler = Box<dyn FnMut(Option<&PickerValue>) + Send + Sync>;
pub type WildcardHandler = Box<dyn FnMut(&str, Option<&PickerValue>) + Send + Sync>;

/// Named-event publish/subscribe for one picker instance.
///
/// [`trigger`](Self::trigger) takes a space-separated list of event
/// names; for each name, handlers registered for that name run in
/// registration order, then every wildcard handler runs and receives
/// the name as its first argument. There is no error isolation: a
/// panicking handler aborts delivery to the rest.
#[derive(Component, Default)]
pub struct PickerEmitter {
    named: Vec<(String, NamedHandler)>,
    wildcard: Vec<WildcardHandler>,
}

impl PickerEmitter {
    /// Registers a handler for a single event name.
    pub fn on(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(Option<&PickerValue>) + Send + Sync + 'static,
    ) {
        self.named.push((name.into(), Box::new(handler)));
    }

    /// Registers a wildcard handler invoked for every emitted event.
    pub fn on_any(&mut self, handler: impl FnMut(&str, Option<&PickerValue>) + Send + Sync + 'static) {
        self.wildcard.push(Box::new(handler));
    }

    /// Emits each whitespace-separated event name in `names`.
    pub fn trigger(&mut self, names: &str, value: Option<&PickerValue>) {
        for name in names.split_whitespace() {
            for (registered, handler) in self.named.iter_mut() {
                if registered == name {
                    handler(value);
                }
            }
            for handler in self.wildcard.iter_mut() {
                handler(name, value);
            }
        }
    }
}

/// A picker event mirrored onto Bevy's message bus, so host systems can
/// consume the emitter's output with a plain `MessageReader`. The
/// bridge is one-way; writing messages never feeds back into the
/// emitter.
#[derive(Message, Clone, Debug)]
pub struct PickerEventMessage {
    pub picker: Entity,
    pub name: String,
    pub value: Option<PickerValue>,
}

/// Runs the emitter for `names` and mirrors each name onto the bus.
pub fn emit(
    emitter: &mut PickerEmitter,
    writer: &mut MessageWriter<PickerEventMessage>,
    picker: Entity,
    names: &str,
    value: Option<PickerValue>,
) {
    emitter.trigger(names, value.as_ref());
    for name in names.split_whitespace() {
        writer.write(PickerEventMessage {
            picker,
            name: name.to_string(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn value(y: i32, m: u32, d: u32, h: u32, min: u32) -> PickerValue {
        PickerValue::new(y, m, d, h, min).expect("valid test value")
    }

    #[test]
    fn named_handlers_fire_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = PickerEmitter::default();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            emitter.on(event::CHANGE, move |_| {
                seen.lock().expect("lock").push(tag);
            });
        }

        emitter.trigger(event::CHANGE, None);
        assert_eq!(*seen.lock().expect("lock"), vec!["first", "second"]);
    }

    #[test]
    fn space_separated_names_each_deliver() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = PickerEmitter::default();

        {
            let seen = Arc::clone(&seen);
            emitter.on(event::CHANGE_DATE, move |_| {
                seen.lock().expect("lock").push("date");
            });
        }
        {
            let seen = Arc::clone(&seen);
            emitter.on(event::CHANGE, move |_| {
                seen.lock().expect("lock").push("change");
            });
        }

        emitter.trigger("change change:date", Some(&value(2021, 6, 15, 14, 30)));
        assert_eq!(*seen.lock().expect("lock"), vec!["change", "date"]);
    }

    #[test]
    fn wildcard_receives_every_event_with_its_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = PickerEmitter::default();

        {
            let seen = Arc::clone(&seen);
            emitter.on_any(move |name, _| {
                seen.lock().expect("lock").push(name.to_string());
            });
        }

        emitter.trigger("change change:time", None);
        emitter.trigger(event::CANCEL, None);
        assert_eq!(
            *seen.lock().expect("lock"),
            vec!["change", "change:time", "cancel"]
        );
    }

    #[test]
    fn handlers_only_fire_for_their_name() {
        let hits = Arc::new(Mutex::new(0usize));
        let mut emitter = PickerEmitter::default();

        {
            let hits = Arc::clone(&hits);
            emitter.on(event::SUBMIT, move |_| {
                *hits.lock().expect("lock") += 1;
            });
        }

        emitter.trigger(event::CANCEL, None);
        assert_eq!(*hits.lock().expect("lock"), 0);
        emitter.trigger(event::SUBMIT, None);
        assert_eq!(*hits.lock().expect("lock"), 1);
    }
}
