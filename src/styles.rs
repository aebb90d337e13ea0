use bevy::prelude::*;

const PREFIX: &str = "c-datepicker";

/// CSS class names attached to a spawned picker node.
///
/// The crate performs no styling itself; classes are inert tags a host
/// style engine can target, and the open/close transition adds and
/// removes the modifier classes so class-driven animations work.
#[derive(Component, Clone, Debug, Default)]
pub struct StyleClass(pub Vec<String>);

impl StyleClass {
    pub fn one(class: impl Into<String>) -> Self {
        Self(vec![class.into()])
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|entry| entry == class)
    }

    pub fn add(&mut self, class: &str) {
        if !self.contains(class) {
            self.0.push(class.to_string());
        }
    }

    pub fn remove(&mut self, class: &str) {
        self.0.retain(|entry| entry != class);
    }
}

/// Mapping from logical style slot to CSS class name.
///
/// Immutable after construction; build one with [`PickerStyles::default`]
/// or merge user overrides over the defaults with
/// [`PickerStyles::merged`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerStyles {
    pub root: String,
    pub open: String,
    pub positioned: String,
    pub scrim: String,
    pub scrim_shown: String,
    pub header: String,
    pub back: String,
    pub container: String,
    pub date: String,
    pub day: String,
    pub month: String,
    pub prev: String,
    pub next: String,
    pub day_table: String,
    pub day_head: String,
    pub day_head_elem: String,
    pub day_row: String,
    pub day_body: String,
    pub day_body_elem: String,
    pub day_concealed: String,
    pub day_disabled: String,
    pub selected_day: String,
    pub time: String,
    pub time_list: String,
    pub time_option: String,
    pub selected_time: String,
    pub clock: String,
    pub clock_num: String,
    pub clock_num_active: String,
    pub clock_num_disabled: String,
    pub am: String,
    pub pm: String,
    pub ok: String,
    pub cancel: String,
}

impl Default for PickerStyles {
    fn default() -> Self {
        Self {
            root: PREFIX.to_string(),
            open: format!("{PREFIX}--open"),
            positioned: format!("{PREFIX}--fixed"),
            scrim: "c-scrim".to_string(),
            scrim_shown: "c-scrim--shown".to_string(),
            header: format!("{PREFIX}__header"),
            back: format!("{PREFIX}__back"),
            container: format!("{PREFIX}__calendar"),
            date: format!("{PREFIX}__date"),
            day: format!("{PREFIX}__day"),
            month: format!("{PREFIX}__month"),
            prev: format!("{PREFIX}__prev"),
            next: format!("{PREFIX}__next"),
            day_table: format!("{PREFIX}__days"),
            day_head: format!("{PREFIX}__days-head"),
            day_head_elem: format!("{PREFIX}__day-head"),
            day_row: format!("{PREFIX}__days-row"),
            day_body: format!("{PREFIX}__days-body"),
            day_body_elem: format!("{PREFIX}__day-body"),
            day_concealed: format!("{PREFIX}__day--concealed"),
            day_disabled: format!("{PREFIX}__day--disabled"),
            selected_day: format!("{PREFIX}__day--selected"),
            time: format!("{PREFIX}__time"),
            time_list: format!("{PREFIX}__time-list"),
            time_option: format!("{PREFIX}__time-option"),
            selected_time: format!("{PREFIX}__time--selected"),
            clock: format!("{PREFIX}__clock"),
            clock_num: format!("{PREFIX}__clock__num"),
            clock_num_active: format!("{PREFIX}__clock__num--active"),
            clock_num_disabled: format!("{PREFIX}__clock__num--disabled"),
            am: format!("{PREFIX}__am"),
            pm: format!("{PREFIX}__pm"),
            ok: "js-ok".to_string(),
            cancel: "js-cancel".to_string(),
        }
    }
}

impl PickerStyles {
    /// Merges user overrides over the default slot mapping.
    pub fn merged(overrides: PickerStyleOverrides) -> Self {
        let mut styles = Self::default();
        macro_rules! apply {
            ($($slot:ident),* $(,)?) => {
                $(if let Some(class) = overrides.$slot {
                    styles.$slot = class;
                })*
            };
        }
        apply!(
            root,
            open,
            positioned,
            scrim,
            scrim_shown,
            header,
            back,
            container,
            date,
            day,
            month,
            prev,
            next,
            day_table,
            day_head,
            day_head_elem,
            day_row,
            day_body,
            day_body_elem,
            day_concealed,
            day_disabled,
            selected_day,
            time,
            time_list,
            time_option,
            selected_time,
            clock,
            clock_num,
            clock_num_active,
            clock_num_disabled,
            am,
            pm,
            ok,
            cancel,
        );
        styles
    }
}

/// Partial slot overrides for [`PickerStyles::merged`].
#[derive(Clone, Debug, Default)]
pub struct PickerStyleOverrides {
    pub root: Option<String>,
    pub open: Option<String>,
    pub positioned: Option<String>,
    pub scrim: Option<String>,
    pub scrim_shown: Option<String>,
    pub header: Option<String>,
    pub back: Option<String>,
    pub container: Option<String>,
    pub date: Option<String>,
    pub day: Option<String>,
    pub month: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub day_table: Option<String>,
    pub day_head: Option<String>,
    pub day_head_elem: Option<String>,
    pub day_row: Option<String>,
    pub day_body: Option<String>,
    pub day_body_elem: Option<String>,
    pub day_concealed: Option<String>,
    pub day_disabled: Option<String>,
    pub selected_day: Option<String>,
    pub time: Option<String>,
    pub time_list: Option<String>,
    pub time_option: Option<String>,
    pub selected_time: Option<String>,
    pub clock: Option<String>,
    pub clock_num: Option<String>,
    pub clock_num_active: Option<String>,
    pub clock_num_disabled: Option<String>,
    pub am: Option<String>,
    pub pm: Option<String>,
    pub ok: Option<String>,
    pub cancel: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_material_prefix() {
        let styles = PickerStyles::default();
        assert_eq!(styles.root, "c-datepicker");
        assert_eq!(styles.scrim, "c-scrim");
        assert_eq!(styles.selected_day, "c-datepicker__day--selected");
        assert_eq!(styles.clock_num, "c-datepicker__clock__num");
    }

    #[test]
    fn merge_overrides_only_the_named_slots() {
        let styles = PickerStyles::merged(PickerStyleOverrides {
            scrim: Some("my-scrim".to_string()),
            selected_day: Some("picked".to_string()),
            ..Default::default()
        });

        assert_eq!(styles.scrim, "my-scrim");
        assert_eq!(styles.selected_day, "picked");
        assert_eq!(styles.root, "c-datepicker");
        assert_eq!(styles.month, "c-datepicker__month");
    }

    #[test]
    fn style_class_add_and_remove_are_idempotent() {
        let mut class = StyleClass::one("c-datepicker");
        class.add("c-datepicker--open");
        class.add("c-datepicker--open");
        assert_eq!(class.0.len(), 2);

        class.remove("c-datepicker--open");
        class.remove("c-datepicker--open");
        assert_eq!(class.0, vec!["c-datepicker".to_string()]);
    }
}
