pub mod date_time_picker;
