pub mod consumer;
pub mod path_entry;
pub mod point;
pub mod time_series;
