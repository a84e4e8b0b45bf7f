pub mod event_parsing;
pub mod keyed_lock;
