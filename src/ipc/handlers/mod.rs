pub mod backup_exchange;
pub mod catalog;
pub mod core;
pub mod dashboard;
pub mod entry;
pub mod gate;
pub mod records;
pub mod roster;
pub mod setup;
