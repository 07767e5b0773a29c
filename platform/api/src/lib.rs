pub mod api;
pub mod availability;
pub mod config;
pub mod database;
pub mod global;
pub mod holidays;
pub mod migration;
pub mod phone;
pub mod pickup;
pub mod quick_entry;

#[cfg(test)]
mod tests;
