mod database;
mod global;
