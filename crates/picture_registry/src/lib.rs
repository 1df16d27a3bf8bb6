pub mod api;
pub mod common;
mod config;
pub mod db;

pub use config::{CONFIG, Config};
