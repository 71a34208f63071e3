mod databases;
pub mod db;
mod files;
pub mod models;
mod tables;

pub use db::{Registry, RegistryError};
pub use tables::*;
