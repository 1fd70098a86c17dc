pub mod codec;
pub mod config;
pub mod data_loader;
pub mod errors;
pub mod export;
pub mod geometry;
pub mod hierarchy;
pub mod ncbi;
pub mod resolver;
pub mod rows;
pub mod vocab;

pub mod database;
pub mod services;

pub use errors::{ImportExportError, ImportExportResult};
pub use rows::EntityKind;
