pub mod export_service;
pub mod import_service;
pub mod models;

pub use export_service::*;
pub use import_service::*;
