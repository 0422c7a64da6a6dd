pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, BillStore, PgBillStore};
pub use error::{BillError, ValidationError};
pub use service::{BillDesk, BillEditor};
