pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::build_router;
pub use config::AppConfig;
pub use db::{create_pool, init_schema, ReferenceCatalog};
pub use error::ReceivingError;
pub use service::ReceivingService;
