pub mod manager;

pub use manager::{BulkLoadPolicy, DatabaseManager, SaveMode};
