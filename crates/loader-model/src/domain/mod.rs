mod priority;
pub use priority::Priority;

mod database;
pub use database::DatabasePath;

mod statement;
pub use statement::Statement;

mod row;
pub use row::Row;

mod run_config;
pub use run_config::RunConfig;

/// Zero-based index of a worker within a run.
///
/// Used in logs and to order failures reported by different workers.
pub type WorkerId = usize;
