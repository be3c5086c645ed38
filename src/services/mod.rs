pub mod database;

pub use database::{DatabaseService, HealthReport, PgDatabase};
