pub mod database;

pub use database::{Database, QueryResult};
