/// Database layer
///
/// - `pool`: PostgreSQL connection pool (the only cross-request shared
///   resource)
/// - `migrations`: embedded schema migration runner
/// - `unit_of_work`: transaction-scoped facade over the repositories
/// - `repos`: per-entity repositories; all SQL lives here

pub mod migrations;
pub mod pool;
pub mod repos;
pub mod unit_of_work;
