/// Keygate shared library
///
/// Domain core of the Keygate identity platform, shared by the API server
/// and any future service binaries:
///
/// - `models`: persisted entities (all soft-deleted, never hard-deleted)
/// - `auth`: password hashing, token issuance/verification, pure permission
///   resolution, and the pipeline building blocks
/// - `db`: connection pool, embedded migrations, unit of work, repositories

pub mod auth;
pub mod db;
pub mod models;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
