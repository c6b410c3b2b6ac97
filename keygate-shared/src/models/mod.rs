/// Database models
///
/// Plain data structures mapped from rows with `sqlx::FromRow`. All SQL lives
/// in the repository layer (`crate::db::repos`) so that every query runs
/// through a unit of work and its transaction.
///
/// Every entity carries a `deleted` flag. Deletion is a state transition,
/// never a physical row removal; repositories filter `deleted = FALSE`.

pub mod account;
pub mod application;
pub mod contact;
pub mod organization;
pub mod permission;
pub mod role;
pub mod security_token;
pub mod user;
