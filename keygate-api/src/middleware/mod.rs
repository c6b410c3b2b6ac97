/// API server middleware
///
/// - `auth`: bearer-token authentication plus the response-side token
///   reissue; every authenticated response carries a fresh token
/// - `audit`: activity logging with sensitive-field masking

pub mod audit;
pub mod auth;
