/// Authentication and authorization primitives
///
/// - `password`: Argon2id hashing and verification
/// - `token`: signed session tokens carrying identity + permission claims
/// - `permissions`: pure permission resolution and the authorize check
/// - `policy`: per-route required-permission declarations
/// - `middleware`: axum building blocks (auth context, permission gate)

pub mod middleware;
pub mod password;
pub mod permissions;
pub mod policy;
pub mod token;
