/// API route handlers

pub mod applications;
pub mod auth;
pub mod health;
pub mod organizations;
pub mod permissions;
pub mod roles;
pub mod users;
