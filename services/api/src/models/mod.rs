//! API models

pub mod user;

pub use user::{NewUser, UpdateUser, User, UserResponse};
