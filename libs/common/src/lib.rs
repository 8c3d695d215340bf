//! Common library for the todo backend
//!
//! This crate provides shared functionality used across the services in the
//! todo backend, currently database connectivity and the shared error types.

pub mod database;
pub mod error;
