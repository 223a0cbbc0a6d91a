//! # Kadro Shared Library
//!
//! Shared types and business primitives for the Kadro HR backend.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Token service and credential digests
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Kadro shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
