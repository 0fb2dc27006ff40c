//! Auth module: three-layer architecture (domain, repository, service).
//!
//! This module centralizes registration and login business logic under the service crate.
//! The hashing and token leaves live next to the service that composes them.

pub mod domain;
pub mod errors;
pub mod hasher;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use errors::AuthError;
pub use service::{AuthConfig, AuthService};
