//! Service layer for the credential-issuance service.
//! - Keeps registration/login business rules independent of the web framework.
//! - Talks to persistence only through the `UserStore` capability.
//! - Returns typed errors the transport layer maps to status codes.

pub mod auth;
pub mod context;

pub use context::{Cancelled, RequestContext};
