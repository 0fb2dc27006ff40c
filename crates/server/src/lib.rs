pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod validation;

pub use startup::run;
