//! HTTP router, handlers, and middleware.

pub(crate) mod constants;
pub(crate) mod downloads;
pub(crate) mod errors;
pub(crate) mod health;
pub(crate) mod media;
pub mod router;
pub(crate) mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;
