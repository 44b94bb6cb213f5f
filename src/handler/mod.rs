//! Request handler module
//!
//! Dispatches requests to the echo route or the 404 fallback.

pub mod router;

pub use router::{handle_request, ConnectionInfo};
