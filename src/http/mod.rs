//! HTTP protocol layer module
//!
//! Response builders, decoupled from routing.

pub mod response;

pub use response::{build_404_response, build_text_response};
