//! HTTP responses for resolver results
pub mod response;

pub use response::{json_response, status_for, ErrorHandler, ErrorResponse};
