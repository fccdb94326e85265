//! Request handler module
//!
//! Request routing plus the fractal endpoint and the static front end.

pub mod koch;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
