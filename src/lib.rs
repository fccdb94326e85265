//! Koch fractal server
//!
//! Computes Koch curve, half-snowflake and snowflake polylines and serves
//! them as JSON coordinate arrays over HTTP, alongside a small browser
//! front end that plots them.

pub mod config;
pub mod handler;
pub mod http;
pub mod koch;
pub mod logger;
pub mod server;
