//! HTTP interface module
//!
//! Exposes the gateway adapter as a JSON/HTTP API.

mod server;
mod handlers;

pub use server::{router, run, serve};
