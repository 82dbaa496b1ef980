//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services. Currently a
//! single REST interface built on axum.

pub mod rest;

pub use rest::api_router;
